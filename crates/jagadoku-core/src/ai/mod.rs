//! Pluggable AI backend abstraction for financial advice
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OllamaBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let insight = client.financial_advice(&ledger.snapshot()).await?;
//!     println!("{}", insight.summary);
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (gemini, ollama, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-3-pro-preview)
//! - `GEMINI_HOST`: API base URL override
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod gemini;
mod mock;
mod ollama;
pub mod parsing;
pub mod types;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_HOST, DEFAULT_GEMINI_MODEL};
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use parsing::parse_insight;
pub use types::*;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::aggregation::summarize;
use crate::error::{Error, Result};
use crate::ledger::LedgerSnapshot;
use crate::models::format_idr;
use crate::prompts::{PromptId, PromptLibrary};

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Analyze the ledger and return structured advice
    async fn financial_advice(&self, snapshot: &LedgerSnapshot) -> Result<AIInsight>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Google Gemini generateContent API
    Gemini(GeminiBackend),
    /// Local Ollama server
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `gemini` (default): uses GEMINI_API_KEY and GEMINI_MODEL
    /// - `ollama`: uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `mock`: canned advice, no network
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" | "google" => GeminiBackend::from_env().map(AIClient::Gemini),
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(AIClient::Gemini)
            }
        }
    }

    pub fn gemini(api_key: &str, model: &str) -> Self {
        AIClient::Gemini(GeminiBackend::new(api_key, model))
    }

    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Backend name for display
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Gemini(_) => "gemini",
            AIClient::Ollama(_) => "ollama",
            AIClient::Mock(_) => "mock",
        }
    }
}

#[async_trait]
impl AIBackend for AIClient {
    async fn financial_advice(&self, snapshot: &LedgerSnapshot) -> Result<AIInsight> {
        match self {
            AIClient::Gemini(b) => b.financial_advice(snapshot).await,
            AIClient::Ollama(b) => b.financial_advice(snapshot).await,
            AIClient::Mock(b) => b.financial_advice(snapshot).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Rendered prompt sections for an advice request
#[derive(Debug, Clone)]
pub(crate) struct AdvicePrompt {
    pub system: Option<String>,
    pub user: String,
}

/// Render the advice prompt for a ledger snapshot
pub(crate) fn advice_prompt(
    prompts: &RwLock<PromptLibrary>,
    snapshot: &LedgerSnapshot,
) -> Result<AdvicePrompt> {
    let transactions = serde_json::to_string(&snapshot.transactions)?;
    let goals = serde_json::to_string(&snapshot.goals)?;
    let totals = summarize(&snapshot.transactions);
    let summary = format!(
        "Pemasukan {}, Pengeluaran {}, Saldo {}",
        format_idr(totals.income),
        format_idr(totals.expenses),
        format_idr(totals.balance)
    );

    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    let template = prompts.get(PromptId::FinancialAdvice)?;

    let mut vars = HashMap::new();
    vars.insert("transactions", transactions.as_str());
    vars.insert("goals", goals.as_str());
    vars.insert("summary", summary.as_str());

    Ok(AdvicePrompt {
        system: template.system_section().map(str::to_string),
        user: template.render_user(&vars),
    })
}
