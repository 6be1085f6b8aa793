//! Runtime configuration
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. `~/.local/share/jagadoku/config.toml` (if present)
//! 3. Environment variables
//!
//! ```toml
//! [google]
//! client_id = "....apps.googleusercontent.com"
//! redirect_uri = "http://localhost:3000"
//!
//! [ai]
//! backend = "ollama"
//! ollama_host = "http://localhost:11434"
//! ollama_model = "llama3.2"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ai::{
    AIClient, GeminiBackend, MockBackend, OllamaBackend, DEFAULT_GEMINI_HOST, DEFAULT_GEMINI_MODEL,
};
use crate::error::{Error, Result};
use crate::identity::{GoogleIdentity, GOOGLE_CLIENT_ID, USERINFO_ENDPOINT};
use crate::sync::{GoogleSheetsClient, SHEETS_API_BASE};

#[derive(Debug, Clone, PartialEq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub sheets_api_base: String,
    pub userinfo_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: GOOGLE_CLIENT_ID.to_string(),
            redirect_uri: "http://localhost:3000".to_string(),
            sheets_api_base: SHEETS_API_BASE.to_string(),
            userinfo_url: USERINFO_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    /// gemini, ollama or mock
    pub backend: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_host: String,
    pub ollama_host: Option<String>,
    pub ollama_model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_host: DEFAULT_GEMINI_HOST.to_string(),
            ollama_host: None,
            ollama_model: "llama3.2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub google: GoogleConfig,
    pub ai: AiConfig,
}

/// On-disk layout; every field optional so partial files work
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    google: Option<RawGoogle>,
    ai: Option<RawAi>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGoogle {
    client_id: Option<String>,
    redirect_uri: Option<String>,
    sheets_api_base: Option<String>,
    userinfo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAi {
    backend: Option<String>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    gemini_host: Option<String>,
    ollama_host: Option<String>,
    ollama_model: Option<String>,
}

/// Default location of `config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("jagadoku").join("config.toml"))
}

/// Default location of the database file
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("jagadoku").join("jagadoku.db"))
        .unwrap_or_else(|| PathBuf::from("jagadoku.db"))
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl Config {
    /// Load from the default file and the process environment
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(g) = raw.google {
            set(&mut config.google.client_id, g.client_id);
            set(&mut config.google.redirect_uri, g.redirect_uri);
            set(&mut config.google.sheets_api_base, g.sheets_api_base);
            set(&mut config.google.userinfo_url, g.userinfo_url);
        }
        if let Some(a) = raw.ai {
            set(&mut config.ai.backend, a.backend);
            set(&mut config.ai.gemini_model, a.gemini_model);
            set(&mut config.ai.gemini_host, a.gemini_host);
            set(&mut config.ai.ollama_model, a.ollama_model);
            config.ai.gemini_api_key = a.gemini_api_key.or(config.ai.gemini_api_key);
            config.ai.ollama_host = a.ollama_host.or(config.ai.ollama_host);
        }
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        set(&mut self.google.client_id, get("GOOGLE_CLIENT_ID"));
        set(&mut self.google.sheets_api_base, get("JAGADOKU_SHEETS_API_BASE"));
        set(&mut self.google.userinfo_url, get("JAGADOKU_USERINFO_URL"));
        set(&mut self.ai.backend, get("AI_BACKEND"));
        set(&mut self.ai.gemini_model, get("GEMINI_MODEL"));
        set(&mut self.ai.gemini_host, get("GEMINI_HOST"));
        set(&mut self.ai.ollama_model, get("OLLAMA_MODEL"));
        if let Some(key) = get("GEMINI_API_KEY") {
            self.ai.gemini_api_key = Some(key);
        }
        if let Some(host) = get("OLLAMA_HOST") {
            self.ai.ollama_host = Some(host);
        }
    }

    /// Build the configured AI client, or `None` if its credentials are missing
    pub fn ai_client(&self) -> Option<AIClient> {
        match self.ai.backend.to_lowercase().as_str() {
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            "ollama" => self
                .ai
                .ollama_host
                .as_deref()
                .map(|host| AIClient::Ollama(OllamaBackend::new(host, &self.ai.ollama_model))),
            other => {
                if other != "gemini" && other != "google" {
                    warn!(backend = %other, "Unknown AI backend, falling back to gemini");
                }
                self.ai.gemini_api_key.as_deref().map(|key| {
                    AIClient::Gemini(GeminiBackend::with_host(
                        &self.ai.gemini_host,
                        key,
                        &self.ai.gemini_model,
                    ))
                })
            }
        }
    }

    pub fn sheets_client(&self) -> GoogleSheetsClient {
        GoogleSheetsClient::with_base_url(&self.google.sheets_api_base)
    }

    pub fn identity(&self) -> GoogleIdentity {
        GoogleIdentity::with_userinfo_url(&self.google.userinfo_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.google.sheets_api_base, SHEETS_API_BASE);
        assert_eq!(config.ai.backend, "gemini");
        assert_eq!(config.ai.gemini_model, "gemini-3-pro-preview");
        // No key configured means no AI client
        assert!(config.ai_client().is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [ai]
            backend = "ollama"
            ollama_host = "http://localhost:11434"
            "#,
        )
        .unwrap();
        assert_eq!(config.ai.backend, "ollama");
        assert_eq!(config.ai.ollama_model, "llama3.2");
        assert_eq!(config.google, GoogleConfig::default());

        let client = config.ai_client().unwrap();
        assert_eq!(client.backend_name(), "ollama");
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[ai\nbackend = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml_str(
            r#"
            [ai]
            backend = "ollama"
            [google]
            sheets_api_base = "http://file"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("AI_BACKEND", "gemini"),
            ("GEMINI_API_KEY", "secret"),
            ("JAGADOKU_SHEETS_API_BASE", "http://env"),
            ("OLLAMA_MODEL", "   "),
        ]
        .into_iter()
        .collect();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.ai.backend, "gemini");
        assert_eq!(config.ai.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.google.sheets_api_base, "http://env");
        // Blank values are ignored
        assert_eq!(config.ai.ollama_model, "llama3.2");

        let client = config.ai_client().unwrap();
        assert_eq!(client.backend_name(), "gemini");
        assert_eq!(client_model(&client), "gemini-3-pro-preview");
    }

    fn client_model(client: &AIClient) -> String {
        use crate::ai::AIBackend;
        client.model().to_string()
    }

    #[test]
    fn test_mock_backend_needs_no_credentials() {
        let mut config = Config::default();
        config.ai.backend = "mock".to_string();
        assert_eq!(config.ai_client().unwrap().backend_name(), "mock");
    }
}
