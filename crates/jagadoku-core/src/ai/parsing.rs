//! Validation of AI backend responses
//!
//! Both backends ask for a bare JSON document. Anything else, including prose
//! or code fences around the object, is rejected.

use crate::error::{Error, Result};

use super::types::AIInsight;

/// Shorten raw model output for error messages
fn truncate_raw(raw: &str) -> String {
    if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    }
}

/// Parse and validate an insight from AI response text.
///
/// Empty output, text around the JSON, schema mismatches (including unknown
/// fields and risk levels outside `Low`/`Medium`/`High`) and a blank summary
/// are all `Error::Advice`.
pub fn parse_insight(response: &str) -> Result<AIInsight> {
    let response = response.trim();
    if response.is_empty() {
        return Err(Error::Advice("Empty response from AI".into()));
    }

    let insight: AIInsight = serde_json::from_str(response).map_err(|e| {
        Error::Advice(format!(
            "Invalid insight JSON from AI: {} | Raw: {}",
            e,
            truncate_raw(response)
        ))
    })?;

    if insight.summary.trim().is_empty() {
        return Err(Error::Advice("AI response has an empty summary".into()));
    }

    Ok(insight)
}
