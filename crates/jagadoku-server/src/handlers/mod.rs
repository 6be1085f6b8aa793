//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod advice;
pub mod dashboard;
pub mod goals;
pub mod health;
pub mod session;
pub mod sync;
pub mod transactions;

// Re-export all handlers for use in router
pub use advice::*;
pub use dashboard::*;
pub use goals::*;
pub use health::*;
pub use session::*;
pub use sync::*;
pub use transactions::*;

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use jagadoku_core::models::parse_amount;

use crate::AppError;

/// An amount as a JSON number or as text typed into a form ("1.250.000")
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// `None` for blank or unparseable text and for non-finite numbers
    pub fn value(&self) -> Option<f64> {
        match self {
            AmountInput::Number(n) => n.is_finite().then_some(*n),
            AmountInput::Text(s) => parse_amount(s),
        }
    }
}

/// Parse an optional `YYYY-MM-DD` query value
pub(crate) fn parse_date_param(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::bad_request("Invalid date (expected YYYY-MM-DD)")),
        None => Ok(None),
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
