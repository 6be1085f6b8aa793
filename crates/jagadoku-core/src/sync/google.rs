//! Google Sheets v4 REST backend

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{Row, SpreadsheetBackend};
use crate::error::{Error, Result};

/// Production API base
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Environment variable overriding the API base (mock servers, proxies)
pub const SHEETS_API_BASE_ENV: &str = "JAGADOKU_SHEETS_API_BASE";

#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponse {
    spreadsheet_id: String,
}

#[derive(Debug, Serialize)]
struct ValueRange<'a> {
    values: &'a [Row],
}

impl GoogleSheetsClient {
    pub fn new() -> Self {
        Self::with_base_url(SHEETS_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment, falling back to the production API
    pub fn from_env() -> Self {
        match std::env::var(SHEETS_API_BASE_ENV) {
            Ok(base) if !base.trim().is_empty() => Self::with_base_url(&base),
            _ => Self::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::Auth("Access token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Check the status and turn Google's error body into our error type
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|b| b.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.chars().take(200).collect());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth(message)),
            StatusCode::NOT_FOUND => Err(Error::NotFound(message)),
            _ => Err(Error::Sync(format!(
                "Google Sheets API error {}: {}",
                status, message
            ))),
        }
    }
}

impl Default for GoogleSheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpreadsheetBackend for GoogleSheetsClient {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn create_spreadsheet(
        &self,
        token: &str,
        title: &str,
        sheets: &[&str],
    ) -> Result<String> {
        let body = json!({
            "properties": { "title": title },
            "sheets": sheets
                .iter()
                .map(|s| json!({ "properties": { "title": s } }))
                .collect::<Vec<_>>(),
        });

        let response = self
            .client
            .post(&self.base_url)
            .headers(Self::headers(token)?)
            .json(&body)
            .send()
            .await?;
        let created: CreateResponse = Self::check(response).await?.json().await?;

        debug!(spreadsheet_id = %created.spreadsheet_id, "Created spreadsheet");
        Ok(created.spreadsheet_id)
    }

    async fn clear_values(&self, token: &str, spreadsheet_id: &str, range: &str) -> Result<()> {
        let url = format!("{}/{}/values/{}:clear", self.base_url, spreadsheet_id, range);
        let response = self
            .client
            .post(&url)
            .headers(Self::headers(token)?)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn write_values(
        &self,
        token: &str,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Row],
    ) -> Result<()> {
        let url = format!(
            "{}/{}/values/{}?valueInputOption=RAW",
            self.base_url, spreadsheet_id, range
        );
        let response = self
            .client
            .put(&url)
            .headers(Self::headers(token)?)
            .json(&ValueRange { values: rows })
            .send()
            .await?;
        Self::check(response).await?;

        debug!(range, rows = rows.len(), "Wrote values");
        Ok(())
    }
}
