//! Tool adapters used by the agents.
//!
//! Research tools (Wikipedia, web search, arXiv) map a query to free text.
//! Assistant tools (calculator, weather) return a structured [`ToolReport`].

mod arxiv;
mod calculator;
mod weather;
mod web;
mod wikipedia;

pub use arxiv::ArxivTool;
pub use calculator::{calculate, evaluate, Number};
pub use weather::WeatherTool;
pub use web::WebSearchTool;
pub use wikipedia::WikipediaTool;

use crate::config::ToolSettings;
use crate::error::{QuillError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a structured tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolStatus {
    Completed,
    Failed,
}

/// Structured result returned by the calculator and weather tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolReport {
    pub message: String,
    pub total_bill: String,
    pub status: ToolStatus,
}

impl ToolReport {
    /// A successful report.
    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            total_bill: "NA".to_string(),
            status: ToolStatus::Completed,
        }
    }

    /// A failed report.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            total_bill: "NA".to_string(),
            status: ToolStatus::Failed,
        }
    }

    /// Serialize for handing back to the model.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Build the HTTP client shared by tool adapters.
pub fn http_client(settings: &ToolSettings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(concat!("quill/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| QuillError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Parse an endpoint URL from settings.
pub(crate) fn endpoint(raw: &str) -> Result<url::Url> {
    url::Url::parse(raw).map_err(|e| QuillError::Config(format!("Invalid URL '{}': {}", raw, e)))
}

/// Truncate to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Fail with a tool error when the service returned a non-success status.
pub(crate) async fn check_status(tool: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(QuillError::Tool(format!(
        "{} returned {}: {}",
        tool,
        status,
        truncate_chars(&body, 200)
    )))
}
