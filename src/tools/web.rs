//! Web search through the DuckDuckGo instant answer API (no key required).

use super::{check_status, endpoint, truncate_chars};
use crate::config::ToolSettings;
use crate::error::Result;
use tracing::instrument;

const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

pub struct WebSearchTool {
    client: reqwest::Client,
    url: String,
    max_snippets: usize,
    max_chars: usize,
}

impl WebSearchTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            url: settings.duckduckgo_url.clone(),
            max_snippets: settings.max_results,
            max_chars: settings.max_chars,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<String> {
        let mut url = endpoint(&self.url)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("no_html", "1")
            .append_pair("skip_disambig", "1");

        let response = self.client.get(url).send().await?;
        let resp: serde_json::Value = check_status("DuckDuckGo", response).await?.json().await?;

        let snippets = collect_snippets(&resp, self.max_snippets);
        if snippets.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        Ok(truncate_chars(&snippets.join(" "), self.max_chars))
    }
}

/// Abstract first, then related topic texts (nested topic groups flattened).
fn collect_snippets(resp: &serde_json::Value, max_related: usize) -> Vec<String> {
    let mut snippets = Vec::new();

    if let Some(text) = resp["AbstractText"].as_str().filter(|t| !t.trim().is_empty()) {
        snippets.push(text.trim().to_string());
    }

    let mut related = Vec::new();
    if let Some(topics) = resp["RelatedTopics"].as_array() {
        for item in topics {
            match item["Topics"].as_array() {
                Some(group) => related.extend(group.iter().filter_map(|t| t["Text"].as_str())),
                None => related.extend(item["Text"].as_str()),
            }
        }
    }

    snippets.extend(
        related
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .take(max_related)
            .map(String::from),
    );
    snippets
}
