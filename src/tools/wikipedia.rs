//! Wikipedia lookup through the MediaWiki API.

use super::{check_status, endpoint, truncate_chars};
use crate::config::ToolSettings;
use crate::error::Result;
use serde::Deserialize;
use tracing::{debug, instrument};

const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

/// Searches Wikipedia and returns the intro of the best matching pages.
pub struct WikipediaTool {
    client: reqwest::Client,
    url: String,
    top_k: usize,
    max_chars: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            url: settings.wikipedia_url.clone(),
            top_k: settings.max_results,
            max_chars: settings.max_chars,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<String> {
        let titles = self.search(query).await?;
        if titles.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        let pages = self.extracts(&titles).await?;

        // Keep search ranking; the extracts endpoint does not preserve order.
        let blocks: Vec<String> = titles
            .iter()
            .filter_map(|title| pages.iter().find(|p| &p.title == title))
            .filter_map(|page| {
                page.extract
                    .as_deref()
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(|e| format!("Page: {}\nSummary: {}", page.title, e))
            })
            .collect();

        if blocks.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        debug!("Wikipedia returned {} pages", blocks.len());
        Ok(truncate_chars(&blocks.join("\n\n"), self.max_chars))
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let mut url = endpoint(&self.url)?;
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("list", "search")
            .append_pair("srsearch", query)
            .append_pair("srlimit", &self.top_k.to_string())
            .append_pair("format", "json");

        let response = self.client.get(url).send().await?;
        let body: SearchResponse = check_status("Wikipedia", response).await?.json().await?;

        Ok(body
            .query
            .map(|q| q.search.into_iter().map(|h| h.title).collect())
            .unwrap_or_default())
    }

    async fn extracts(&self, titles: &[String]) -> Result<Vec<Page>> {
        let mut url = endpoint(&self.url)?;
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("prop", "extracts")
            .append_pair("exintro", "1")
            .append_pair("explaintext", "1")
            .append_pair("titles", &titles.join("|"))
            .append_pair("format", "json")
            .append_pair("formatversion", "2");

        let response = self.client.get(url).send().await?;
        let body: ExtractResponse = check_status("Wikipedia", response).await?.json().await?;

        Ok(body.query.map(|q| q.pages).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn tool(url: String) -> WikipediaTool {
        let settings = ToolSettings {
            wikipedia_url: url,
            ..ToolSettings::default()
        };
        WikipediaTool::new(reqwest::Client::new(), &settings)
    }

    #[tokio::test]
    async fn test_pages_in_search_order() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("list".into(), "search".into()))
            .with_body(r#"{"query":{"search":[{"title":"Rust"},{"title":"Ferris"}]}}"#)
            .create_async()
            .await;
        let extracts = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("prop".into(), "extracts".into()))
            .with_body(
                r#"{"query":{"pages":[
                    {"title":"Ferris","extract":"A crab."},
                    {"title":"Rust","extract":"A language.\n"}
                ]}}"#,
            )
            .create_async()
            .await;

        let out = tool(format!("{}/w/api.php", server.url()))
            .run("rust")
            .await
            .unwrap();

        assert_eq!(out, "Page: Rust\nSummary: A language.\n\nPage: Ferris\nSummary: A crab.");
        search.assert_async().await;
        extracts.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_hits() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_body(r#"{"query":{"search":[]}}"#)
            .create_async()
            .await;

        let out = tool(format!("{}/w/api.php", server.url()))
            .run("zzzz")
            .await
            .unwrap();
        assert_eq!(out, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_server_error_is_tool_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = tool(format!("{}/w/api.php", server.url()))
            .run("rust")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::QuillError::Tool(_)));
    }
}
