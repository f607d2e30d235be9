//! arXiv paper search through the export API (Atom feed).

use super::{check_status, endpoint, truncate_chars};
use crate::config::ToolSettings;
use crate::error::Result;
use chrono::DateTime;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, instrument};

const NO_RESULTS: &str = "No good Arxiv Result was found";

pub struct ArxivTool {
    client: reqwest::Client,
    url: String,
    max_results: usize,
    max_chars: usize,
}

/// A single paper parsed from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub published: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

impl Paper {
    fn render(&self) -> String {
        format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            self.published,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

impl ArxivTool {
    pub fn new(client: reqwest::Client, settings: &ToolSettings) -> Self {
        Self {
            client,
            url: settings.arxiv_url.clone(),
            max_results: settings.max_results,
            max_chars: settings.max_chars,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<String> {
        let mut url = endpoint(&self.url)?;
        url.query_pairs_mut()
            .append_pair("search_query", &format!("all:{}", query))
            .append_pair("start", "0")
            .append_pair("max_results", &self.max_results.to_string());

        let response = self.client.get(url).send().await?;
        let feed = check_status("arXiv", response).await?.text().await?;

        let papers = parse_feed(&feed);
        debug!("arXiv returned {} papers", papers.len());

        if papers.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        let text = papers
            .iter()
            .take(self.max_results)
            .map(Paper::render)
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(truncate_chars(&text, self.max_chars))
    }
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<entry>(.*?)</entry>").unwrap())
}

fn author_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<author>\s*<name>(.*?)</name>").unwrap())
}

/// Per-entry elements read from the feed.
#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Published,
    Summary,
}

impl Field {
    fn regex(self) -> &'static Regex {
        static TITLE: OnceLock<Regex> = OnceLock::new();
        static PUBLISHED: OnceLock<Regex> = OnceLock::new();
        static SUMMARY: OnceLock<Regex> = OnceLock::new();

        let (cell, tag) = match self {
            Field::Title => (&TITLE, "title"),
            Field::Published => (&PUBLISHED, "published"),
            Field::Summary => (&SUMMARY, "summary"),
        };
        cell.get_or_init(|| {
            Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*)?>(.*?)</{tag}>")).unwrap()
        })
    }
}

/// Extract the text of the first matching element (attributes allowed).
fn element(xml: &str, field: Field) -> Option<String> {
    field.regex().captures(xml).map(|c| normalize(&c[1]))
}

/// Collapse whitespace and decode the predefined XML entities.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Parse papers out of an arXiv Atom feed.
pub fn parse_feed(feed: &str) -> Vec<Paper> {
    entry_re()
        .captures_iter(feed)
        .filter_map(|cap| {
            let entry = &cap[1];
            let title = element(entry, Field::Title)?;
            let published = element(entry, Field::Published)
                .map(|p| match DateTime::parse_from_rfc3339(&p) {
                    Ok(dt) => dt.date_naive().to_string(),
                    Err(_) => p,
                })
                .unwrap_or_default();
            let authors = author_re()
                .captures_iter(entry)
                .map(|a| normalize(&a[1]))
                .collect();
            let summary = element(entry, Field::Summary).unwrap_or_default();

            Some(Paper {
                published,
                title,
                authors,
                summary,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:quantum</title>
  <entry>
    <id>http://arxiv.org/abs/2101.00001v1</id>
    <published>2021-01-04T12:00:00Z</published>
    <title>Quantum Error
      Correction &amp; You</title>
    <summary>  We survey codes.
    </summary>
    <author>
      <name>Ada Lovelace</name>
    </author>
    <author>
      <name>Alan Turing</name>
    </author>
  </entry>
  <entry>
    <published>2020-05-01T00:00:00Z</published>
    <title>Second Paper</title>
    <summary>Short.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let papers = parse_feed(FEED);
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Quantum Error Correction & You");
        assert_eq!(papers[0].published, "2021-01-04");
        assert_eq!(papers[0].authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(papers[0].summary, "We survey codes.");
    }

    #[test]
    fn test_feed_title_not_mistaken_for_entry() {
        assert!(parse_feed("<feed><title>ArXiv Query</title></feed>").is_empty());
    }

    #[test]
    fn test_element_regex_is_cached() {
        assert!(std::ptr::eq(Field::Title.regex(), Field::Title.regex()));
        assert!(!std::ptr::eq(Field::Title.regex(), Field::Summary.regex()));
        assert_eq!(
            element(r#"<title type="text">A &amp; B</title>"#, Field::Title).as_deref(),
            Some("A & B")
        );
        assert_eq!(element("<summary>x</summary>", Field::Published), None);
    }

    #[test]
    fn test_render() {
        let paper = &parse_feed(FEED)[1];
        assert_eq!(
            paper.render(),
            "Published: 2020-05-01\nTitle: Second Paper\nAuthors: Grace Hopper\nSummary: Short."
        );
    }

    #[tokio::test]
    async fn test_run_against_mock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::UrlEncoded(
                "search_query".into(),
                "all:quantum".into(),
            ))
            .with_header("content-type", "application/atom+xml")
            .with_body(FEED)
            .create_async()
            .await;

        let settings = ToolSettings {
            arxiv_url: format!("{}/api/query", server.url()),
            max_results: 1,
            ..ToolSettings::default()
        };
        let out = ArxivTool::new(reqwest::Client::new(), &settings)
            .run("quantum")
            .await
            .unwrap();

        assert!(out.starts_with("Published: 2021-01-04\nTitle: Quantum Error Correction & You"));
        assert!(!out.contains("Second Paper"));
    }
}
