//! Ask command: client for a running `quill serve`.

use crate::api::{RunRequest, RunResponse};
use crate::cli::preflight::check_url;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Post a query to `{api_url}/run` and render the three result blocks.
pub async fn run_ask(query: &str, api_url: Option<String>, settings: Settings) -> Result<()> {
    if query.trim().is_empty() {
        Output::warning("Please enter a valid query");
        anyhow::bail!("empty query");
    }

    let base = api_url.unwrap_or(settings.client.api_url);
    check_url(&base)?;
    let endpoint = format!("{}/run", base.trim_end_matches('/'));

    let spinner = Output::spinner("AI agents working...");
    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&RunRequest {
            query: query.to_string(),
        })
        .send()
        .await;
    spinner.finish_and_clear();

    let response = response?;
    let status = response.status();
    let body = response.text().await?;

    if status != reqwest::StatusCode::OK {
        Output::error("Backend error occurred");
        println!("{}", body);
        anyhow::bail!("backend returned {}", status);
    }

    let data: RunResponse = serde_json::from_str(&body)?;
    render(&data);

    Ok(())
}

/// Render a pipeline response as panels.
pub(super) fn render(data: &RunResponse) {
    Output::header("Research");
    if let Some(wiki) = data.research.wiki_web.as_deref().filter(|s| !s.is_empty()) {
        Output::panel("Wikipedia + Web Results", wiki);
    }
    if let Some(arxiv) = data.research.arxiv.as_deref().filter(|s| !s.is_empty()) {
        Output::panel("Arxiv (Top-5 Papers)", arxiv);
    }

    Output::header("Summary");
    if !data.summary.is_empty() {
        Output::panel("Structured Summary", &data.summary);
    }

    Output::header("Email");
    if !data.email.is_empty() {
        Output::panel("Formal Email", &data.email);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_query_rejected() {
        assert!(run_ask("   ", None, Settings::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_success_against_mock() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/run")
            .match_body(mockito::Matcher::Json(serde_json::json!({"query": "graphene"})))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"research":{"wiki_web":"Graphene is carbon.","arxiv":null},
                    "summary":"Graphene summary.","email":"\nSubject: Overview on Graphene summary\n"}"#,
            )
            .create_async()
            .await;

        run_ask("graphene", Some(server.url()), Settings::default())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_backend_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/run")
            .with_status(500)
            .with_body(r#"{"error":"Language model error: quota"}"#)
            .create_async()
            .await;

        let err = run_ask("graphene", Some(format!("{}/", server.url())), Settings::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
