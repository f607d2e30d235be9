//! Research → summary → email pipeline.
//!
//! One query flows through three steps in sequence. Research failures fall
//! back to the query text (and are reported through [`ResearchOutcome`]);
//! summary failures abort the run.

use crate::config::{Credentials, Prompts, Settings};
use crate::email::format_email;
use crate::error::Result;
use crate::llm::{ChatModel, LanguageModel};
use crate::research::{AgentResearcher, ResearchOutcome, Researcher};
use crate::summarizer::Summarizer;
use crate::trim::trim_papers;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Research results as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchBlock {
    /// Combined knowledge base and web answer (the query itself on fallback).
    pub wiki_web: Option<String>,
    /// Trimmed paper listing, present only when the answer mentions arXiv.
    pub arxiv: Option<String>,
}

/// Everything produced for one query.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub research: ResearchBlock,
    pub summary: String,
    pub email: String,
    pub outcome: ResearchOutcome,
}

/// Sequences the research, summary and email steps.
pub struct Pipeline {
    researcher: Arc<dyn Researcher>,
    summarizer: Summarizer,
}

impl Pipeline {
    /// Create a pipeline from its capabilities.
    pub fn new(researcher: Arc<dyn Researcher>, summarizer: Summarizer) -> Self {
        Self {
            researcher,
            summarizer,
        }
    }

    /// Build the production pipeline: research agent plus chat model summarizer.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let researcher = Arc::new(AgentResearcher::from_settings(
            settings,
            credentials,
            &prompts,
        )?);
        let model: Arc<dyn LanguageModel> = Arc::new(ChatModel::new(&settings.llm, credentials)?);
        let summarizer = Summarizer::new(model).with_prompts(prompts);

        Ok(Self::new(researcher, summarizer))
    }

    /// Run all three steps for a query.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn run(&self, query: &str) -> Result<PipelineOutput> {
        let outcome = ResearchOutcome::collect(self.researcher.as_ref(), query).await;

        let (answer, research) = match &outcome {
            ResearchOutcome::Answered(answer) => {
                let arxiv = answer
                    .to_lowercase()
                    .contains("arxiv")
                    .then(|| trim_papers(answer));
                (
                    answer.as_str(),
                    ResearchBlock {
                        wiki_web: Some(answer.clone()),
                        arxiv,
                    },
                )
            }
            ResearchOutcome::Failed(failure) => {
                warn!(
                    kind = %failure.kind,
                    "Research failed, continuing with the query text: {}",
                    failure.reason
                );
                (
                    query,
                    ResearchBlock {
                        wiki_web: Some(query.to_string()),
                        arxiv: None,
                    },
                )
            }
        };

        let summary = self.summarizer.summarize(answer).await?;
        let email = format_email(&summary);

        info!("Pipeline finished for query");

        Ok(PipelineOutput {
            research,
            summary,
            email,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuillError;
    use crate::research::FailureKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubResearcher(std::result::Result<String, &'static str>);

    #[async_trait]
    impl Researcher for StubResearcher {
        async fn research(&self, _query: &str) -> Result<String> {
            self.0
                .clone()
                .map_err(|e| QuillError::Parse(e.to_string()))
        }
    }

    /// Echoes the content it was asked to summarize.
    struct EchoModel {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.seen.lock().unwrap().push(prompt.to_string());
            Ok("Summary of topic. More detail.".to_string())
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(QuillError::Llm("503".to_string()))
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    fn pipeline(
        research: std::result::Result<String, &'static str>,
    ) -> (Pipeline, Arc<EchoModel>) {
        let model = Arc::new(EchoModel {
            seen: Mutex::new(Vec::new()),
        });
        let pipeline = Pipeline::new(
            Arc::new(StubResearcher(research)),
            Summarizer::new(model.clone()),
        );
        (pipeline, model)
    }

    #[tokio::test]
    async fn test_successful_run() {
        let (pipeline, model) = pipeline(Ok("Rust is a systems language.".to_string()));
        let out = pipeline.run("rust").await.unwrap();

        assert_eq!(out.research.wiki_web.as_deref(), Some("Rust is a systems language."));
        assert_eq!(out.research.arxiv, None);
        assert_eq!(out.summary, "Summary of topic. More detail.");
        assert!(out.email.contains("Subject: Overview on Summary of topic\n"));
        assert!(model.seen.lock().unwrap()[0].contains("Rust is a systems language."));
    }

    #[tokio::test]
    async fn test_fallback_uses_query() {
        let (pipeline, model) = pipeline(Err("could not parse agent output"));
        let out = pipeline.run("graphene batteries").await.unwrap();

        assert_eq!(out.research.wiki_web.as_deref(), Some("graphene batteries"));
        assert_eq!(out.research.arxiv, None);
        assert_eq!(out.outcome.failure().unwrap().kind, FailureKind::Parse);
        assert!(model.seen.lock().unwrap()[0].contains("\"\"\"graphene batteries\"\"\""));
    }

    #[tokio::test]
    async fn test_arxiv_gating() {
        let answer = "Found on ArXiv:\n\nPaper A\nPaper B\nPaper C\nPaper D\nPaper E\nPaper F";
        let (pipeline, _) = pipeline(Ok(answer.to_string()));
        let out = pipeline.run("papers").await.unwrap();

        assert_eq!(
            out.research.arxiv.as_deref(),
            Some("Found on ArXiv:\nPaper A\nPaper B\nPaper C\nPaper D")
        );
        assert_eq!(out.research.wiki_web.as_deref(), Some(answer));
    }

    #[tokio::test]
    async fn test_query_mentioning_arxiv_on_fallback_has_no_papers() {
        let (pipeline, _) = pipeline(Err("boom"));
        let out = pipeline.run("arxiv papers on LLMs").await.unwrap();
        assert!(out.research.arxiv.is_none());
    }

    #[tokio::test]
    async fn test_blank_answer_is_not_replaced_by_query() {
        let (blank_pipeline, _) = pipeline(Ok(" ".to_string()));
        let out = blank_pipeline.run("arxiv papers on LLMs").await.unwrap();
        assert_eq!(out.research.wiki_web.as_deref(), Some(" "));
        assert!(out.research.arxiv.is_none());

        let (pipeline, _) = pipeline(Ok(String::new()));
        let out = pipeline.run("arxiv papers on LLMs").await.unwrap();
        assert_eq!(out.research.wiki_web.as_deref(), Some("arxiv papers on LLMs"));
        assert_eq!(out.research.arxiv.as_deref(), Some("arxiv papers on LLMs"));
    }

    #[tokio::test]
    async fn test_summary_failure_propagates() {
        let pipeline = Pipeline::new(
            Arc::new(StubResearcher(Ok("answer".to_string()))),
            Summarizer::new(Arc::new(FailingModel)),
        );
        assert!(matches!(pipeline.run("q").await, Err(QuillError::Llm(_))));
    }
}
