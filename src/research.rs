//! Research step: answer a query with the tool-using agent.
//!
//! The research capability is a trait so the pipeline can run against stubs.
//! Its result is turned into a typed [`ResearchOutcome`] instead of being
//! swallowed, so callers can tell why research fell back.

use crate::agent::{Agent, ToolContext};
use crate::config::{Credentials, Prompts, Settings};
use crate::error::{QuillError, Result};
use crate::llm::create_client;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

/// Answers a free-text query, typically by consulting external tools.
#[async_trait]
pub trait Researcher: Send + Sync {
    /// Produce a textual answer for the query.
    async fn research(&self, query: &str) -> Result<String>;
}

/// [`Researcher`] backed by an agent with the Wikipedia, web search and arXiv tools.
pub struct AgentResearcher {
    agent: Agent,
}

impl AgentResearcher {
    /// Wrap an already configured agent.
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// Build the research agent from settings.
    pub fn from_settings(
        settings: &Settings,
        credentials: &Credentials,
        prompts: &Prompts,
    ) -> Result<Self> {
        let client = create_client(&settings.llm, &credentials.llm_api_key)?;
        let tools = ToolContext::research(&settings.tools)?;
        let agent = Agent::new(client, &settings.llm.model, tools)
            .with_system_prompt(&prompts.research.system)
            .with_max_iterations(settings.agent.max_iterations);
        Ok(Self::new(agent))
    }
}

#[async_trait]
impl Researcher for AgentResearcher {
    #[instrument(skip(self))]
    async fn research(&self, query: &str) -> Result<String> {
        let response = self.agent.run(query, None).await?;
        debug!(
            "Research finished in {} iteration(s) with {} tool call(s)",
            response.iterations,
            response.tool_calls.len()
        );
        Ok(response.content)
    }
}

/// Why the research step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A tool adapter failed.
    Tool,
    /// A response (model or tool) could not be parsed.
    Parse,
    /// The remote service could not be reached.
    Network,
    /// The language model endpoint returned an error.
    Model,
    /// The reasoning loop gave up (iteration limit).
    Exhausted,
    /// Anything else.
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Tool => "tool",
            FailureKind::Parse => "parse",
            FailureKind::Network => "network",
            FailureKind::Model => "model",
            FailureKind::Exhausted => "exhausted",
            FailureKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified research failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl From<QuillError> for ResearchFailure {
    fn from(err: QuillError) -> Self {
        let kind = match &err {
            QuillError::Tool(_) => FailureKind::Tool,
            QuillError::Parse(_) | QuillError::Json(_) | QuillError::TomlParse(_) => {
                FailureKind::Parse
            }
            QuillError::Http(_) | QuillError::Network(_) | QuillError::Io(_) => {
                FailureKind::Network
            }
            QuillError::Llm(_) => FailureKind::Model,
            QuillError::Agent(_) => FailureKind::Exhausted,
            QuillError::Config(_) | QuillError::InvalidInput(_) => FailureKind::Internal,
        };
        Self {
            kind,
            reason: err.to_string(),
        }
    }
}

/// Typed result of the research step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchOutcome {
    Answered(String),
    Failed(ResearchFailure),
}

impl ResearchOutcome {
    /// Run a researcher and classify the result.
    ///
    /// An answer with no content at all counts as "no output" and is replaced
    /// by the query. Whitespace is content and is kept as returned.
    pub async fn collect(researcher: &dyn Researcher, query: &str) -> Self {
        match researcher.research(query).await {
            Ok(answer) if answer.is_empty() => ResearchOutcome::Answered(query.to_string()),
            Ok(answer) => ResearchOutcome::Answered(answer),
            Err(e) => ResearchOutcome::Failed(e.into()),
        }
    }

    pub fn failure(&self) -> Option<&ResearchFailure> {
        match self {
            ResearchOutcome::Failed(f) => Some(f),
            ResearchOutcome::Answered(_) => None,
        }
    }
}
