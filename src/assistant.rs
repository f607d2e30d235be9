//! Calculator and weather assistant.

use crate::agent::{Agent, ToolContext};
use crate::config::{Credentials, Prompts, Settings};
use crate::error::Result;
use crate::llm::create_client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Result of an assistant run, mirroring the agent's input/output pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistOutput {
    pub input: String,
    pub output: String,
}

/// Agent offered the calculator and weather tools.
pub struct Assistant {
    agent: Agent,
}

impl Assistant {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// Build the assistant. Requires the weather API key.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let client = create_client(&settings.llm, &credentials.llm_api_key)?;
        let tools = ToolContext::assistant(&settings.tools, credentials.weather_key()?)?;
        let agent = Agent::new(client, &settings.llm.model, tools)
            .with_system_prompt(&prompts.assistant.system)
            .with_max_iterations(settings.agent.max_iterations);
        Ok(Self::new(agent))
    }

    #[instrument(skip(self))]
    pub async fn assist(&self, input: &str) -> Result<AssistOutput> {
        let response = self.agent.run(input, None).await?;
        Ok(AssistOutput {
            input: input.to_string(),
            output: response.content,
        })
    }
}
