//! Configuration module for Quill.
//!
//! Handles loading and managing application settings, credentials and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts, ResearchPrompts, SummarizerPrompts};
pub use settings::{
    AgentSettings, ClientSettings, Credentials, GeneralSettings, LlmSettings, PromptSettings,
    ServerSettings, Settings, ToolSettings,
};
