//! Prompt templates for Quill.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}").unwrap())
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub research: ResearchPrompts,
    pub summarizer: SummarizerPrompts,
    pub assistant: AssistantPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the research agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchPrompts {
    pub system: String,
}

impl Default for ResearchPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a research agent. Answer the user's question as best you can.

You have tools to query Wikipedia, search the web, and search arXiv for papers.
Think step-by-step about what information you need, then use the appropriate tools.

Guidelines:
- Use 'wikipedia' for background on people, places, concepts, and history
- Use 'web_search' for current events and general information
- Use 'arxiv' when the question concerns scientific papers or recent research
- Observe each tool result before deciding on the next step

When you have gathered enough information, write your final answer as plain text.
If you used arXiv results, list the relevant papers (title and date) in your answer."#
                .to_string(),
        }
    }
}

/// Prompt for the structured summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerPrompts {
    /// Template rendered with {{content}}.
    pub template: String,
}

impl Default for SummarizerPrompts {
    fn default() -> Self {
        Self {
            template: r#"
Act as a professional research summarization agent.

Using the content below, generate a structured academic summary with:

1. Topic Overview
2. Background Context
3. Core Concepts
4. Use-cases
5. Advantages
6. Challenges
7. Future Scope
8. Conclusion

Content:
"""{{content}}"""
"#
            .to_string(),
        }
    }
}

/// Prompts for the calculator/weather assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    pub system: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant with two tools.

- Use 'calculator' to evaluate arithmetic expressions such as 28*92
- Use 'weather' to look up the current weather for a city

Each tool returns a JSON object with "message", "total_bill" and "status" fields.
Answer with the tool's message when a tool was used."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let research_path = custom_path.join("research.toml");
            if research_path.exists() {
                let content = std::fs::read_to_string(&research_path)?;
                prompts.research = toml::from_str(&content)?;
            }

            let summarizer_path = custom_path.join("summarizer.toml");
            if summarizer_path.exists() {
                let content = std::fs::read_to_string(&summarizer_path)?;
                prompts.summarizer = toml::from_str(&content)?;
            }

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are replaced in a single pass over the template, so
    /// substituted values are inserted verbatim and never rendered again.
    /// Unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        placeholder_re()
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
