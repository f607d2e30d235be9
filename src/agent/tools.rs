//! Tool definitions and dispatch for the agent system.

use crate::config::ToolSettings;
use crate::error::{QuillError, Result};
use crate::tools::{calculate, http_client, ArxivTool, WeatherTool, WebSearchTool, WikipediaTool};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::{Deserialize, Serialize};

/// A parsed tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Look a topic up on Wikipedia.
    Wikipedia { query: String },

    /// Search the web.
    WebSearch { query: String },

    /// Search arXiv for papers.
    Arxiv { query: String },

    /// Evaluate an arithmetic expression.
    Calculator { expression: String },

    /// Fetch the current weather for a city.
    Weather { city: String },
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::Wikipedia { .. } => ToolKind::Wikipedia,
            ToolCall::WebSearch { .. } => ToolKind::WebSearch,
            ToolCall::Arxiv { .. } => ToolKind::Arxiv,
            ToolCall::Calculator { .. } => ToolKind::Calculator,
            ToolCall::Weather { .. } => ToolKind::Weather,
        }
    }
}

/// The tools an agent can be offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Wikipedia,
    WebSearch,
    Arxiv,
    Calculator,
    Weather,
}

impl ToolKind {
    /// Tools offered to the research agent.
    pub const RESEARCH: [ToolKind; 3] = [ToolKind::Wikipedia, ToolKind::WebSearch, ToolKind::Arxiv];

    /// Tools offered to the calculator/weather assistant.
    pub const ASSISTANT: [ToolKind; 2] = [ToolKind::Calculator, ToolKind::Weather];

    /// Function name exposed to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Wikipedia => "wikipedia",
            ToolKind::WebSearch => "web_search",
            ToolKind::Arxiv => "arxiv",
            ToolKind::Calculator => "calculator",
            ToolKind::Weather => "weather",
        }
    }

    fn definition(&self) -> ChatCompletionTool {
        let (description, param, param_description) = match self {
            ToolKind::Wikipedia => (
                "Look up a topic on Wikipedia. Useful for general questions about people, \
                places, companies, facts, historical events, or other subjects.",
                "query",
                "Search query",
            ),
            ToolKind::WebSearch => (
                "Search the web. Useful for questions about current events or \
                information not covered by an encyclopedia.",
                "query",
                "Search query",
            ),
            ToolKind::Arxiv => (
                "Search arXiv for scientific articles in physics, mathematics, computer \
                science, quantitative biology, finance, statistics, and related fields.",
                "query",
                "Search query",
            ),
            ToolKind::Calculator => (
                "Evaluate a math expression such as 28*92 or (3+4)**2.",
                "expression",
                "Arithmetic expression",
            ),
            ToolKind::Weather => (
                "Fetch the current weather for a city.",
                "city",
                "City name, e.g. Hyderabad",
            ),
        };

        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: self.name().to_string(),
                description: Some(description.to_string()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        (param): {
                            "type": "string",
                            "description": param_description
                        }
                    },
                    "required": [param]
                })),
                strict: None,
            },
        }
    }
}

/// Tool execution context: the adapters an agent may call.
pub struct ToolContext {
    kinds: Vec<ToolKind>,
    wikipedia: Option<WikipediaTool>,
    web: Option<WebSearchTool>,
    arxiv: Option<ArxivTool>,
    weather: Option<WeatherTool>,
}

impl ToolContext {
    /// Context with the Wikipedia, web search and arXiv tools.
    pub fn research(settings: &ToolSettings) -> Result<Self> {
        let client = http_client(settings)?;
        Ok(Self {
            kinds: ToolKind::RESEARCH.to_vec(),
            wikipedia: Some(WikipediaTool::new(client.clone(), settings)),
            web: Some(WebSearchTool::new(client.clone(), settings)),
            arxiv: Some(ArxivTool::new(client, settings)),
            weather: None,
        })
    }

    /// Context with the calculator and weather tools.
    pub fn assistant(settings: &ToolSettings, weather_api_key: &str) -> Result<Self> {
        let client = http_client(settings)?;
        Ok(Self {
            kinds: ToolKind::ASSISTANT.to_vec(),
            wikipedia: None,
            web: None,
            arxiv: None,
            weather: Some(WeatherTool::new(client, settings, weather_api_key)),
        })
    }

    /// Context with only the calculator (needs no network).
    pub fn calculator_only() -> Self {
        Self {
            kinds: vec![ToolKind::Calculator],
            wikipedia: None,
            web: None,
            arxiv: None,
            weather: None,
        }
    }

    /// Tools offered by this context.
    pub fn kinds(&self) -> &[ToolKind] {
        &self.kinds
    }

    /// Function definitions for the offered tools.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.kinds.iter().map(ToolKind::definition).collect()
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        if !self.kinds.contains(&tool.kind()) {
            return Err(QuillError::Tool(format!(
                "Tool '{}' is not available",
                tool.kind().name()
            )));
        }

        let unavailable = || QuillError::Tool(format!("Tool '{}' is not configured", tool.kind().name()));

        match tool {
            ToolCall::Wikipedia { query } => {
                self.wikipedia.as_ref().ok_or_else(unavailable)?.run(query).await
            }
            ToolCall::WebSearch { query } => self.web.as_ref().ok_or_else(unavailable)?.run(query).await,
            ToolCall::Arxiv { query } => self.arxiv.as_ref().ok_or_else(unavailable)?.run(query).await,
            ToolCall::Calculator { expression } => calculate(expression).to_json(),
            ToolCall::Weather { city } => {
                self.weather
                    .as_ref()
                    .ok_or_else(unavailable)?
                    .run(city)
                    .await?
                    .to_json()
            }
        }
    }
}

/// Parse a tool call from the chat completions response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| QuillError::Parse(format!("Invalid tool arguments: {}", e)))?;

    let string_arg = |key: &str| -> Result<String> {
        args[key]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| QuillError::Parse(format!("Missing '{}' argument", key)))
    };

    match name {
        "wikipedia" => Ok(ToolCall::Wikipedia {
            query: string_arg("query")?,
        }),
        "web_search" => Ok(ToolCall::WebSearch {
            query: string_arg("query")?,
        }),
        "arxiv" => Ok(ToolCall::Arxiv {
            query: string_arg("query")?,
        }),
        "calculator" => Ok(ToolCall::Calculator {
            expression: string_arg("expression")?,
        }),
        "weather" => Ok(ToolCall::Weather {
            city: string_arg("city")?,
        }),
        _ => Err(QuillError::Parse(format!("Unknown tool: {}", name))),
    }
}
