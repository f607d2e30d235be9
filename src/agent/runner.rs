//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, ToolContext};
use crate::error::{QuillError, Result};
use crate::llm::map_openai_error;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use tracing::{debug, info};

/// Agent that alternates between model calls and tool executions until it has an answer.
pub struct Agent {
    client: Client<OpenAIConfig>,
    model: String,
    tools: ToolContext,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent over the given client, model and tools.
    pub fn new(client: Client<OpenAIConfig>, model: &str, tools: ToolContext) -> Self {
        Self {
            client,
            model: model.to_string(),
            tools,
            max_iterations: 15,
            system_prompt: String::new(),
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run the agent with a user task.
    pub async fn run(&self, task: &str, context: Option<&str>) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if !self.system_prompt.is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.clone())
                    .build()
                    .map_err(|e| QuillError::Agent(e.to_string()))?
                    .into(),
            );
        }

        let user_message = match context {
            Some(ctx) => format!("Context: {}\n\nTask: {}", ctx, task),
            None => task.to_string(),
        };

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| QuillError::Agent(e.to_string()))?
                .into(),
        );

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(QuillError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(messages.clone())
                .tools(self.tools.definitions())
                .build()
                .map_err(|e| QuillError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(map_openai_error)?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| QuillError::Llm("No response from model".to_string()))?;

            match choice.message.tool_calls {
                Some(ref tool_calls) if !tool_calls.is_empty() => {
                    let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls.clone())
                        .build()
                        .map_err(|e| QuillError::Agent(e.to_string()))?;
                    messages.push(assistant_msg.into());

                    for tool_call in tool_calls {
                        let record = self.execute_tool_call(tool_call).await;

                        let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(&tool_call.id)
                            .content(record.result.clone())
                            .build()
                            .map_err(|e| QuillError::Agent(e.to_string()))?;
                        messages.push(tool_msg.into());

                        tool_calls_made.push(record);
                    }
                }
                _ => {
                    return Ok(AgentResponse {
                        content: choice.message.content.clone().unwrap_or_default(),
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Failures are reported back to the model as text so it can recover.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (model calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fixtures::{client_for, text_reply, tool_calls_reply, COMPLETIONS_PATH};
    use crate::config::LlmSettings;
    use crate::llm::create_client;
    use mockito::Matcher;

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "arxiv".to_string(),
            arguments: r#"{"query": "transformers"}"#.to_string(),
            result: "Published: 2017-06-12".to_string(),
        };
        assert_eq!(format!("{}", record), r#"arxiv({"query": "transformers"})"#);
    }

    #[tokio::test]
    async fn test_zero_iterations_fails_without_calling_model() {
        let client = create_client(&LlmSettings::default(), "unused").unwrap();
        let agent = Agent::new(client, "gemini-2.5-flash", ToolContext::calculator_only())
            .with_max_iterations(0);

        let err = agent.run("28*92", None).await.unwrap_err();
        assert!(matches!(err, QuillError::Agent(_)));
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", COMPLETIONS_PATH)
            .expect(1)
            .with_header("content-type", "application/json")
            .with_body(tool_calls_reply(&[("calculator", r#"{"expression":"28*92"}"#)]))
            .create_async()
            .await;
        let second = server
            .mock("POST", COMPLETIONS_PATH)
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""role":"tool""#.to_string()),
                Matcher::Regex("Result = 2576".to_string()),
            ]))
            .expect(1)
            .with_header("content-type", "application/json")
            .with_body(text_reply("28 times 92 is 2576."))
            .create_async()
            .await;

        let agent = Agent::new(client_for(&server), "gemini-2.5-flash", ToolContext::calculator_only())
            .with_system_prompt("You are a helpful assistant.");
        let response = agent.run("28*92", None).await.unwrap();

        assert_eq!(response.content, "28 times 92 is 2576.");
        assert_eq!(response.iterations, 2);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "calculator");
        assert!(response.tool_calls[0].result.contains("Result = 2576"));

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_final_answer_without_tools() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", COMPLETIONS_PATH)
            .with_header("content-type", "application/json")
            .with_body(text_reply("Hello there."))
            .create_async()
            .await;

        let agent = Agent::new(client_for(&server), "gemini-2.5-flash", ToolContext::calculator_only());
        let response = agent.run("hi", None).await.unwrap();

        assert_eq!(response.content, "Hello there.");
        assert_eq!(response.iterations, 1);
        assert!(response.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_bad_tool_calls_are_reported_to_model() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", COMPLETIONS_PATH)
            .expect(1)
            .with_header("content-type", "application/json")
            .with_body(tool_calls_reply(&[
                ("shell", r#"{"cmd":"ls"}"#),
                ("calculator", "not json"),
                ("wikipedia", r#"{"query":"Rust"}"#),
            ]))
            .create_async()
            .await;
        let second = server
            .mock("POST", COMPLETIONS_PATH)
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("Unknown tool: shell".to_string()),
                Matcher::Regex("Invalid tool arguments".to_string()),
                Matcher::Regex("is not available".to_string()),
            ]))
            .expect(1)
            .with_header("content-type", "application/json")
            .with_body(text_reply("I can only do arithmetic."))
            .create_async()
            .await;

        let agent = Agent::new(client_for(&server), "gemini-2.5-flash", ToolContext::calculator_only());
        let response = agent.run("list files", None).await.unwrap();

        assert_eq!(response.content, "I can only do arithmetic.");
        assert_eq!(response.tool_calls.len(), 3);
        assert!(response.tool_calls[0]
            .result
            .starts_with("Failed to parse tool call"));
        assert!(response.tool_calls[1]
            .result
            .starts_with("Failed to parse tool call"));
        assert!(response.tool_calls[2].result.starts_with("Tool error"));
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_iteration_cap_reached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", COMPLETIONS_PATH)
            .expect(3)
            .with_header("content-type", "application/json")
            .with_body(tool_calls_reply(&[("calculator", r#"{"expression":"1+1"}"#)]))
            .create_async()
            .await;

        let agent = Agent::new(client_for(&server), "gemini-2.5-flash", ToolContext::calculator_only())
            .with_max_iterations(3);
        let err = agent.run("loop forever", None).await.unwrap_err();

        assert!(matches!(err, QuillError::Agent(ref msg) if msg.contains("(3)")));
        mock.assert_async().await;
    }
}
