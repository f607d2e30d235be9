//! Canned chat completion bodies for agent tests.

use crate::config::LlmSettings;
use crate::llm::create_client;
use async_openai::{config::OpenAIConfig, Client};
use serde_json::{json, Value};

pub const COMPLETIONS_PATH: &str = "/chat/completions";

/// Client pointed at a mock server.
pub fn client_for(server: &mockito::ServerGuard) -> Client<OpenAIConfig> {
    let settings = LlmSettings {
        api_base: server.url(),
        ..LlmSettings::default()
    };
    create_client(&settings, "test-key").unwrap()
}

fn completion(message: Value) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": "gemini-2.5-flash",
        "choices": [{ "index": 0, "message": message, "finish_reason": "stop" }]
    })
    .to_string()
}

/// A reply requesting the given `(name, arguments)` tool calls.
pub fn tool_calls_reply(calls: &[(&str, &str)]) -> String {
    let tool_calls: Vec<Value> = calls
        .iter()
        .enumerate()
        .map(|(i, (name, arguments))| {
            json!({
                "id": format!("call_{}", i),
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            })
        })
        .collect();
    completion(json!({ "role": "assistant", "content": null, "tool_calls": tool_calls }))
}

/// A final text reply.
pub fn text_reply(text: &str) -> String {
    completion(json!({ "role": "assistant", "content": text }))
}
