//! Agent system for tool-using task execution.
//!
//! Provides a chat-completions agent that picks tools, reads their output and
//! repeats until it can answer. The research agent is offered Wikipedia, web
//! search and arXiv; the assistant is offered the calculator and weather tools.

#[cfg(test)]
pub(crate) mod fixtures;
mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, ToolCall, ToolContext, ToolKind};
