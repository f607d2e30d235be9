//! Quill - multi-agent research, summary and email drafting
//!
//! Takes a free-text research query, gathers material with a tool-using
//! agent, condenses it into a structured summary and wraps that summary in a
//! formal email.
//!
//! # Overview
//!
//! Quill allows you to:
//! - Research a topic across Wikipedia, web search and arXiv
//! - Summarize the findings into a fixed eight-section outline
//! - Draft a formal email around the summary
//! - Ask a small calculator/weather assistant
//! - Serve all of the above over HTTP and query it from the terminal
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `llm` - Chat-completion client and the `LanguageModel` seam
//! - `tools` - Wikipedia, web search, arXiv, calculator and weather tools
//! - `agent` - Tool-calling agent loop
//! - `research` - Research agent and failure classification
//! - `summarizer` - Structured summary step
//! - `trim` - arXiv text trimming
//! - `email` - Email formatting
//! - `pipeline` - Research, summary and email orchestration
//! - `assistant` - Calculator/weather assistant
//! - `api` - HTTP request and response bodies
//!
//! # Example
//!
//! ```rust,no_run
//! use quill::config::{Credentials, Settings};
//! use quill::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::from_env(&settings)?;
//!     let pipeline = Pipeline::from_settings(&settings, &credentials)?;
//!
//!     let output = pipeline.run("Quantum computing").await?;
//!     println!("{}", output.email);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod api;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod email;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod research;
pub mod summarizer;
pub mod tools;
pub mod trim;

pub use error::{QuillError, Result};
