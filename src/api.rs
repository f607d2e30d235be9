//! Wire types shared by the HTTP server and the `ask` client.

use crate::pipeline::{PipelineOutput, ResearchBlock};
use serde::{Deserialize, Serialize};

/// Body of `POST /run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub query: String,
}

/// Response of `POST /run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub research: ResearchBlock,
    pub summary: String,
    pub email: String,
}

impl From<PipelineOutput> for RunResponse {
    fn from(output: PipelineOutput) -> Self {
        Self {
            research: output.research,
            summary: output.summary,
            email: output.email,
        }
    }
}

/// Body of `POST /assist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistRequest {
    pub input: String,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Header set on `/run` responses when research fell back to the query.
pub const FALLBACK_HEADER: &str = "x-research-fallback";
