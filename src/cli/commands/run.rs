//! Run command: execute the pipeline in-process.

use super::ask::render;
use crate::api::RunResponse;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the research pipeline for a single query.
pub async fn run_pipeline(query: &str, settings: Settings) -> Result<()> {
    if query.trim().is_empty() {
        Output::warning("Please enter a valid query");
        anyhow::bail!("empty query");
    }

    let credentials = match preflight::credentials(Operation::Research, &settings) {
        Ok(credentials) => credentials,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'quill doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let pipeline = Pipeline::from_settings(&settings, &credentials)?;

    let spinner = Output::spinner("AI agents working...");
    let result = pipeline.run(query).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => {
            if let Some(failure) = output.outcome.failure() {
                Output::warning(&format!(
                    "Research failed ({}); the summary is based on the query alone: {}",
                    failure.kind, failure.reason
                ));
            }
            render(&RunResponse::from(output));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Pipeline failed: {}", e));
            Err(e.into())
        }
    }
}
