//! Assist command implementation.

use crate::assistant::Assistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the calculator/weather assistant and print its structured result.
pub async fn run_assist(input: &str, settings: Settings) -> Result<()> {
    let credentials = match preflight::credentials(Operation::Assist, &settings) {
        Ok(credentials) => credentials,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'quill doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let assistant = Assistant::from_settings(&settings, &credentials)?;

    let spinner = Output::spinner("Assistant working...");
    let result = assistant.assist(input).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Assistant failed: {}", e));
            Err(e.into())
        }
    }
}
