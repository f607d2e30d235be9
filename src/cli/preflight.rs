//! Pre-flight checks before commands run.
//!
//! Missing credentials are reported up front instead of failing at the first
//! model or weather call.

use crate::config::{Credentials, Settings};
use crate::error::{QuillError, Result};

/// Operations that need credentials.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Research pipeline (local run or server) requires the model key.
    Research,
    /// The assistant requires the model key and the weather key.
    Assist,
}

/// Resolve the credentials an operation needs from the environment.
pub fn credentials(operation: Operation, settings: &Settings) -> Result<Credentials> {
    credentials_with(operation, settings, |name| std::env::var(name).ok())
}

fn credentials_with<F>(operation: Operation, settings: &Settings, lookup: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::resolve(settings, lookup)?;
    if let Operation::Assist = operation {
        credentials.weather_key().map_err(|_| {
            QuillError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                settings.tools.weather_api_key_env, settings.tools.weather_api_key_env
            ))
        })?;
    }
    Ok(credentials)
}

/// Check that a server URL is usable.
pub fn check_url(raw: &str) -> Result<()> {
    let url = url::Url::parse(raw)
        .map_err(|e| QuillError::Config(format!("Invalid API URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(QuillError::Config(format!(
            "Unsupported URL scheme '{}' in {}",
            other, raw
        ))),
    }
}
