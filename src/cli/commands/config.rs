//! Config command: inspect and change the settings file.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the config command against the file at `config_path`.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if config_path.exists() {
                println!("# {}", config_path.display());
            } else {
                println!("# {} (not found, showing defaults)", config_path.display());
            }
            println!("{}", toml::to_string_pretty(&settings)?);
            print_key_status(&settings);
        }

        ConfigAction::Set { key, value } => {
            let updated = settings
                .with_value(key, value)
                .with_context(|| format!("Cannot set {} = {}", key, value))?;
            updated.save_to(config_path)?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::kv("Config file", &config_path.display().to_string());
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(config_path)?;
                Output::info(&format!("Created default config at {}", config_path.display()));
            }

            let editor = std::env::var("VISUAL")
                .or_else(|_| std::env::var("EDITOR"))
                .unwrap_or_else(|_| "vi".to_string());
            Output::info(&format!("Opening config in {}...", editor));

            match std::process::Command::new(&editor).arg(config_path).status() {
                Ok(status) if status.success() => {
                    Settings::load_from(Some(&config_path.to_path_buf()))
                        .with_context(|| format!("{} is not valid", config_path.display()))?;
                    Output::success("Config saved.");
                }
                Ok(_) => Output::warning("Editor exited with non-zero status."),
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Keys are never stored in the file; report which variables are set.
fn print_key_status(settings: &Settings) {
    for name in [&settings.llm.api_key_env, &settings.tools.weather_api_key_env] {
        let status = match std::env::var(name) {
            Ok(v) if !v.trim().is_empty() => "set",
            _ => "not set",
        };
        Output::kv(name, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_writes_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quill.toml");

        let action = ConfigAction::Set {
            key: "server.port".to_string(),
            value: "9100".to_string(),
        };
        run_config(&action, Settings::default(), &path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 9100);
    }

    #[test]
    fn test_set_unknown_key_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quill.toml");

        let action = ConfigAction::Set {
            key: "server.prot".to_string(),
            value: "9100".to_string(),
        };
        assert!(run_config(&action, Settings::default(), &path).is_err());
        assert!(!path.exists());
    }
}
