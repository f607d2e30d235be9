//! Configuration settings for Quill.

use crate::error::{QuillError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    pub tools: ToolSettings,
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when no -v flag or RUST_LOG is given.
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Language model endpoint settings.
///
/// Any OpenAI-compatible chat completions endpoint works. The default points
/// at Gemini's compatibility layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the chat completions API.
    pub api_base: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature (provider default if unset).
    pub temperature: Option<f32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_secs: 300,
            temperature: None,
        }
    }
}

/// Reasoning loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum number of model calls per agent run.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { max_iterations: 15 }
    }
}

/// Tool adapter endpoints and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// MediaWiki API endpoint.
    pub wikipedia_url: String,
    /// DuckDuckGo instant answer endpoint.
    pub duckduckgo_url: String,
    /// arXiv query endpoint.
    pub arxiv_url: String,
    /// OpenWeatherMap current weather endpoint.
    pub weather_url: String,
    /// Environment variable holding the weather API key.
    pub weather_api_key_env: String,
    /// Number of pages/papers/snippets fetched per query.
    pub max_results: usize,
    /// Maximum characters returned by a single tool call.
    pub max_chars: usize,
    /// HTTP timeout for tool requests, in seconds.
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            wikipedia_url: "https://en.wikipedia.org/w/api.php".to_string(),
            duckduckgo_url: "https://api.duckduckgo.com/".to_string(),
            arxiv_url: "https://export.arxiv.org/api/query".to_string(),
            weather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            weather_api_key_env: "WEATHER_API_KEY".to_string(),
            max_results: 3,
            max_chars: 4000,
            timeout_secs: 30,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Settings for the `ask` client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of a running `quill serve` instance.
    pub api_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// The file settings are read from: `custom` when given, else the default path.
    pub fn resolve_config_path(custom: Option<&str>) -> PathBuf {
        custom
            .map(Self::expand_path)
            .unwrap_or_else(Self::default_config_path)
    }

    /// Return a copy with the dotted `key` (e.g. `llm.model`) set to `raw`.
    ///
    /// `raw` is read as a TOML value (`8080`, `0.2`, `true`) unless the current
    /// value is a string, in which case it is taken literally.
    pub fn with_value(&self, key: &str, raw: &str) -> Result<Self> {
        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (parents.split('.').collect::<Vec<_>>(), leaf),
            None => (Vec::new(), key),
        };
        let unknown = || QuillError::Config(format!("Unknown config key '{}'", key));

        let mut document =
            toml::Value::try_from(self).map_err(|e| QuillError::Config(e.to_string()))?;
        let mut table = document.as_table_mut().ok_or_else(unknown)?;
        for part in parents {
            table = table
                .get_mut(part)
                .and_then(toml::Value::as_table_mut)
                .ok_or_else(unknown)?;
        }

        let value = match table.get(leaf) {
            Some(toml::Value::String(_)) => toml::Value::String(raw.to_string()),
            _ => parse_toml_value(raw),
        };
        table.insert(leaf.to_string(), value);

        let updated: Settings = document.try_into()?;

        // Keys serde does not know about are dropped on the way back.
        let check =
            toml::Value::try_from(&updated).map_err(|e| QuillError::Config(e.to_string()))?;
        key.split('.')
            .try_fold(&check, |node, part| node.get(part))
            .ok_or_else(unknown)?;

        Ok(updated)
    }
}

fn parse_toml_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

/// API keys resolved once at startup.
#[derive(Clone)]
pub struct Credentials {
    /// Key for the language model endpoint.
    pub llm_api_key: String,
    /// Key for the weather service, when configured.
    pub weather_api_key: Option<String>,
}

impl Credentials {
    /// Resolve credentials from the process environment.
    pub fn from_env(settings: &Settings) -> Result<Self> {
        Self::resolve(settings, |name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary lookup.
    ///
    /// A missing or empty language model key is an error; the weather key is optional.
    pub fn resolve<F>(settings: &Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let llm_api_key = non_empty(&settings.llm.api_key_env).ok_or_else(|| {
            QuillError::Config(format!(
                "{} is not set. Set it with: export {}='...'",
                settings.llm.api_key_env, settings.llm.api_key_env
            ))
        })?;

        Ok(Self {
            llm_api_key,
            weather_api_key: non_empty(&settings.tools.weather_api_key_env),
        })
    }

    /// Get the weather key, failing if it was not configured.
    pub fn weather_key(&self) -> Result<&str> {
        self.weather_api_key
            .as_deref()
            .ok_or_else(|| QuillError::Config("Weather API key is not set".to_string()))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &"***")
            .field(
                "weather_api_key",
                &self.weather_api_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}
