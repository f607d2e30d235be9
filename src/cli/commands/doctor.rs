//! Doctor command - verify credentials and configuration.

use crate::cli::preflight::check_url;
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Quill Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Credentials").bold());
    let lookup = |name: &str| std::env::var(name).ok();
    let key_checks = [
        check_key(&settings.llm.api_key_env, lookup(&settings.llm.api_key_env), true),
        check_key(
            &settings.tools.weather_api_key_env,
            lookup(&settings.tools.weather_api_key_env),
            false,
        ),
    ];
    for check in key_checks {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Endpoints").bold());
    let endpoint_checks = [
        check_endpoint("Language model", &settings.llm.api_base),
        check_endpoint("Wikipedia", &settings.tools.wikipedia_url),
        check_endpoint("Web search", &settings.tools.duckduckgo_url),
        check_endpoint("arXiv", &settings.tools.arxiv_url),
        check_endpoint("Weather", &settings.tools.weather_url),
        check_endpoint("Client API URL", &settings.client.api_url),
    ];
    for check in endpoint_checks {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);
    Output::kv("Model", &settings.llm.model);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Quill.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Quill is ready to use.");
    }

    Ok(())
}

/// Check an API key variable. Required keys are errors when missing, optional ones warnings.
fn check_key(name: &str, value: Option<String>, required: bool) -> CheckResult {
    let hint = format!("Set with: export {}='...' (or add it to .env)", name);
    match value {
        Some(key) if !key.trim().is_empty() => {
            CheckResult::ok(name, &format!("configured ({})", mask(&key)))
        }
        Some(_) if required => CheckResult::error(name, "empty", &hint),
        None if required => CheckResult::error(name, "not set", &hint),
        Some(_) => CheckResult::warning(name, "empty (assistant disabled)", &hint),
        None => CheckResult::warning(name, "not set (assistant disabled)", &hint),
    }
}

fn check_endpoint(name: &str, raw: &str) -> CheckResult {
    match check_url(raw) {
        Ok(()) => CheckResult::ok(name, raw),
        Err(e) => CheckResult::error(name, &e.to_string(), "Fix the URL in the config file"),
    }
}

/// Check that the config file exists and parses.
fn check_config_file(config_path: &Path) -> CheckResult {
    if !config_path.exists() {
        return CheckResult::warning(
            "Config file",
            &format!("{} not found, using defaults", config_path.display()),
            "Create with: quill config edit",
        );
    }
    match Settings::load_from(Some(&config_path.to_path_buf())) {
        Ok(_) => CheckResult::ok("Config file", &config_path.display().to_string()),
        Err(e) => CheckResult::error("Config file", &e.to_string(), "Fix with: quill config edit"),
    }
}

/// Show only the ends of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
