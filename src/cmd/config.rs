use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the configuration resolved from the environment (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(),
    }
}

fn run_show() -> AppResult<()> {
    let cfg = AppConfig::load()?;
    for line in describe(&cfg) {
        println!("{line}");
    }
    Ok(())
}

fn describe(cfg: &AppConfig) -> Vec<String> {
    vec![
        format!("Listen address: {}", cfg.listen_address()),
        format!("Trigger mode: {}", cfg.trigger_mode.as_str()),
        format!("Linear API key: {}", mask_secret(&cfg.linear_api_key)),
        format!(
            "Linear webhook secret: {}",
            mask_secret(&cfg.linear_webhook_secret)
        ),
        format!("GitHub token: {}", mask_secret(&cfg.github_token)),
        format!("GitHub organization: {}", display_value(&cfg.github_org)),
        format!("Anthropic API key: {}", mask_secret(&cfg.anthropic_api_key)),
        format!("Anthropic model: {}", cfg.anthropic_model),
        format!("Log level: {}", cfg.log_level),
    ]
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let prefix: String = token.chars().take(3).collect();
            let suffix: String = token.chars().skip(token.chars().count() - 3).collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
