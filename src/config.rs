use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::error::{AppError, AppResult};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_LOG_LEVEL: &str = "info";
const ENV_FILE: &str = ".env";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub linear_api_key: Option<String>,
    /// When set, every inbound webhook must carry a valid signature.
    pub linear_webhook_secret: Option<String>,
    pub github_token: Option<String>,
    pub github_org: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub llm_provider: LlmProvider,
    pub trigger_mode: TriggerMode,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    Custom(String),
}

/// How `POST /enrich/{id}` relates the response to the pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Await the pipeline and report its outcome.
    Sync,
    /// Acknowledge immediately and run the pipeline detached.
    Async,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Sync => "sync",
            TriggerMode::Async => "async",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl AppConfig {
    /// Reads the process environment, falling back to a `.env` file in the
    /// working directory for variables the environment does not set.
    pub fn load() -> AppResult<Self> {
        Self::load_with_env_file(Path::new(ENV_FILE), |key| env::var(key).ok())
    }

    fn load_with_env_file<F>(path: &Path, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_env_file(path)?;
        Self::from_lookup(|key| lookup(key).or_else(|| file_vars.get(key).cloned()))
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset, so `FOO=` in an env file disables FOO.
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|err| AppError::Configuration(format!("invalid PORT '{raw}': {err}")))?,
            None => DEFAULT_PORT,
        };

        let llm_provider = get("LLM_PROVIDER")
            .map(|provider| match provider.to_lowercase().as_str() {
                "anthropic" => LlmProvider::Anthropic,
                other => LlmProvider::Custom(other.to_string()),
            })
            .unwrap_or(LlmProvider::Anthropic);

        let trigger_mode = match get("ENRICH_MODE").map(|mode| mode.to_lowercase()) {
            None => TriggerMode::Async,
            Some(mode) if mode == "async" => TriggerMode::Async,
            Some(mode) if mode == "sync" => TriggerMode::Sync,
            Some(other) => {
                return Err(AppError::Configuration(format!(
                    "ENRICH_MODE must be 'sync' or 'async', got '{other}'"
                )));
            }
        };

        let log_format = match get("LOG_FORMAT").map(|format| format.to_lowercase()) {
            Some(format) if format == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            linear_api_key: get("LINEAR_API_KEY"),
            linear_webhook_secret: get("LINEAR_WEBHOOK_SECRET"),
            github_token: get("GITHUB_TOKEN"),
            github_org: get("GITHUB_ORG"),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            anthropic_model: get("ANTHROPIC_MODEL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            llm_provider,
            trigger_mode,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format,
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses a dotenv file. A missing file yields no variables.
fn read_env_file(path: &Path) -> AppResult<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(err) if err.not_found() => return Ok(HashMap::new()),
        Err(err) => {
            return Err(AppError::Configuration(format!(
                "failed to read {}: {err}",
                path.display()
            )));
        }
    };
    entries
        .map(|entry| {
            entry.map_err(|err| {
                AppError::Configuration(format!("invalid entry in {}: {err}", path.display()))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_address(), "0.0.0.0:3000");
        assert_eq!(config.trigger_mode, TriggerMode::Async);
        assert_eq!(config.llm_provider, LlmProvider::Anthropic);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.linear_webhook_secret.is_none());
        assert!(config.github_token.is_none());
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config = config_from(&[("LINEAR_WEBHOOK_SECRET", "  "), ("GITHUB_TOKEN", "")]).unwrap();
        assert!(config.linear_webhook_secret.is_none());
        assert!(config.github_token.is_none());
    }

    #[test]
    fn reads_trigger_mode_and_port() {
        let config = config_from(&[("ENRICH_MODE", "SYNC"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.trigger_mode, TriggerMode::Sync);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn rejects_unknown_trigger_mode() {
        let err = config_from(&[("ENRICH_MODE", "later")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn rejects_invalid_port() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn custom_provider_is_preserved() {
        let config = config_from(&[("LLM_PROVIDER", "Mistral")]).unwrap();
        assert_eq!(config.llm_provider, LlmProvider::Custom("mistral".to_string()));
    }

    fn env_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn env_file_fills_unset_variables() {
        let file = env_file("LINEAR_API_KEY=lin_from_file\nENRICH_MODE=sync\nPORT=4000\n");

        let config = AppConfig::load_with_env_file(file.path(), |key| match key {
            "PORT" => Some("8080".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.linear_api_key.as_deref(), Some("lin_from_file"));
        assert_eq!(config.trigger_mode, TriggerMode::Sync);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();

        let config =
            AppConfig::load_with_env_file(&dir.path().join(".env"), |_| None).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.linear_api_key, None);
    }

    #[test]
    fn blank_entry_in_env_file_counts_as_unset() {
        let file = env_file("GITHUB_TOKEN=\n");

        let config = AppConfig::load_with_env_file(file.path(), |_| None).unwrap();

        assert_eq!(config.github_token, None);
    }
}
