use serde::Deserialize;
use std::path::Path;

use crate::clock::DEFAULT_TIMEZONE;
use crate::error::CoachError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub coach: CoachConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "momentum.db".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// IANA zone name. An unknown name falls back to the default zone at
    /// clock construction, it does not fail config loading.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            timezone: default_timezone(),
        }
    }
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoachConfig {
    /// Transcript entries sent per request (not a retention cap).
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Stored sessions replayed into memory on startup.
    #[serde(default = "default_rehydrate_sessions")]
    pub rehydrate_sessions: u32,
    #[serde(default = "default_max_reply_tokens")]
    pub max_reply_tokens: u32,
    #[serde(default = "default_max_feedback_tokens")]
    pub max_feedback_tokens: u32,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            rehydrate_sessions: default_rehydrate_sessions(),
            max_reply_tokens: default_max_reply_tokens(),
            max_feedback_tokens: default_max_feedback_tokens(),
        }
    }
}

fn default_history_window() -> usize {
    20
}
fn default_rehydrate_sessions() -> u32 {
    5
}
fn default_max_reply_tokens() -> u32 {
    2000
}
fn default_max_feedback_tokens() -> u32 {
    250
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoachError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| CoachError::config(format!("invalid {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [provider]
            api_key = "sk-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.model, default_model());
        assert_eq!(config.state.db_path, "momentum.db");
        assert_eq!(config.user.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.coach.history_window, 20);
        assert_eq!(config.coach.rehydrate_sessions, 5);
    }

    #[test]
    fn explicit_values_win() {
        let config: AppConfig = toml::from_str(
            r#"
            [provider]
            api_key = "sk-test"
            model = "claude-haiku-4"

            [user]
            user_id = "ana"
            timezone = "Europe/Madrid"

            [coach]
            history_window = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.model, "claude-haiku-4");
        assert_eq!(config.user.user_id, "ana");
        assert_eq!(config.user.timezone, "Europe/Madrid");
        assert_eq!(config.coach.history_window, 12);
        assert_eq!(config.coach.max_reply_tokens, 2000);
    }

    #[test]
    fn missing_api_key_fails() {
        let result: Result<AppConfig, _> = toml::from_str("[provider]\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_failures_classify_as_config_errors() {
        use crate::error::CoachErrorKind;

        let missing = AppConfig::load(Path::new("/no/such/config.toml")).unwrap_err();
        let coach = missing.downcast_ref::<CoachError>().unwrap();
        assert_eq!(coach.kind, CoachErrorKind::Config);

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not = [valid").unwrap();
        let invalid = AppConfig::load(file.path()).unwrap_err();
        let coach = invalid.downcast_ref::<CoachError>().unwrap();
        assert_eq!(coach.kind, CoachErrorKind::Config);
        assert!(coach.user_message().starts_with("Configuration problem:"));
    }
}
