use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const APP_DIR: &str = "lab_intake";
const MAX_SUBMIT_ATTEMPTS: u32 = 10;

/// User-editable settings. Keys missing from the file take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where submissions are written. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub submit_attempts: u32,
    pub retry_backoff_ms: u64,
    pub plain_output: bool,
    pub high_contrast: bool,
    /// `tracing` filter directive, e.g. `lab_intake=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            submit_attempts: 3,
            retry_backoff_ms: 250,
            plain_output: false,
            high_contrast: false,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(APP_DIR)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SUBMIT_ATTEMPTS).contains(&self.submit_attempts) {
            return Err(ConfigError::Invalid {
                key: "submit_attempts",
                reason: format!("must be between 1 and {MAX_SUBMIT_ATTEMPTS}"),
            });
        }
        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "log_filter",
                    reason: "must not be blank".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: Config = serde_json::from_str(r#"{ "plain_output": true }"#).unwrap();
        assert!(config.plain_output);
        assert_eq!(config.submit_attempts, 3);
        assert_eq!(config.retry_backoff(), Duration::from_millis(250));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config = Config {
            data_dir: Some(PathBuf::from("/srv/intake")),
            ..Config::default()
        };
        assert_eq!(config.resolve_data_dir(), PathBuf::from("/srv/intake"));
        assert!(Config::default().resolve_data_dir().ends_with(APP_DIR));
    }

    #[test]
    fn zero_attempts_are_rejected() {
        let config = Config {
            submit_attempts: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "submit_attempts",
                ..
            })
        ));
    }
}
