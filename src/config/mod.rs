//! Locates the settings file and the submissions directory.

use std::{env, path::PathBuf};

use intake_config::{Config, ConfigError, ConfigManager};

pub const HOME_ENV: &str = "LAB_INTAKE_HOME";
const DEFAULT_DIR_NAME: &str = ".lab_intake";

/// `LAB_INTAKE_HOME`, or `~/.lab_intake`.
pub fn app_home() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn default_manager() -> Result<ConfigManager, ConfigError> {
    ConfigManager::with_base_dir(app_home())
}

/// Loads settings from the default location.
pub fn load() -> Result<(ConfigManager, Config), ConfigError> {
    let manager = default_manager()?;
    let config = manager.load()?;
    Ok((manager, config))
}

/// Command-line override first, then the configured or platform default.
pub fn data_dir(config: &Config, override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(|| config.resolve_data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_beats_configured_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/configured")),
            ..Config::default()
        };
        assert_eq!(
            data_dir(&config, Some(PathBuf::from("/flag"))),
            PathBuf::from("/flag")
        );
        assert_eq!(data_dir(&config, None), PathBuf::from("/configured"));
    }
}
