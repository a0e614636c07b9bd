use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.toml";

/// Upper bound for the stop timeout, one day
pub const MAX_STOP_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Defaults read from `config.toml`; command-line flags take precedence
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwimConfig {
    /// Engine address; `None` uses `DOCKER_HOST` or the default socket
    pub docker_host: Option<String>,
    pub stop_timeout_secs: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for SwimConfig {
    fn default() -> Self {
        Self {
            docker_host: None,
            stop_timeout_secs: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl SwimConfig {
    /// `$XDG_CONFIG_HOME/swim/config.toml` or the platform equivalent
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("swim")
            .join(CONFIG_FILE)
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: SwimConfig =
            toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.stop_timeout_secs > MAX_STOP_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "stop_timeout_secs".to_string(),
                reason: format!("must be at most {MAX_STOP_TIMEOUT_SECS}"),
            });
        }
        if let Some(host) = &self.docker_host {
            if host.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "docker_host".to_string(),
                    reason: "must not be empty; omit it to use the local defaults".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("stop_timeout_secs = 30\n");
        let config = SwimConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config,
            SwimConfig {
                stop_timeout_secs: 30,
                ..SwimConfig::default()
            }
        );
        assert_eq!(config.stop_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"
docker_host = "unix:///run/user/1000/docker.sock"
stop_timeout_secs = 5
log_level = "swim=debug"
log_format = "json"
"#,
        );
        let config = SwimConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.docker_host.as_deref(),
            Some("unix:///run/user/1000/docker.sock")
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "swim=debug");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let file = write_config("stop_timeout = 5\n");
        assert!(matches!(
            SwimConfig::from_file(file.path()),
            Err(ConfigError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_empty_docker_host_is_rejected() {
        let file = write_config("docker_host = \" \"\n");
        assert!(matches!(
            SwimConfig::from_file(file.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_oversized_stop_timeout_is_rejected() {
        let file = write_config("stop_timeout_secs = 86401\n");
        assert!(matches!(
            SwimConfig::from_file(file.path()),
            Err(ConfigError::InvalidValue { field, .. }) if field == "stop_timeout_secs"
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            SwimConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_default_path_ends_with_swim_config() {
        let path = SwimConfig::default_path();
        assert!(path.ends_with("swim/config.toml"));
    }
}
