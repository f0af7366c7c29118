//! Configuration loading and validation for the readiness check

use common::{Error, LogFormat, Result};
use readiness::{Endpoint, PollPolicy, ProbeSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "READINESS_CHECK_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Declared readiness probe; an absent probe fails the check
    #[serde(default)]
    pub probe: Option<ProbeSpec>,

    pub endpoint: EndpointSettings,

    #[serde(default)]
    pub policy: PolicySettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> std::result::Result<(), validator::ValidationErrors> {
        self.endpoint.validate()?;
        self.policy.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Endpoint to check
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EndpointSettings {
    #[validate(length(min = 1))]
    pub fqdn: String,

    #[validate(range(min = 1, max = 65535))]
    pub port: i32,
}

/// Polling policy settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PolicySettings {
    #[validate(range(min = 1, max = 3600))]
    pub max_attempts: u32,

    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_interval")]
    pub interval: Duration,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    #[validate(custom = "validate_level")]
    pub level: String,

    pub format: LogFormat,
}

impl Default for PolicySettings {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            interval: policy.interval,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

fn validate_interval(interval: &Duration) -> std::result::Result<(), ValidationError> {
    let millis = interval.as_millis();
    if millis < 10 || millis > 60_000 {
        return Err(ValidationError::new("interval_out_of_range"));
    }
    Ok(())
}

fn validate_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("unknown_log_level")),
    }
}

impl Config {
    /// Load configuration from `path`, `$READINESS_CHECK_CONFIG` or the
    /// default search paths, in that order.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(Self::find_config_file)
            .ok_or_else(|| Error::config("no configuration file found"))?;
        Self::load_from_file(path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate().map_err(Error::config)?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        [
            PathBuf::from("/etc/readiness/readiness-check.yaml"),
            PathBuf::from("./readiness-check.yaml"),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    /// Endpoint to check
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.endpoint.fqdn.clone(), self.endpoint.port)
    }

    /// Polling policy
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.policy.max_attempts,
            interval: self.policy.interval,
        }
    }
}
