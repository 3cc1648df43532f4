//! Controller configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults; the engine has no config file.

use std::env;
use thiserror::Error;

/// Default mailbox capacity for each session actor.
pub const DEFAULT_SESSION_CHANNEL_BUFFER: usize = 64;

/// Default mailbox capacity for the registry actor.
pub const DEFAULT_REGISTRY_CHANNEL_BUFFER: usize = 256;

/// Default controller instance id.
pub const DEFAULT_INSTANCE_ID: &str = "rc-main";

/// Recruitment controller configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier for this controller instance, used for log correlation.
    pub instance_id: String,

    /// Mailbox capacity for each session actor.
    pub session_channel_buffer: usize,

    /// Mailbox capacity for the registry actor.
    pub registry_channel_buffer: usize,

    /// Fixed seed for the balancer's tie-break randomness. `None` seeds
    /// from entropy; setting it makes team splits reproducible.
    pub balance_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instance_id: DEFAULT_INSTANCE_ID.to_string(),
            session_channel_buffer: DEFAULT_SESSION_CHANNEL_BUFFER,
            registry_channel_buffer: DEFAULT_REGISTRY_CHANNEL_BUFFER,
            balance_seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `RC_INSTANCE_ID`, `RC_SESSION_CHANNEL_BUFFER`,
    /// `RC_REGISTRY_CHANNEL_BUFFER`, `RC_BALANCE_SEED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            instance_id: env::var("RC_INSTANCE_ID")
                .unwrap_or_else(|_| DEFAULT_INSTANCE_ID.to_string()),
            session_channel_buffer: parse_capacity(
                "RC_SESSION_CHANNEL_BUFFER",
                env::var("RC_SESSION_CHANNEL_BUFFER").ok(),
                DEFAULT_SESSION_CHANNEL_BUFFER,
            )?,
            registry_channel_buffer: parse_capacity(
                "RC_REGISTRY_CHANNEL_BUFFER",
                env::var("RC_REGISTRY_CHANNEL_BUFFER").ok(),
                DEFAULT_REGISTRY_CHANNEL_BUFFER,
            )?,
            balance_seed: parse_seed(env::var("RC_BALANCE_SEED").ok())?,
        })
    }
}

/// Parse a mailbox capacity; zero is invalid (a zero-capacity channel
/// cannot be constructed).
fn parse_capacity(
    name: &'static str,
    raw: Option<String>,
    default: usize,
) -> Result<usize, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.parse::<usize>() {
            Ok(parsed) if parsed > 0 => Ok(parsed),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
    }
}

fn parse_seed(raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: "RC_BALANCE_SEED",
                value,
            }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.instance_id, "rc-main");
        assert_eq!(config.session_channel_buffer, 64);
        assert_eq!(config.registry_channel_buffer, 256);
        assert!(config.balance_seed.is_none());
    }

    #[test]
    fn test_parse_capacity_accepts_positive() {
        assert_eq!(
            parse_capacity("X", Some("128".to_string()), 64).unwrap(),
            128
        );
        assert_eq!(parse_capacity("X", None, 64).unwrap(), 64);
    }

    #[test]
    fn test_parse_capacity_rejects_zero_and_junk() {
        assert!(parse_capacity("X", Some("0".to_string()), 64).is_err());
        assert!(parse_capacity("X", Some("lots".to_string()), 64).is_err());
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed(Some("42".to_string())).unwrap(), Some(42));
        assert_eq!(parse_seed(None).unwrap(), None);
        assert!(parse_seed(Some("abc".to_string())).is_err());
    }
}
