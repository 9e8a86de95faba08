//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;
use crate::routing::Category;

/// Turn pipeline configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Sampling temperature for the classification call.
    pub classify_temperature: f32,
    /// Token cap for the classification call (the reply is a single label).
    pub classify_max_tokens: u32,
    /// Sampling temperature for handler replies.
    pub generate_temperature: f32,
    /// Token cap for handler replies.
    pub generate_max_tokens: u32,
    /// Deadline for the classification call.
    pub classify_timeout: Duration,
    /// Deadline for the handler's generation call.
    pub generate_timeout: Duration,
    /// Category assumed when routing without a classification.
    pub default_category: Category,
    /// Input that ends an interactive session.
    pub exit_command: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            classify_temperature: 0.0,
            classify_max_tokens: 64,
            generate_temperature: 0.7,
            generate_max_tokens: 1024,
            classify_timeout: Duration::from_secs(30),
            generate_timeout: Duration::from_secs(120),
            default_category: Category::Logical,
            exit_command: "exit".to_string(),
        }
    }
}

impl RouterConfig {
    /// Build from `INTENT_ROUTER_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            classify_temperature: env_parse(
                "INTENT_ROUTER_CLASSIFY_TEMPERATURE",
                defaults.classify_temperature,
            )?,
            classify_max_tokens: env_parse(
                "INTENT_ROUTER_CLASSIFY_MAX_TOKENS",
                defaults.classify_max_tokens,
            )?,
            generate_temperature: env_parse(
                "INTENT_ROUTER_GENERATE_TEMPERATURE",
                defaults.generate_temperature,
            )?,
            generate_max_tokens: env_parse(
                "INTENT_ROUTER_GENERATE_MAX_TOKENS",
                defaults.generate_max_tokens,
            )?,
            classify_timeout: Duration::from_secs(env_parse(
                "INTENT_ROUTER_CLASSIFY_TIMEOUT_SECS",
                defaults.classify_timeout.as_secs(),
            )?),
            generate_timeout: Duration::from_secs(env_parse(
                "INTENT_ROUTER_GENERATE_TIMEOUT_SECS",
                defaults.generate_timeout.as_secs(),
            )?),
            default_category: match std::env::var("INTENT_ROUTER_DEFAULT_CATEGORY") {
                Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "INTENT_ROUTER_DEFAULT_CATEGORY".to_string(),
                    message: format!("'{value}' is not emotional or logical"),
                })?,
                Err(_) => defaults.default_category,
            },
            exit_command: std::env::var("INTENT_ROUTER_EXIT_COMMAND")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.exit_command),
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}': {e}"),
    })
}
