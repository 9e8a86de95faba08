//! Error types for the intent router.

use std::time::Duration;

use crate::llm::Role;
use crate::routing::HandlerId;

/// Errors that stop the binary. Failed turns are reported to the user and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider {provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    #[error("Provider {provider} returned an empty response")]
    EmptyResponse { provider: String },
}

/// Failures of a single classify → route → respond turn.
///
/// Every variant aborts the turn. The conversation state is left exactly as it
/// was before the turn started.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Cannot classify an empty conversation")]
    EmptyHistory,

    /// The latest message is not from the user, so there is no turn to run.
    #[error("No pending user message: the latest message is from the {last_role}")]
    NoPendingUserMessage { last_role: Role },

    #[error("Classifier returned a label outside the category set: '{label}'")]
    ClassificationContractViolation { label: String },

    #[error("Classification call failed: {source}")]
    ClassificationFailed {
        #[source]
        source: LlmError,
    },

    #[error("Handler {handler} failed to generate a reply: {source}")]
    GenerationFailure {
        handler: HandlerId,
        #[source]
        source: LlmError,
    },

    /// Only reachable through [`crate::routing::route_label`]; typed categories
    /// always route.
    #[error("No handler for category '{label}'")]
    UnroutableCategory { label: String },
}

impl TurnError {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyHistory => "empty_history",
            Self::NoPendingUserMessage { .. } => "no_pending_user_message",
            Self::ClassificationContractViolation { .. } => "classification_contract_violation",
            Self::ClassificationFailed { .. } => "classification_failed",
            Self::GenerationFailure { .. } => "generation_failure",
            Self::UnroutableCategory { .. } => "unroutable_category",
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_error_kinds_are_distinct() {
        let errors = [
            TurnError::EmptyHistory,
            TurnError::NoPendingUserMessage {
                last_role: Role::Assistant,
            },
            TurnError::ClassificationContractViolation {
                label: "angry".into(),
            },
            TurnError::ClassificationFailed {
                source: LlmError::EmptyResponse {
                    provider: "mock".into(),
                },
            },
            TurnError::GenerationFailure {
                handler: HandlerId::Logical,
                source: LlmError::EmptyResponse {
                    provider: "mock".into(),
                },
            },
            TurnError::UnroutableCategory {
                label: "angry".into(),
            },
        ];
        let mut kinds: Vec<_> = errors.iter().map(TurnError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn generation_failure_keeps_cause() {
        let err = TurnError::GenerationFailure {
            handler: HandlerId::Emotional,
            source: LlmError::Timeout {
                provider: "anthropic".into(),
                after: Duration::from_secs(5),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("emotional_agent"));
        assert!(msg.contains("timed out"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn startup_errors_convert_to_top_level() {
        let err: Error = ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".into()).into();
        assert!(matches!(err, Error::Config(ConfigError::MissingEnvVar(_))));
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let err: Error = LlmError::AuthFailed {
            provider: "openai".into(),
        }
        .into();
        assert!(matches!(err, Error::Llm(LlmError::AuthFailed { .. })));

        let err: Error = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert!(matches!(err, Error::Io(_)));
    }
}
