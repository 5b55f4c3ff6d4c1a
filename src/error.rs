//! Error types for the wellness checkup core.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejected session operations and malformed questionnaire definitions.
///
/// This is the only error kind that reaches callers of the assessment
/// state machine. The session is left unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Answer for question '{got}' rejected: current question is '{expected}'")]
    QuestionMismatch { expected: String, got: String },

    #[error("'{value}' is not an option of question '{question}'")]
    UnknownOption { question: String, value: String },

    #[error("Question '{question}' has no recorded answer")]
    Unanswered { question: String },

    #[error("Already at the first question")]
    AtFirstQuestion,

    #[error("Cannot {action} while session is {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Questionnaire has no questions")]
    EmptyQuestionnaire,

    #[error("Duplicate question id '{0}'")]
    DuplicateQuestion(String),

    #[error("Duplicate option value '{value}' in question '{question}'")]
    DuplicateOption { question: String, value: String },
}

/// Provider errors. Never surfaced past the analysis gateway.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    HttpStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("API key not configured for provider {provider}")]
    MissingApiKey { provider: String },
}

/// Unparseable or structurally invalid provider replies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("No JSON object found in provider reply")]
    NoJsonObject,

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Field '{field}' cannot be coerced: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ParseError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
