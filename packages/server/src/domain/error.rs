//! Domain-level errors.

use thiserror::Error;

/// Validation failure while building a value object from client input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyId(&'static str),
    #[error("{0} must be at most {1} characters")]
    IdTooLong(&'static str, usize),
    #[error("message content must not be empty")]
    EmptyMessage,
    #[error("message content must be at most {0} characters")]
    MessageTooLong(usize),
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("description must be at most {0} characters")]
    DescriptionTooLong(usize),
    #[error("amount must be a positive number, got {0}")]
    NonPositiveAmount(f64),
    #[error("expense must be split between at least one participant")]
    EmptyParticipants,
    #[error("unknown expense category '{0}'")]
    UnknownCategory(String),
}

/// Persistence collaborator failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("expense '{0}' not found")]
    ExpenseNotFound(String),
    #[error("message '{0}' not found")]
    MessageNotFound(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure to deliver a frame to a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// User directory lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("user '{0}' not found")]
    UserNotFound(String),
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}
