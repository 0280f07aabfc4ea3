//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, UserId, ValueObjectError};

/// Coarse category of a use-case failure, rendered as the ack `code`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    Unavailable,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
        }
    }
}

fn repository_kind(error: &RepositoryError) -> ErrorKind {
    match error {
        RepositoryError::ExpenseNotFound(_) | RepositoryError::MessageNotFound(_) => {
            ErrorKind::NotFound
        }
        RepositoryError::Unavailable(_) => ErrorKind::Unavailable,
    }
}

/// Payload names a user other than the one bound to the connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload user '{claimed}' does not match connection user '{bound}'")]
pub struct IdentityMismatch {
    pub claimed: UserId,
    pub bound: UserId,
}

impl IdentityMismatch {
    /// `Ok` when no user is claimed or the claim matches the bound user.
    pub fn check(claimed: Option<&UserId>, bound: &UserId) -> Result<(), Self> {
        match claimed {
            Some(claimed) if claimed != bound => Err(Self {
                claimed: claimed.clone(),
                bound: bound.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// メッセージ送信時のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),
    #[error(transparent)]
    IdentityMismatch(#[from] IdentityMismatch),
    #[error("failed to store message: {0}")]
    Repository(#[from] RepositoryError),
}

impl SendMessageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::IdentityMismatch(_) => ErrorKind::Authorization,
            Self::Repository(e) => repository_kind(e),
        }
    }
}

/// Typing 状態更新時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypingError {
    #[error(transparent)]
    IdentityMismatch(#[from] IdentityMismatch),
}

impl TypingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IdentityMismatch(_) => ErrorKind::Authorization,
        }
    }
}

/// 支出追加時のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddExpenseError {
    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),
    #[error("failed to store expense: {0}")]
    Repository(#[from] RepositoryError),
}

impl AddExpenseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::Repository(e) => repository_kind(e),
        }
    }
}

/// 支出削除時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteExpenseError {
    #[error("expense '{0}' not found")]
    NotFound(String),
    #[error("only the payer can delete expense '{expense_id}'")]
    NotPayer { expense_id: String, requester: UserId },
    #[error("failed to delete expense: {0}")]
    Repository(RepositoryError),
}

impl DeleteExpenseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotPayer { .. } => ErrorKind::Authorization,
            Self::Repository(e) => repository_kind(e),
        }
    }
}

impl From<RepositoryError> for DeleteExpenseError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ExpenseNotFound(id) => Self::NotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// 精算記録時のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettleDebtError {
    #[error(transparent)]
    InvalidInput(#[from] ValueObjectError),
    #[error("cannot settle a debt with oneself")]
    SameParty,
    #[error("only the payer or the payee can record a settlement")]
    NotParty,
    #[error("failed to store settlement: {0}")]
    Repository(#[from] RepositoryError),
}

impl SettleDebtError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::SameParty => ErrorKind::Validation,
            Self::NotParty => ErrorKind::Authorization,
            Self::Repository(e) => repository_kind(e),
        }
    }
}

/// 参照系ユースケースのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{0}")]
    NotFound(String),
    #[error("failed to read from storage: {0}")]
    Repository(RepositoryError),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repository(e) => repository_kind(e),
        }
    }
}

impl From<RepositoryError> for QueryError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::MessageNotFound(_) | RepositoryError::ExpenseNotFound(_) => {
                Self::NotFound(error.to_string())
            }
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_identity_check() {
        assert!(IdentityMismatch::check(None, &uid("alice")).is_ok());
        assert!(IdentityMismatch::check(Some(&uid("alice")), &uid("alice")).is_ok());
        assert_eq!(
            IdentityMismatch::check(Some(&uid("mallory")), &uid("alice")),
            Err(IdentityMismatch {
                claimed: uid("mallory"),
                bound: uid("alice"),
            })
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            SendMessageError::from(ValueObjectError::EmptyMessage).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            DeleteExpenseError::from(RepositoryError::ExpenseNotFound("e".to_string())),
            DeleteExpenseError::NotFound("e".to_string())
        );
        assert_eq!(
            AddExpenseError::from(RepositoryError::Unavailable("db".to_string())).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(SettleDebtError::NotParty.kind().code(), "authorization");
        assert_eq!(
            QueryError::from(RepositoryError::MessageNotFound("m".to_string())).kind(),
            ErrorKind::NotFound
        );
    }
}
