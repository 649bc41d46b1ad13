// ⚠️ Account Errors - business-rule failures and storage failures
//
// Business-rule failures are non-retriable: only a different input fixes them.
// Storage failures stay separate so a rejected request can be told apart from
// a broken store.

use thiserror::Error;

/// Maximum number of account rows a single user may own.
pub const MAX_ACCOUNTS_PER_USER: i64 = 10;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("user not found")]
    UserNotFound,

    #[error("a user may hold at most 10 accounts")]
    MaxAccountsPerUserExceeded,

    #[error("account not found")]
    AccountNotFound,

    #[error("account does not belong to the user")]
    UserAccountMismatch,

    #[error("account is already unregistered")]
    AccountAlreadyUnregistered,

    #[error("account balance is not empty")]
    BalanceNotEmpty,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("stored account number is not numeric: {0}")]
    MalformedAccountNumber(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

impl AccountError {
    /// Stable machine-readable code, used in error bodies and CLI exit output.
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::UserNotFound => "USER_NOT_FOUND",
            AccountError::MaxAccountsPerUserExceeded => "MAX_ACCOUNT_PER_USER_10",
            AccountError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AccountError::UserAccountMismatch => "USER_ACCOUNT_UN_MATCH",
            AccountError::AccountAlreadyUnregistered => "ACCOUNT_ALREADY_UNREGISTERED",
            AccountError::BalanceNotEmpty => "BALANCE_NOT_EMPTY",
            AccountError::InvalidArgument(_) => "INVALID_REQUEST",
            AccountError::MalformedAccountNumber(_)
            | AccountError::Database(_)
            | AccountError::Storage(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// True for the failures caused by the request rather than the store.
    pub fn is_business_rule(&self) -> bool {
        !matches!(
            self,
            AccountError::MalformedAccountNumber(_)
                | AccountError::Database(_)
                | AccountError::Storage(_)
        )
    }

    /// True for the lookup failures (`UserNotFound`, `AccountNotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccountError::UserNotFound | AccountError::AccountNotFound)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AccountError::UserNotFound.code(), "USER_NOT_FOUND");
        assert_eq!(
            AccountError::MaxAccountsPerUserExceeded.code(),
            "MAX_ACCOUNT_PER_USER_10"
        );
        assert_eq!(AccountError::UserAccountMismatch.code(), "USER_ACCOUNT_UN_MATCH");
        assert_eq!(
            AccountError::InvalidArgument("negative id".to_string()).code(),
            "INVALID_REQUEST"
        );
        assert_eq!(
            AccountError::Storage("lock poisoned".to_string()).code(),
            "INTERNAL_SERVER_ERROR"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(AccountError::BalanceNotEmpty.is_business_rule());
        assert!(AccountError::InvalidArgument("x".to_string()).is_business_rule());
        assert!(!AccountError::Storage("x".to_string()).is_business_rule());
        assert!(!AccountError::MalformedAccountNumber("abc".to_string()).is_business_rule());

        assert!(AccountError::AccountNotFound.is_not_found());
        assert!(AccountError::UserNotFound.is_not_found());
        assert!(!AccountError::UserAccountMismatch.is_not_found());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AccountError::MaxAccountsPerUserExceeded.to_string(),
            "a user may hold at most 10 accounts"
        );
        assert_eq!(
            AccountError::InvalidArgument("account id must not be negative".to_string())
                .to_string(),
            "invalid argument: account id must not be negative"
        );
    }
}
