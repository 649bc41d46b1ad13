// 📦 DTOs - request and response bodies for the HTTP server and CLI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::AccountView;
use crate::error::AccountError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: i64,
    pub initial_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    pub user_id: i64,
    pub account_number: String,
    pub registered_at: Option<DateTime<Utc>>,
}

impl From<AccountView> for CreateAccountResponse {
    fn from(view: AccountView) -> Self {
        Self {
            user_id: view.user_id,
            account_number: view.account_number,
            registered_at: view.registered_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAccountRequest {
    pub user_id: i64,
    pub account_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    pub user_id: i64,
    pub account_number: String,
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl From<AccountView> for DeleteAccountResponse {
    fn from(view: AccountView) -> Self {
        Self {
            user_id: view.user_id,
            account_number: view.account_number,
            unregistered_at: view.unregistered_at,
        }
    }
}

/// One entry of a user's account list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_number: String,
    pub balance: i64,
}

impl From<AccountView> for AccountInfo {
    fn from(view: AccountView) -> Self {
        Self {
            account_number: view.account_number,
            balance: view.balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub error_message: String,
}

impl From<&AccountError> for ErrorResponse {
    fn from(err: &AccountError) -> Self {
        // Storage details stay in the logs.
        let error_message = if err.is_business_rule() {
            err.to_string()
        } else {
            "internal server error".to_string()
        };

        Self {
            error_code: err.code().to_string(),
            error_message,
        }
    }
}
