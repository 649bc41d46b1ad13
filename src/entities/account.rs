// 💳 Account Entity - one bank account owned by one user
//
// Identity: row id (server-assigned) and account number (derived, unique)
// Values: balance, status, registration/unregistration times
// Relationship: user_id → AccountUser (fixed at creation)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AccountError;

/// Account number handed out when the store holds no account yet.
pub const INITIAL_ACCOUNT_NUMBER: &str = "10000000000";

// ============================================================================
// ACCOUNT STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Open account, counts as live for its owner
    InUse,

    /// Soft-deleted account. Terminal.
    Unregistered,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::InUse => "IN_USE",
            AccountStatus::Unregistered => "UNREGISTERED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN_USE" => Some(AccountStatus::InUse),
            "UNREGISTERED" => Some(AccountStatus::Unregistered),
            _ => None,
        }
    }
}

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

/// Persisted account row.
///
/// Only `unregister` mutates an account after creation; owner and account
/// number never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub account_number: String,
    pub status: AccountStatus,
    pub balance: i64,
    pub registered_at: DateTime<Utc>,
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Attach a store-assigned id to a new account.
    pub fn from_new(id: i64, new: NewAccount) -> Self {
        Account {
            id,
            user_id: new.user_id,
            account_number: new.account_number,
            status: new.status,
            balance: new.balance,
            registered_at: new.registered_at,
            unregistered_at: None,
        }
    }

    pub fn is_unregistered(&self) -> bool {
        self.status == AccountStatus::Unregistered
    }

    /// IN_USE → UNREGISTERED, stamping the unregistration time.
    pub fn unregister(&mut self, at: DateTime<Utc>) {
        self.status = AccountStatus::Unregistered;
        self.unregistered_at = Some(at);
    }

    pub fn to_view(&self) -> AccountView {
        AccountView::from(self)
    }
}

/// Account that has not been given an id by the store yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub user_id: i64,
    pub account_number: String,
    pub status: AccountStatus,
    pub balance: i64,
    pub registered_at: DateTime<Utc>,
}

impl NewAccount {
    pub fn in_use(
        user_id: i64,
        account_number: String,
        balance: i64,
        registered_at: DateTime<Utc>,
    ) -> Self {
        NewAccount {
            user_id,
            account_number,
            status: AccountStatus::InUse,
            balance,
            registered_at,
        }
    }
}

// ============================================================================
// ACCOUNT NUMBERS
// ============================================================================

/// Next account number after `latest` (the account with the highest id).
///
/// Numbers are global across all users: "10000000000", "10000000001", ...
pub fn next_account_number(latest: Option<&Account>) -> Result<String, AccountError> {
    match latest {
        None => Ok(INITIAL_ACCOUNT_NUMBER.to_string()),
        Some(account) => {
            let current: u64 = account
                .account_number
                .parse()
                .map_err(|_| AccountError::MalformedAccountNumber(account.account_number.clone()))?;
            let next = current
                .checked_add(1)
                .ok_or_else(|| AccountError::MalformedAccountNumber(account.account_number.clone()))?;
            Ok(next.to_string())
        }
    }
}

// ============================================================================
// ACCOUNT VIEW
// ============================================================================

/// Flattened projection returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: i64,
    pub account_number: String,
    pub user_id: i64,
    pub balance: i64,
    pub registered_at: Option<DateTime<Utc>>,
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        AccountView {
            id: account.id,
            account_number: account.account_number.clone(),
            user_id: account.user_id,
            balance: account.balance,
            registered_at: Some(account.registered_at),
            unregistered_at: account.unregistered_at,
        }
    }
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        AccountView {
            id: account.id,
            account_number: account.account_number,
            user_id: account.user_id,
            balance: account.balance,
            registered_at: Some(account.registered_at),
            unregistered_at: account.unregistered_at,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
