// 🧠 In-memory store - account users and accounts held in process
//
// Each unit of work runs against a private copy of the state and swaps it in
// only when the work succeeds, so a failed operation leaves nothing behind.
// Units of work are serialized by the mutex.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::entities::{Account, AccountUser, NewAccount};
use crate::error::AccountError;
use crate::repository::{AccountRepository, AccountUserRepository, Repositories, Result, UnitOfWork};

// ============================================================================
// STATE
// ============================================================================

/// Committed contents of the store. Ordered maps keep storage order = id order.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    users: BTreeMap<i64, AccountUser>,
    accounts: BTreeMap<i64, Account>,
    last_user_id: i64,
    last_account_id: i64,
}

impl AccountUserRepository for MemoryState {
    fn find_user_by_id(&self, id: i64) -> Result<Option<AccountUser>> {
        Ok(self.users.get(&id).cloned())
    }

    fn insert_user(&mut self, name: &str) -> Result<AccountUser> {
        self.last_user_id += 1;
        let user = AccountUser::new(self.last_user_id, name);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

impl AccountRepository for MemoryState {
    fn find_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).cloned())
    }

    fn find_account_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .values()
            .find(|acc| acc.account_number == account_number)
            .cloned())
    }

    fn find_latest_account(&self) -> Result<Option<Account>> {
        Ok(self.accounts.values().next_back().cloned())
    }

    fn count_accounts_by_user(&self, user_id: i64) -> Result<i64> {
        Ok(self
            .accounts
            .values()
            .filter(|acc| acc.user_id == user_id)
            .count() as i64)
    }

    fn find_accounts_by_user(&self, user_id: i64) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .values()
            .filter(|acc| acc.user_id == user_id)
            .cloned()
            .collect())
    }

    fn insert_account(&mut self, account: NewAccount) -> Result<Account> {
        if !self.users.contains_key(&account.user_id) {
            return Err(AccountError::Storage(format!(
                "account user {} does not exist",
                account.user_id
            )));
        }
        if self
            .accounts
            .values()
            .any(|acc| acc.account_number == account.account_number)
        {
            return Err(AccountError::Storage(format!(
                "duplicate account number {}",
                account.account_number
            )));
        }

        self.last_account_id += 1;
        let account = Account::from_new(self.last_account_id, account);
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    fn update_account(&mut self, account: &Account) -> Result<()> {
        match self.accounts.get_mut(&account.id) {
            Some(stored) => {
                stored.status = account.status;
                stored.balance = account.balance;
                stored.unregistered_at = account.unregistered_at;
                Ok(())
            }
            None => Err(AccountError::AccountNotFound),
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> Result<MemoryState> {
        let state = self
            .state
            .lock()
            .map_err(|_| AccountError::Storage("memory store lock poisoned".to_string()))?;
        Ok(state.clone())
    }
}

impl UnitOfWork for MemoryStore {
    fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T>,
    {
        let mut committed = self
            .state
            .lock()
            .map_err(|_| AccountError::Storage("memory store lock poisoned".to_string()))?;

        let mut working = committed.clone();
        match work(&mut working) {
            Ok(value) => {
                *committed = working;
                Ok(value)
            }
            Err(e) => {
                debug!(error = %e, "unit of work rolled back");
                Err(e)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
