// 🏦 Account Service - business rules around account creation and unregistration
//
// Every public operation is one unit of work: loads, validation and writes are
// committed together or not at all.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::entities::{next_account_number, Account, AccountUser, AccountView, NewAccount};
use crate::error::{AccountError, MAX_ACCOUNTS_PER_USER};
use crate::repository::{Repositories, Result, UnitOfWork};

pub struct AccountService<S> {
    store: S,
}

impl<S: UnitOfWork> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new IN_USE account for `user_id` with the next global account number.
    #[instrument(skip(self))]
    pub fn create_account(&self, user_id: i64, initial_balance: i64) -> Result<AccountView> {
        if initial_balance < 0 {
            return Err(AccountError::InvalidArgument(format!(
                "initial balance must not be negative: {initial_balance}"
            )));
        }

        self.store.run(|repos| {
            let user = load_user(repos, user_id)?;

            let owned = repos.count_accounts_by_user(user.id)?;
            if owned >= MAX_ACCOUNTS_PER_USER {
                warn!(user_id, owned, "account limit reached");
                return Err(AccountError::MaxAccountsPerUserExceeded);
            }

            let latest = repos.find_latest_account()?;
            let account_number = next_account_number(latest.as_ref())?;

            let account = repos.insert_account(NewAccount::in_use(
                user.id,
                account_number,
                initial_balance,
                Utc::now(),
            ))?;

            info!(
                account_id = account.id,
                account_number = %account.account_number,
                "account registered"
            );
            Ok(account.to_view())
        })
    }

    /// Full account record by row id.
    #[instrument(skip(self))]
    pub fn get_account(&self, id: i64) -> Result<Account> {
        if id < 0 {
            return Err(AccountError::InvalidArgument(format!(
                "account id must not be negative: {id}"
            )));
        }

        self.store.run(|repos| {
            repos
                .find_account_by_id(id)?
                .ok_or(AccountError::AccountNotFound)
        })
    }

    /// Every account of the user, whatever its status, in storage order.
    #[instrument(skip(self))]
    pub fn get_accounts_by_user_id(&self, user_id: i64) -> Result<Vec<AccountView>> {
        self.store.run(|repos| {
            let user = load_user(repos, user_id)?;
            let accounts = repos.find_accounts_by_user(user.id)?;

            debug!(count = accounts.len(), "loaded accounts");
            Ok(accounts.into_iter().map(AccountView::from).collect())
        })
    }

    /// Soft-delete: mark the account UNREGISTERED. The row is kept.
    #[instrument(skip(self))]
    pub fn delete_account(&self, user_id: i64, account_number: &str) -> Result<AccountView> {
        self.store.run(|repos| {
            let (user, mut account) = load_user_and_account(repos, user_id, account_number)?;
            ensure_unregistrable(&user, &account)?;

            account.unregister(Utc::now());
            repos.update_account(&account)?;

            info!(account_id = account.id, "account unregistered");
            Ok(account.to_view())
        })
    }

    /// The preconditions of `delete_account`, checked without writing anything.
    #[instrument(skip(self))]
    pub fn validate_delete_account(&self, user_id: i64, account_number: &str) -> Result<()> {
        self.store.run(|repos| {
            let (user, account) = load_user_and_account(repos, user_id, account_number)?;
            ensure_unregistrable(&user, &account)
        })
    }
}

/// Owner match, not yet unregistered, empty balance; checked in that order.
pub fn ensure_unregistrable(user: &AccountUser, account: &Account) -> Result<()> {
    if !user.owns(account.user_id) {
        warn!(user_id = user.id, owner = account.user_id, "account owner mismatch");
        return Err(AccountError::UserAccountMismatch);
    }

    if account.is_unregistered() {
        return Err(AccountError::AccountAlreadyUnregistered);
    }

    if account.balance != 0 {
        warn!(balance = account.balance, "refusing to unregister funded account");
        return Err(AccountError::BalanceNotEmpty);
    }

    Ok(())
}

fn load_user(repos: &dyn Repositories, user_id: i64) -> Result<AccountUser> {
    repos
        .find_user_by_id(user_id)?
        .ok_or(AccountError::UserNotFound)
}

fn load_user_and_account(
    repos: &dyn Repositories,
    user_id: i64,
    account_number: &str,
) -> Result<(AccountUser, Account)> {
    let user = load_user(repos, user_id)?;
    let account = repos
        .find_account_by_number(account_number)?
        .ok_or(AccountError::AccountNotFound)?;

    Ok((user, account))
}

// ============================================================================
// TESTS
// ============================================================================
