// 🗄️ Repositories - storage seams for users and accounts
//
// Repositories are reached only through a UnitOfWork: every read and write of
// one service operation runs inside a single `run` call and is committed or
// rolled back as a whole. Implemented by MemoryStore and SqliteStore.

use crate::entities::{Account, AccountUser, NewAccount};
use crate::error::AccountError;

pub type Result<T> = std::result::Result<T, AccountError>;

pub trait AccountUserRepository {
    fn find_user_by_id(&self, id: i64) -> Result<Option<AccountUser>>;

    /// Seeding insert; user management itself lives outside the service.
    fn insert_user(&mut self, name: &str) -> Result<AccountUser>;
}

pub trait AccountRepository {
    fn find_account_by_id(&self, id: i64) -> Result<Option<Account>>;

    fn find_account_by_number(&self, account_number: &str) -> Result<Option<Account>>;

    /// The account with the highest id, if any.
    fn find_latest_account(&self) -> Result<Option<Account>>;

    /// Counts every account row of the user, whatever its status.
    fn count_accounts_by_user(&self, user_id: i64) -> Result<i64>;

    /// All accounts of the user in storage order (ascending id).
    fn find_accounts_by_user(&self, user_id: i64) -> Result<Vec<Account>>;

    /// Insert a new row and return it with its assigned id.
    fn insert_account(&mut self, account: NewAccount) -> Result<Account>;

    /// Persist status, balance and timestamps of an existing row.
    fn update_account(&mut self, account: &Account) -> Result<()>;
}

/// Both repositories, as seen from inside one unit of work.
pub trait Repositories: AccountUserRepository + AccountRepository {}

impl<T: AccountUserRepository + AccountRepository> Repositories for T {}

pub trait UnitOfWork {
    /// Run `work` atomically. `Ok` commits every write made through the
    /// repositories; `Err` discards all of them.
    fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T>;
}

impl<U: UnitOfWork> UnitOfWork for &U {
    fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T>,
    {
        (**self).run(work)
    }
}

impl<U: UnitOfWork> UnitOfWork for std::sync::Arc<U> {
    fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T>,
    {
        (**self).run(work)
    }
}
