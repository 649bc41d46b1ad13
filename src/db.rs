use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::entities::{Account, AccountStatus, AccountUser, NewAccount};
use crate::error::AccountError;
use crate::repository::{AccountRepository, AccountUserRepository, Repositories, Result, UnitOfWork};

const ACCOUNT_COLUMNS: &str =
    "id, account_user_id, account_number, account_status, balance, registered_at, unregistered_at";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Account Users Table (owned by user management, seeded by imports)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS account_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Accounts Table (rows are never deleted, only unregistered)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_user_id INTEGER NOT NULL REFERENCES account_users(id),
            account_number TEXT UNIQUE NOT NULL,
            account_status TEXT NOT NULL,
            balance INTEGER NOT NULL CHECK (balance >= 0),
            registered_at TEXT NOT NULL,
            unregistered_at TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_accounts_user ON accounts(account_user_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_accounts_number ON accounts(account_number)",
        [],
    )?;

    Ok(())
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
    let status_str: String = row.get(3)?;
    let status = AccountStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown account status {status_str}").into(),
        )
    })?;

    let registered_at_str: String = row.get(5)?;
    let unregistered_at_str: Option<String> = row.get(6)?;

    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_number: row.get(2)?,
        status,
        balance: row.get(4)?,
        registered_at: parse_timestamp(5, &registered_at_str)?,
        unregistered_at: unregistered_at_str
            .map(|s| parse_timestamp(6, &s))
            .transpose()?,
    })
}

// ============================================================================
// REPOSITORIES (one SQLite transaction)
// ============================================================================

/// Repository view over the connection of an open transaction.
pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AccountUserRepository for SqliteRepositories<'_> {
    fn find_user_by_id(&self, id: i64) -> Result<Option<AccountUser>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name FROM account_users WHERE id = ?1",
                params![id],
                |row| Ok(AccountUser::new(row.get(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        Ok(user)
    }

    fn insert_user(&mut self, name: &str) -> Result<AccountUser> {
        self.conn
            .execute("INSERT INTO account_users (name) VALUES (?1)", params![name])?;

        Ok(AccountUser::new(self.conn.last_insert_rowid(), name))
    }
}

impl AccountRepository for SqliteRepositories<'_> {
    fn find_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        let account = self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                params![id],
                row_to_account,
            )
            .optional()?;

        Ok(account)
    }

    fn find_account_by_number(&self, account_number: &str) -> Result<Option<Account>> {
        let account = self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = ?1"),
                params![account_number],
                row_to_account,
            )
            .optional()?;

        Ok(account)
    }

    fn find_latest_account(&self) -> Result<Option<Account>> {
        let account = self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id DESC LIMIT 1"),
                [],
                row_to_account,
            )
            .optional()?;

        Ok(account)
    }

    fn count_accounts_by_user(&self, user_id: i64) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE account_user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    fn find_accounts_by_user(&self, user_id: i64) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_user_id = ?1 ORDER BY id"
        ))?;

        let accounts = stmt
            .query_map(params![user_id], row_to_account)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(accounts)
    }

    fn insert_account(&mut self, account: NewAccount) -> Result<Account> {
        let result = self.conn.execute(
            "INSERT INTO accounts (
                account_user_id, account_number, account_status, balance, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.user_id,
                account.account_number,
                account.status.as_str(),
                account.balance,
                account.registered_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(Account::from_new(self.conn.last_insert_rowid(), account)),
            Err(rusqlite::Error::SqliteFailure(err, msg))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AccountError::Storage(format!(
                    "account {} rejected by constraint: {}",
                    account.account_number,
                    msg.unwrap_or_default()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_account(&mut self, account: &Account) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE accounts
             SET account_status = ?1,
                 balance = ?2,
                 unregistered_at = ?3
             WHERE id = ?4",
            params![
                account.status.as_str(),
                account.balance,
                account.unregistered_at.map(|dt| dt.to_rfc3339()),
                account.id,
            ],
        )?;

        if updated == 0 {
            return Err(AccountError::AccountNotFound);
        }

        Ok(())
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Persistent store: one SQLite transaction per unit of work.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened account database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the schema if needed.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl UnitOfWork for SqliteStore {
    fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Repositories) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| AccountError::Storage("database connection lock poisoned".to_string()))?;

        let tx = conn.transaction()?;
        let mut repos = SqliteRepositories::new(&tx);

        match work(&mut repos) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                debug!(error = %e, "rolling back unit of work");
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(user_id: i64, number: &str, balance: i64) -> NewAccount {
        NewAccount::in_use(user_id, number.to_string(), balance, Utc::now())
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('account_users', 'accounts')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_account_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let inserted = store
            .run(|repos| {
                let user = repos.insert_user("Harry")?;
                repos.insert_account(new_account(user.id, "10000000000", 1000))
            })
            .unwrap();

        let loaded = store
            .run(|repos| repos.find_account_by_id(inserted.id))
            .unwrap()
            .expect("account should exist");

        assert_eq!(loaded, inserted);
        assert_eq!(loaded.status, AccountStatus::InUse);
        assert!(loaded.unregistered_at.is_none());
    }

    #[test]
    fn test_queries_by_user_and_number() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .run(|repos| {
                let a = repos.insert_user("A")?;
                let b = repos.insert_user("B")?;
                repos.insert_account(new_account(a.id, "10000000000", 10))?;
                repos.insert_account(new_account(b.id, "10000000001", 20))?;
                repos.insert_account(new_account(a.id, "10000000002", 30))?;

                assert_eq!(repos.count_accounts_by_user(a.id)?, 2);
                assert_eq!(repos.count_accounts_by_user(b.id)?, 1);
                assert_eq!(repos.count_accounts_by_user(99)?, 0);

                let numbers: Vec<String> = repos
                    .find_accounts_by_user(a.id)?
                    .into_iter()
                    .map(|acc| acc.account_number)
                    .collect();
                assert_eq!(numbers, vec!["10000000000", "10000000002"]);

                let latest = repos.find_latest_account()?.unwrap();
                assert_eq!(latest.account_number, "10000000002");

                let by_number = repos.find_account_by_number("10000000001")?.unwrap();
                assert_eq!(by_number.user_id, b.id);
                assert!(repos.find_account_by_number("42")?.is_none());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_empty_store_has_no_latest_account() {
        let store = SqliteStore::open_in_memory().unwrap();
        let latest = store.run(|repos| repos.find_latest_account()).unwrap();
        assert!(latest.is_none());
    }

    #[test]
    fn test_duplicate_account_number_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();

        let result = store.run(|repos| {
            let user = repos.insert_user("Ron")?;
            repos.insert_account(new_account(user.id, "10000000000", 0))?;
            repos.insert_account(new_account(user.id, "10000000000", 0))
        });

        assert!(matches!(result, Err(AccountError::Storage(_))));
    }

    #[test]
    fn test_failed_unit_of_work_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();

        let result: Result<()> = store.run(|repos| {
            let user = repos.insert_user("Hermione")?;
            repos.insert_account(new_account(user.id, "10000000000", 0))?;
            Err(AccountError::MaxAccountsPerUserExceeded)
        });
        assert!(matches!(result, Err(AccountError::MaxAccountsPerUserExceeded)));

        store
            .run(|repos| {
                assert!(repos.find_user_by_id(1)?.is_none());
                assert!(repos.find_latest_account()?.is_none());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_update_account_persists_unregistration() {
        let store = SqliteStore::open_in_memory().unwrap();

        let mut account = store
            .run(|repos| {
                let user = repos.insert_user("Neville")?;
                repos.insert_account(new_account(user.id, "10000000000", 0))
            })
            .unwrap();

        account.unregister(Utc::now());
        store.run(|repos| repos.update_account(&account)).unwrap();

        let stored = store
            .run(|repos| repos.find_account_by_number("10000000000"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AccountStatus::Unregistered);
        assert_eq!(stored.unregistered_at, account.unregistered_at);
    }

    #[test]
    fn test_update_missing_account() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ghost = Account::from_new(77, new_account(1, "10000000000", 0));

        let result = store.run(|repos| repos.update_account(&ghost));
        assert!(matches!(result, Err(AccountError::AccountNotFound)));
    }

    #[test]
    fn test_unknown_status_is_a_database_error() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .run(|repos| {
                let user = repos.insert_user("Luna")?;
                repos.insert_account(new_account(user.id, "10000000000", 0))
            })
            .unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute("UPDATE accounts SET account_status = 'FROZEN'", [])
                .unwrap();
        }

        let result = store.run(|repos| repos.find_account_by_id(1));
        assert!(matches!(result, Err(AccountError::Database(_))));
    }
}
