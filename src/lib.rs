// Account Service - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod error;
pub mod import;
pub mod logging;
pub mod memory;
pub mod repository;
pub mod service;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{setup_database, SqliteStore};
pub use entities::{
    next_account_number, Account, AccountStatus, AccountUser, AccountView, NewAccount,
    INITIAL_ACCOUNT_NUMBER,
};
pub use error::{AccountError, MAX_ACCOUNTS_PER_USER};
pub use memory::MemoryStore;
pub use repository::{AccountRepository, AccountUserRepository, Repositories, UnitOfWork};
pub use service::{ensure_unregistrable, AccountService};
