// Entity Models

pub mod account;
pub mod account_user;

pub use account::{
    next_account_number, Account, AccountStatus, AccountView, NewAccount, INITIAL_ACCOUNT_NUMBER,
};
pub use account_user::AccountUser;
