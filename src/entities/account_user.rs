// 👤 AccountUser Entity - a person who may own accounts
//
// Users are managed outside this service; here they are read-only except for
// the seeding insert used by imports and tests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    /// Server-assigned identifier
    pub id: i64,

    /// Display name
    pub name: String,
}

impl AccountUser {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        AccountUser {
            id,
            name: name.into(),
        }
    }

    /// Whether this user owns the account with the given owner id.
    pub fn owns(&self, account_user_id: i64) -> bool {
        self.id == account_user_id
    }
}
