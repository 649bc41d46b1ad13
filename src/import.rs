// 📥 User Import - seed account users from a CSV file
//
// Expected header: `name`. Users are inserted in one unit of work, so a bad
// row aborts the whole import.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::entities::AccountUser;
use crate::repository::UnitOfWork;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    pub name: String,
}

pub fn read_users<R: Read>(reader: R) -> Result<Vec<UserRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut users = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: UserRecord =
            result.with_context(|| format!("Failed to deserialize user on row {}", line + 1))?;

        let name = record.name.trim();
        if name.is_empty() {
            anyhow::bail!("Empty user name on row {}", line + 1);
        }

        users.push(UserRecord {
            name: name.to_string(),
        });
    }

    Ok(users)
}

pub fn load_users_csv(csv_path: &Path) -> Result<Vec<UserRecord>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_users(file)
}

pub fn import_users<S: UnitOfWork>(store: &S, users: &[UserRecord]) -> Result<Vec<AccountUser>> {
    let inserted = store
        .run(|repos| {
            users
                .iter()
                .map(|user| repos.insert_user(&user.name))
                .collect::<crate::repository::Result<Vec<_>>>()
        })
        .context("Failed to import account users")?;

    info!(count = inserted.len(), "imported account users");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn test_read_users() {
        let data = "name\nPororo\n  Crong \nLoopy\n";
        let users = read_users(data.as_bytes()).unwrap();

        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Pororo", "Crong", "Loopy"]);
    }

    #[test]
    fn test_read_users_rejects_blank_name() {
        let data = "name\nPororo\n\"  \"\n";
        let err = read_users(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_import_users_assigns_ids() {
        let store = MemoryStore::new();
        let users = read_users("name\nA\nB\n".as_bytes()).unwrap();

        let imported = import_users(&store, &users).unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0], AccountUser::new(1, "A"));
        assert_eq!(imported[1], AccountUser::new(2, "B"));
    }

    #[test]
    fn test_load_users_csv_missing_file() {
        let err = load_users_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
