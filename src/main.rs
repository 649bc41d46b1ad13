use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;
use std::path::Path;

use account_service::import::{import_users, load_users_csv};
use account_service::{logging, AccountError, AccountService, AppConfig, SqliteStore};

const USAGE: &str = "usage: account-service <command>

commands:
  init                              create the database schema
  import-users <csv>                seed account users from a CSV with a `name` column
  create <user_id> <balance>        open an account
  get <account_id>                  show one account
  list <user_id>                    list a user's accounts
  delete <user_id> <account_number> unregister an account";

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init_logging(&config.log_filter)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    match command.as_str() {
        "init" => {
            eprintln!("✓ Database ready at {}", config.database_path.display());
            Ok(())
        }
        "import-users" => {
            let path = arg(&args, 1, "csv")?;
            let users = load_users_csv(Path::new(path))?;
            let imported = import_users(&store, &users)?;
            eprintln!("✓ Imported {} account users", imported.len());
            print_json(&imported)
        }
        other => run_account_command(AccountService::new(store), other, &args),
    }
}

fn run_account_command(
    service: AccountService<SqliteStore>,
    command: &str,
    args: &[String],
) -> Result<()> {
    let outcome = match command {
        "create" => {
            let user_id = parse_i64(arg(args, 1, "user_id")?)?;
            let balance = parse_i64(arg(args, 2, "balance")?)?;
            service.create_account(user_id, balance).map(|v| to_json(&v))
        }
        "get" => {
            let id = parse_i64(arg(args, 1, "account_id")?)?;
            service.get_account(id).map(|a| to_json(&a))
        }
        "list" => {
            let user_id = parse_i64(arg(args, 1, "user_id")?)?;
            service.get_accounts_by_user_id(user_id).map(|v| to_json(&v))
        }
        "delete" => {
            let user_id = parse_i64(arg(args, 1, "user_id")?)?;
            let account_number = arg(args, 2, "account_number")?;
            service
                .delete_account(user_id, account_number)
                .map(|v| to_json(&v))
        }
        other => bail!("unknown command `{other}`\n\n{USAGE}"),
    };

    match outcome {
        Ok(json) => {
            println!("{}", json?);
            Ok(())
        }
        Err(e) => report_failure(e),
    }
}

fn report_failure(e: AccountError) -> Result<()> {
    if e.is_business_rule() {
        eprintln!("❌ {}: {}", e.code(), e);
        std::process::exit(1);
    }
    Err(e.into())
}

fn arg<'a>(args: &'a [String], idx: usize, name: &str) -> Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}>\n\n{USAGE}"))
}

fn parse_i64(value: &str) -> Result<i64> {
    value
        .parse()
        .with_context(|| format!("`{value}` is not an integer"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}
