use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("account-service-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_account-service"))
        .args(args)
        .current_dir(dir)
        .env("ACCOUNT_DB_PATH", dir.join("accounts.db"))
        .env("RUST_LOG", "debug")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn test_stdout_is_pure_json_with_logging_enabled() {
    let dir = scratch_dir("json");
    std::fs::write(dir.join("users.csv"), "name\nPororo\n").unwrap();

    let imported = stdout_json(&cli(&dir, &["import-users", "users.csv"]));
    assert_eq!(imported[0]["name"], "Pororo");

    let created = stdout_json(&cli(&dir, &["create", "1", "0"]));
    assert_eq!(created["account_number"], "10000000000");

    let listed = stdout_json(&cli(&dir, &["list", "1"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let output = cli(&dir, &["get", "1"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("opened account database"));
    assert_eq!(stdout_json(&output)["status"], "IN_USE");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_business_rule_failure_exits_with_code() {
    let dir = scratch_dir("rule");

    let output = cli(&dir, &["create", "7", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("USER_NOT_FOUND"));

    let _ = std::fs::remove_dir_all(&dir);
}
