#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: place an order
    let mut input1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        input1,
        r#"{{"method":"create_order","customer_id":42,"items":[{{"product_code":"A1","unit_price":"10.0","quantity":2}}]}}"#
    )
    .unwrap();

    let mut cmd1 = Command::new(cargo_bin!("orderflow"));
    cmd1.env_remove("PAYMENT_SERVICE_URL")
        .arg("run")
        .arg(input1.path())
        .arg("--data-source-url")
        .arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains(r#"{"ok":{"order_id":1}}"#));

    // 2. Second run: read it back and place another one against the same DB
    let mut input2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(input2, r#"{{"method":"get_order","order_id":1}}"#).unwrap();
    writeln!(
        input2,
        r#"{{"method":"create_order","customer_id":7,"items":[]}}"#
    )
    .unwrap();

    let mut cmd2 = Command::new(cargo_bin!("orderflow"));
    cmd2.env_remove("PAYMENT_SERVICE_URL")
        .arg("run")
        .arg(input2.path())
        .arg("--data-source-url")
        .arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    assert!(stdout2.contains(r#""customer_id":42"#));
    assert!(stdout2.contains(r#"{"ok":{"order_id":2}}"#));
}
