//! Database tests

use super::*;
use crate::models::*;
use chrono::NaiveDate;

fn sample_tx(description: &str) -> Transaction {
    Transaction {
        id: new_id(),
        amount: 125_000.0,
        category: "Belanja".to_string(),
        description: description.to_string(),
        kind: TransactionType::Expense,
        date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
    }
}

#[test]
fn test_in_memory_db_starts_empty() {
    let db = Database::in_memory().unwrap();
    assert!(db.load_transactions().unwrap().is_empty());
    assert!(db.load_goals().unwrap().is_empty());
    assert!(db.load_user().unwrap().is_none());
}

#[test]
fn test_kv_store_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let result: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('kv_store') WHERE name IN ('key', 'value', 'updated_at')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(result, 3, "kv_store should have 3 expected columns");
}

#[test]
fn test_blob_upsert_and_delete() {
    let db = Database::in_memory().unwrap();

    db.put_blob("k", "1").unwrap();
    db.put_blob("k", "2").unwrap();
    assert_eq!(db.get_blob("k").unwrap().as_deref(), Some("2"));

    assert!(db.delete_blob("k").unwrap());
    assert!(!db.delete_blob("k").unwrap());
    assert!(db.get_blob("k").unwrap().is_none());
}

#[test]
fn test_transactions_round_trip_keeps_order() {
    let db = Database::in_memory().unwrap();
    let txs = vec![sample_tx("newest"), sample_tx("older"), sample_tx("oldest")];

    db.save_transactions(&txs).unwrap();
    assert_eq!(db.load_transactions().unwrap(), txs);
}

#[test]
fn test_stored_layout_uses_wire_names() {
    let db = Database::in_memory().unwrap();
    let goal = SavingsGoal {
        id: "g1".to_string(),
        name: "Rumah".to_string(),
        target_amount: 100_000_000.0,
        current_amount: 5_000_000.0,
        deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
    };
    db.save_goals(std::slice::from_ref(&goal)).unwrap();
    db.save_transactions(&[sample_tx("x")]).unwrap();

    let goals_raw = db.get_blob(KEY_GOALS).unwrap().unwrap();
    assert!(goals_raw.contains("\"targetAmount\""));
    assert!(goals_raw.contains("\"currentAmount\""));
    assert!(goals_raw.contains("\"2030-01-01\""));

    let tx_raw = db.get_blob(KEY_TRANSACTIONS).unwrap().unwrap();
    assert!(tx_raw.contains("\"type\":\"EXPENSE\""));

    assert_eq!(db.load_goals().unwrap(), vec![goal]);
}

#[test]
fn test_user_save_and_logout() {
    let db = Database::in_memory().unwrap();
    let user = UserSession::guest("Budi");

    db.save_user(Some(&user)).unwrap();
    assert_eq!(db.load_user().unwrap(), Some(user));

    db.save_user(None).unwrap();
    assert!(db.load_user().unwrap().is_none());
    assert!(db.get_blob(KEY_USER).unwrap().is_none());
}

#[test]
fn test_corrupt_blob_is_reported() {
    let db = Database::in_memory().unwrap();
    db.put_blob(KEY_TRANSACTIONS, "{not json").unwrap();
    let err = db.load_transactions().unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn test_reopen_file_sees_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jagadoku.db");
    let path = path.to_str().unwrap();

    let txs = vec![sample_tx("persisted")];
    {
        let db = Database::new_unencrypted(path).unwrap();
        db.save_transactions(&txs).unwrap();
    }

    let db = Database::new_unencrypted(path).unwrap();
    assert_eq!(db.load_transactions().unwrap(), txs);
}

#[test]
fn test_encrypted_database_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("secret.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new_with_key(path, Some("kata sandi")).unwrap();
        db.put_blob("k", "v").unwrap();
    }

    let db = Database::new_with_key(path, Some("kata sandi")).unwrap();
    assert_eq!(db.get_blob("k").unwrap().as_deref(), Some("v"));

    // Wrong passphrase cannot read the schema
    assert!(Database::new_with_key(path, Some("salah")).is_err());
}

#[test]
fn test_save_ledger_writes_both_or_neither() {
    let db = Database::in_memory().unwrap();
    db.save_transactions(&[sample_tx("lama")]).unwrap();

    // Make the goals write fail after transactions were written
    db.conn()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_goals BEFORE INSERT ON kv_store WHEN NEW.key = 'goals'
             BEGIN SELECT RAISE(ABORT, 'goals rejected'); END;",
        )
        .unwrap();

    let result = db.save_ledger(&[sample_tx("baru")], &[]);
    assert!(result.is_err());
    let stored = db.load_transactions().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, "lama");

    db.conn()
        .unwrap()
        .execute_batch("DROP TRIGGER reject_goals;")
        .unwrap();
    db.save_ledger(&[sample_tx("baru")], &[]).unwrap();
    assert_eq!(db.load_transactions().unwrap()[0].description, "baru");
    assert_eq!(db.get_blob(KEY_GOALS).unwrap().as_deref(), Some("[]"));
}
