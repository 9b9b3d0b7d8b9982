use std::fs;

use searcher_engine::{ensure_store_dir, HistoryStore, JsonFileStore, PersistError, HISTORY_KEY};
use tempfile::TempDir;

#[test]
fn creates_missing_store_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_store_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn write_replaces_existing_value() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().to_path_buf());
    assert_eq!(store.read("key").unwrap(), None);

    let first = store.write("key", "[1]").unwrap();
    assert_eq!(first.file_name().unwrap(), "key.json");
    let second = store.write("key", "[2]").unwrap();
    assert_eq!(first, second);
    assert_eq!(store.read("key").unwrap().as_deref(), Some("[2]"));
}

#[test]
fn rejects_keys_that_escape_the_directory() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().to_path_buf());
    assert!(matches!(
        store.write("../outside", "x"),
        Err(PersistError::InvalidKey(_))
    ));
    assert!(matches!(store.read(""), Err(PersistError::InvalidKey(_))));
}

#[test]
fn store_dir_that_is_a_file_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let store = JsonFileStore::new(file_path.clone());
    assert!(store.write("key", "data").is_err());
    assert!(!file_path.with_file_name("key.json").exists());
}

#[test]
fn history_round_trips_as_json_array() {
    let temp = TempDir::new().unwrap();
    let history = HistoryStore::new(temp.path().to_path_buf());
    assert!(history.load().is_empty());

    let entries = vec!["exam".to_string(), "库".to_string()];
    history.save(&entries).unwrap();
    assert_eq!(history.load(), entries);

    let raw = fs::read_to_string(temp.path().join(format!("{HISTORY_KEY}.json"))).unwrap();
    assert_eq!(raw, r#"["exam","库"]"#);
}

#[test]
fn corrupt_history_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(format!("{HISTORY_KEY}.json")), "{oops").unwrap();
    let history = HistoryStore::new(temp.path().to_path_buf());
    assert!(history.load().is_empty());
}
