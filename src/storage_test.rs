use super::*;

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryTokenStore::default();
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

    store.set(TOKEN_KEY, "abc").unwrap();
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

    store.set(TOKEN_KEY, "def").unwrap();
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("def"));

    store.remove(TOKEN_KEY).unwrap();
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn memory_store_remove_missing_key_is_ok() {
    let store = MemoryTokenStore::default();
    store.remove("nope").unwrap();
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    FileTokenStore::new(&path).set(TOKEN_KEY, "persisted").unwrap();

    let reopened = FileTokenStore::new(&path);
    assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("persisted"));
}

#[test]
fn file_store_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("absent.json"));
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    store.remove(TOKEN_KEY).unwrap();
}

#[test]
fn file_store_remove_last_key_deletes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileTokenStore::new(&path);

    store.set(TOKEN_KEY, "t").unwrap();
    assert!(path.exists());

    store.remove(TOKEN_KEY).unwrap();
    assert!(!path.exists());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn file_store_keeps_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(dir.path().join("session.json"));

    store.set("other", "1").unwrap();
    store.set(TOKEN_KEY, "t").unwrap();
    store.remove(TOKEN_KEY).unwrap();

    assert_eq!(store.get("other").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn file_store_reports_corrupt_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();

    let store = FileTokenStore::new(&path);
    assert!(matches!(store.get(TOKEN_KEY), Err(StorageError::Corrupt(_))));
}

#[cfg(unix)]
#[test]
fn file_store_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    FileTokenStore::new(&path).set(TOKEN_KEY, "t").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
