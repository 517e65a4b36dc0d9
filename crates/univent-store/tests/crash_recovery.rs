//! Restart tests for `RedbCredentialStore`.
//!
//! Tokens written before the store is dropped must be readable after it is
//! reopened, simulating a client restart.

use tempfile::tempdir;
use univent_store::{ACCESS_TOKEN, CredentialStore, REFRESH_TOKEN, RedbCredentialStore};

#[test]
fn tokens_survive_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("creds.redb");

    {
        let store = RedbCredentialStore::open(&db_path).unwrap();
        store.set(ACCESS_TOKEN, "t1").unwrap();
        store.set(REFRESH_TOKEN, "r1").unwrap();

        // Store dropped
    }

    {
        let store = RedbCredentialStore::open(&db_path).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN).unwrap().unwrap().expose(), "t1");
        assert_eq!(store.get(REFRESH_TOKEN).unwrap().unwrap().expose(), "r1");
    }
}

#[test]
fn overwrite_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("creds.redb");

    {
        let store = RedbCredentialStore::open(&db_path).unwrap();
        store.set(ACCESS_TOKEN, "old").unwrap();
        store.set(ACCESS_TOKEN, "new").unwrap();
    }

    let store = RedbCredentialStore::open(&db_path).unwrap();
    assert_eq!(store.get(ACCESS_TOKEN).unwrap().unwrap().expose(), "new");
}

#[test]
fn delete_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("creds.redb");

    {
        let store = RedbCredentialStore::open(&db_path).unwrap();
        store.set(ACCESS_TOKEN, "t1").unwrap();
        store.set(REFRESH_TOKEN, "r1").unwrap();
        store.delete(ACCESS_TOKEN).unwrap();
        store.delete(REFRESH_TOKEN).unwrap();
    }

    let store = RedbCredentialStore::open(&db_path).unwrap();
    assert!(!store.contains(ACCESS_TOKEN).unwrap());
    assert!(!store.contains(REFRESH_TOKEN).unwrap());
}

#[test]
fn fresh_database_is_empty() {
    let dir = tempdir().unwrap();
    let store = RedbCredentialStore::open(dir.path().join("fresh.redb")).unwrap();

    assert!(store.get(ACCESS_TOKEN).unwrap().is_none());
    assert!(store.get(REFRESH_TOKEN).unwrap().is_none());
}

#[test]
fn clones_share_database() {
    let dir = tempdir().unwrap();
    let store = RedbCredentialStore::open(dir.path().join("creds.redb")).unwrap();
    let clone = store.clone();

    store.set(ACCESS_TOKEN, "shared").unwrap();
    assert_eq!(clone.get(ACCESS_TOKEN).unwrap().unwrap().expose(), "shared");
}
