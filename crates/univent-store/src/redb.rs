//! Redb-backed durable credential store.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety. Tokens
//! survive process restarts, so a returning user resumes their session.

use std::{path::Path, sync::Arc};

use redb::{Database, TableDefinition};

use super::{CredentialError, CredentialStore, Secret};

/// Table: credentials
/// Key: credential name (`access_token`, `refresh_token`)
/// Value: raw credential string
const CREDENTIALS: TableDefinition<&str, &str> = TableDefinition::new("credentials");

/// Durable credential store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
///
/// The database file is restricted to its owner (mode `0600` on Unix) so
/// tokens are not readable by other local accounts.
#[derive(Clone)]
pub struct RedbCredentialStore {
    db: Arc<Database>,
}

impl RedbCredentialStore {
    /// Open or create a credential database at the given path.
    ///
    /// Creates the CREDENTIALS table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Io` if the database cannot be opened,
    /// created, or have its permissions restricted.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        create_private(path)?;
        let db = Database::create(path).map_err(|e| CredentialError::Io(e.to_string()))?;
        restrict_permissions(path)?;

        let txn = db.begin_write().map_err(|e| CredentialError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(CREDENTIALS).map_err(|e| CredentialError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| CredentialError::Io(e.to_string()))?;

        tracing::debug!(path = %path.display(), "opened credential store");

        Ok(Self { db: Arc::new(db) })
    }
}

impl CredentialStore for RedbCredentialStore {
    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        let txn = self.db.begin_write().map_err(|e| CredentialError::Io(e.to_string()))?;

        {
            let mut table =
                txn.open_table(CREDENTIALS).map_err(|e| CredentialError::Io(e.to_string()))?;

            // Delete then insert in the same transaction: readers see either
            // the old value or the new one, never a partial write.
            let _ = table.remove(name).map_err(|e| CredentialError::Io(e.to_string()))?;
            table.insert(name, value).map_err(|e| CredentialError::Io(e.to_string()))?;
        }

        txn.commit().map_err(|e| CredentialError::Io(e.to_string()))?;

        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Secret>, CredentialError> {
        let txn = self.db.begin_read().map_err(|e| CredentialError::Io(e.to_string()))?;

        let table = txn.open_table(CREDENTIALS).map_err(|e| CredentialError::Io(e.to_string()))?;

        let value = table.get(name).map_err(|e| CredentialError::Io(e.to_string()))?;

        Ok(value.map(|guard| Secret::new(guard.value())))
    }

    fn delete(&self, name: &str) -> Result<(), CredentialError> {
        let txn = self.db.begin_write().map_err(|e| CredentialError::Io(e.to_string()))?;

        {
            let mut table =
                txn.open_table(CREDENTIALS).map_err(|e| CredentialError::Io(e.to_string()))?;
            let _ = table.remove(name).map_err(|e| CredentialError::Io(e.to_string()))?;
        }

        txn.commit().map_err(|e| CredentialError::Io(e.to_string()))?;

        Ok(())
    }
}

/// Create `path` owner-only if it does not exist yet.
///
/// Redb would create it with the process umask, leaving a window where the
/// file is readable by others.
#[cfg(unix)]
fn create_private(path: &Path) -> Result<(), CredentialError> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new().write(true).create(true).truncate(false).mode(0o600).open(path)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_private(_path: &Path) -> Result<(), CredentialError> {
    Ok(())
}

/// Pre-existing files keep their mode through [`create_private`].
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CredentialError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::ACCESS_TOKEN;

    #[test]
    fn set_get_delete() {
        let dir = tempdir().expect("tempdir");
        let store = RedbCredentialStore::open(dir.path().join("creds.redb")).expect("open");

        store.set(ACCESS_TOKEN, "t1").expect("set failed");
        assert_eq!(
            store.get(ACCESS_TOKEN).expect("get failed").as_ref().map(Secret::expose),
            Some("t1")
        );

        store.delete(ACCESS_TOKEN).expect("delete failed");
        assert!(store.get(ACCESS_TOKEN).expect("get failed").is_none());

        store.delete(ACCESS_TOKEN).expect("delete of absent key must succeed");
    }

    #[cfg(unix)]
    #[test]
    fn database_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("creds.redb");
        let _store = RedbCredentialStore::open(&path).expect("open");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn new_file_is_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("creds.redb");
        create_private(&path).expect("create");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_readable_file_is_restricted() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("creds.redb");
        std::fs::write(&path, b"").expect("write");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).expect("chmod");

        let store = RedbCredentialStore::open(&path).expect("open");
        store.set(ACCESS_TOKEN, "t1").expect("set");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
