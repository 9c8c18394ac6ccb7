use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

fn storage_err(e: impl std::fmt::Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database. Each write runs in its own committed transaction.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(storage_err)?;

        // Ensure the table exists by doing a write transaction.
        let write_txn = db.begin_write().map_err(storage_err)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        tracing::debug!("opened redb store at {}", path.display());
        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let existed = {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            let removed = table.remove(key).map_err(storage_err)?;
            removed.is_some()
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(existed)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(storage_err)?;

        for entry in iter {
            let entry = entry.map_err(storage_err)?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            let value = entry.1.value().to_vec();
            results.push((key, value));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (RedbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    #[test]
    fn set_get_delete() {
        let (store, _dir) = open_temp();

        assert!(store.get("submission:a").unwrap().is_none());
        store.set("submission:a", b"one").unwrap();
        assert_eq!(store.get("submission:a").unwrap(), Some(b"one".to_vec()));

        store.set("submission:a", b"two").unwrap();
        assert_eq!(store.get("submission:a").unwrap(), Some(b"two".to_vec()));

        assert!(store.delete("submission:a").unwrap());
        assert!(store.get("submission:a").unwrap().is_none());

        // Deleting again is a no-op that reports the key was absent.
        assert!(!store.delete("submission:a").unwrap());
    }

    #[test]
    fn concurrent_deletes_remove_once() {
        let (store, _dir) = open_temp();
        let store = Arc::new(store);
        store.set("submission:c", b"x").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.delete("submission:c").unwrap())
            })
            .collect();
        let removed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|existed| *existed)
            .count();
        assert_eq!(removed, 1);
    }

    #[test]
    fn scan_stops_at_prefix_boundary() {
        let (store, _dir) = open_temp();
        store.set("intake:draft", b"d").unwrap();
        store.set("submission:b", b"2").unwrap();
        store.set("submission:a", b"1").unwrap();
        store.set("submissions", b"x").unwrap();

        let entries = store.scan("submission:").unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["submission:a", "submission:b"]);
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set("submission:z", b"kept").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("submission:z").unwrap(), Some(b"kept".to_vec()));
    }
}
