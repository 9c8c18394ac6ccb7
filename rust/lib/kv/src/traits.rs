use crate::error::KVError;

/// KVStore provides a key-value storage interface.
///
/// Keys follow a namespaced convention: `submission:{id}`, `intake:draft`.
/// Every operation touches one key (or reads one prefix) and is atomic on
/// its own; there are no multi-key transactions.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, overwriting any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Returns whether it existed; the check and the removal
    /// happen atomically. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<bool, KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
