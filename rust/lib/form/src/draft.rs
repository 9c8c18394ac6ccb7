//! Draft persistence in client-side local storage.
//!
//! A draft is the raw field map, JSON-encoded under [`DRAFT_KEY`]. Drafts
//! are never validated before they are stored.

use intake_kv::{KVError, KVStore};
use thiserror::Error;

use crate::fields::FormFields;

/// Fixed local-storage key holding the draft.
pub const DRAFT_KEY: &str = "intake:draft";

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("local storage: {0}")]
    Storage(#[from] KVError),

    #[error("encode draft: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Store `fields` as the current draft, replacing any previous one.
pub fn save_draft(store: &dyn KVStore, fields: &FormFields) -> Result<(), DraftError> {
    let bytes = serde_json::to_vec(fields)?;
    store.set(DRAFT_KEY, &bytes)?;
    tracing::debug!("draft saved ({} bytes)", bytes.len());
    Ok(())
}

/// Read the stored draft.
///
/// Returns `None` when there is no draft, when it cannot be read, or when
/// it does not parse. Failures are logged and otherwise ignored.
pub fn load_draft(store: &dyn KVStore) -> Option<FormFields> {
    let bytes = match store.get(DRAFT_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("failed to read draft: {}", e);
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(fields) => Some(fields),
        Err(e) => {
            tracing::warn!("discarding unreadable draft: {}", e);
            None
        }
    }
}

/// Remove the stored draft. Removing a missing draft is not an error.
pub fn clear_draft(store: &dyn KVStore) -> Result<(), DraftError> {
    store.delete(DRAFT_KEY)?;
    Ok(())
}
