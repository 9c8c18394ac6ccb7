//! Local form commands: edit fields, inspect validation, manage the draft.
//!
//! Every edit is saved to the draft right away, so a later `intake submit`
//! picks up where the last command left off.

use std::sync::Arc;

use anyhow::Result;
use intake_form::{validate_field, Field, FormState};
use intake_kv::{KVStore, RedbStore};

use crate::config::ClientConfig;

/// Open the local store and restore the form from it.
pub fn open_state(config: &ClientConfig) -> Result<FormState> {
    let path = config.local_db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let kv: Arc<dyn KVStore> = Arc::new(
        RedbStore::open(&path)
            .map_err(|e| anyhow::anyhow!("failed to open local store {}: {}", path.display(), e))?,
    );
    tracing::debug!("local store at {}", path.display());
    Ok(FormState::new(kv))
}

/// Accepts wire names (`erCode`) and dashed names (`er-code`).
pub fn parse_field(name: &str) -> Result<Field> {
    let mut normalized = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' || c == '_' {
            upper = true;
        } else if upper {
            normalized.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            normalized.push(c);
        }
    }
    Field::from_key(&normalized).ok_or_else(|| {
        let known: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        anyhow::anyhow!("Unknown field: {} (expected one of {})", name, known.join(", "))
    })
}

/// SET one field and save the draft. Returns the field's validation line.
pub fn set(state: &mut FormState, field: Field, value: &str) -> Result<String> {
    state.set_field(field, value);
    state.save_draft()?;
    Ok(field_line(state, field))
}

fn field_line(state: &FormState, field: Field) -> String {
    let value = state.fields().get(field);
    let check = state.validation().get(field);
    let mark = if check.is_valid { "ok" } else { "!!" };
    let mut line = format!("{} {:<14} {}", mark, field.label(), if value.is_empty() { "-" } else { value });
    if !check.is_valid {
        line.push_str(&format!("  ({})", check.message));
    }
    line
}

/// SHOW the current form.
pub fn show(state: &FormState, json: bool) -> Result<String> {
    if json {
        let errors: serde_json::Map<String, serde_json::Value> = state
            .validation()
            .errors()
            .into_iter()
            .map(|(f, m)| (f.key().to_string(), serde_json::Value::String(m.to_string())))
            .collect();
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "fields": state.fields(),
            "valid": state.is_valid(),
            "errors": errors,
        }))?);
    }

    let mut out: Vec<String> = Field::ALL.iter().map(|f| field_line(state, *f)).collect();
    out.push(String::new());
    out.push(if state.is_valid() {
        "Ready to submit.".to_string()
    } else {
        "Not ready: fix the fields marked !!".to_string()
    });
    Ok(out.join("\n"))
}

/// CLEAR the draft and the form.
pub fn clear(state: &mut FormState) -> Result<()> {
    state.clear_draft()?;
    Ok(())
}

/// VALIDATE a single value without touching the draft.
pub fn check(field: Field, value: &str) -> (bool, String) {
    let r = validate_field(field, value);
    (r.is_valid, r.message)
}
