use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::FormFields;

/// A stored submission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Server-assigned, 32 lowercase hex chars.
    pub id: String,
    pub name: String,
    pub product_line: String,
    pub er_code: String,
    pub description: String,
    pub model_number: String,
    /// Server-assigned creation time.
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(id: String, fields: FormFields, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            product_line: fields.product_line,
            er_code: fields.er_code,
            description: fields.description,
            model_number: fields.model_number,
            submitted_at,
        }
    }
}
