use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    ProductLine,
    ErCode,
    Description,
    ModelNumber,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::ProductLine,
        Field::ErCode,
        Field::Description,
        Field::ModelNumber,
    ];

    /// Wire name used in JSON bodies and error lists.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::ProductLine => "productLine",
            Field::ErCode => "erCode",
            Field::Description => "description",
            Field::ModelNumber => "modelNumber",
        }
    }

    /// Human-readable label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::ProductLine => "Product line",
            Field::ErCode => "ER code",
            Field::Description => "Description",
            Field::ModelNumber => "Model number",
        }
    }

    /// Look a field up by its wire name.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The five raw field values as typed by the user.
///
/// Serialized camelCase; this is both the draft format and the create
/// request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product_line: String,
    #[serde(default)]
    pub er_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model_number: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::ProductLine => &self.product_line,
            Field::ErCode => &self.er_code,
            Field::Description => &self.description,
            Field::ModelNumber => &self.model_number,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::ProductLine => self.product_line = value,
            Field::ErCode => self.er_code = value,
            Field::Description => self.description = value,
            Field::ModelNumber => self.model_number = value,
        }
    }

    /// True when every field is empty after trimming.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|&f| self.get(f).trim().is_empty())
    }

    /// True when no field is blank after trimming.
    pub fn all_filled(&self) -> bool {
        Field::ALL.iter().all(|&f| !self.get(f).trim().is_empty())
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> FormFields {
        let mut out = FormFields::default();
        for field in Field::ALL {
            out.set(field, self.get(field).trim());
        }
        out
    }
}
