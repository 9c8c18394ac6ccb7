//! Per-field validators.
//!
//! Each validator is a pure function from the current raw value to a
//! [`ValidationResult`]. [`validate_form`] derives the whole result map
//! from a field map and is re-run on every change.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fields::{Field, FormFields};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").expect("invalid name pattern"));
static PRODUCT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,4}-[0-9]{2,4}$").expect("invalid product line pattern"));
static ER_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ER[0-9]{6}$").expect("invalid ER code pattern"));
static MODEL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[0-9]{4}[A-Z]?$").expect("invalid model number pattern"));

pub const NAME_MIN: usize = 2;
pub const PRODUCT_LINE_MIN: usize = 3;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 500;

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Empty when valid.
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

fn required(field: Field, value: &str) -> Option<ValidationResult> {
    value
        .trim()
        .is_empty()
        .then(|| ValidationResult::fail(format!("{} is required", field.label())))
}

/// Length bounds count the trimmed value, as the server stores it.
fn min_len(field: Field, value: &str, min: usize) -> Option<ValidationResult> {
    (value.trim().chars().count() < min).then(|| {
        ValidationResult::fail(format!("{} must be at least {} characters", field.label(), min))
    })
}

pub fn validate_name(value: &str) -> ValidationResult {
    if let Some(r) = required(Field::Name, value).or_else(|| min_len(Field::Name, value, NAME_MIN)) {
        return r;
    }
    if !NAME_RE.is_match(value) {
        return ValidationResult::fail("Name can only contain letters and spaces");
    }
    ValidationResult::ok()
}

pub fn validate_product_line(value: &str) -> ValidationResult {
    if let Some(r) = required(Field::ProductLine, value)
        .or_else(|| min_len(Field::ProductLine, value, PRODUCT_LINE_MIN))
    {
        return r;
    }
    if !PRODUCT_LINE_RE.is_match(value) {
        return ValidationResult::fail(
            "Product line must be 2-4 uppercase letters, a dash and 2-4 digits (e.g. AB-12)",
        );
    }
    ValidationResult::ok()
}

pub fn validate_er_code(value: &str) -> ValidationResult {
    if let Some(r) = required(Field::ErCode, value) {
        return r;
    }
    if !ER_CODE_RE.is_match(value) {
        return ValidationResult::fail("ER code must be ER followed by 6 digits");
    }
    ValidationResult::ok()
}

pub fn validate_description(value: &str) -> ValidationResult {
    if let Some(r) = required(Field::Description, value)
        .or_else(|| min_len(Field::Description, value, DESCRIPTION_MIN))
    {
        return r;
    }
    if value.trim().chars().count() > DESCRIPTION_MAX {
        return ValidationResult::fail(format!(
            "Description must be at most {} characters",
            DESCRIPTION_MAX
        ));
    }
    ValidationResult::ok()
}

pub fn validate_model_number(value: &str) -> ValidationResult {
    if let Some(r) = required(Field::ModelNumber, value) {
        return r;
    }
    if !MODEL_NUMBER_RE.is_match(value) {
        return ValidationResult::fail(
            "Model number must be 2 uppercase letters, 4 digits and an optional uppercase letter",
        );
    }
    ValidationResult::ok()
}

/// Validate one field's value.
pub fn validate_field(field: Field, value: &str) -> ValidationResult {
    match field {
        Field::Name => validate_name(value),
        Field::ProductLine => validate_product_line(value),
        Field::ErCode => validate_er_code(value),
        Field::Description => validate_description(value),
        Field::ModelNumber => validate_model_number(value),
    }
}

/// Validation results for every field of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidation {
    results: BTreeMap<Field, ValidationResult>,
    all_filled: bool,
}

impl FormValidation {
    pub fn get(&self, field: Field) -> &ValidationResult {
        // validate_form always fills every field.
        &self.results[&field]
    }

    /// All five fields valid and none blank after trimming.
    pub fn is_valid(&self) -> bool {
        self.all_filled && self.results.values().all(|r| r.is_valid)
    }

    /// Failing fields with their messages, in form order.
    pub fn errors(&self) -> Vec<(Field, &str)> {
        self.results
            .iter()
            .filter(|(_, r)| !r.is_valid)
            .map(|(f, r)| (*f, r.message.as_str()))
            .collect()
    }
}

/// Derive the validation result for every field from the current values.
pub fn validate_form(fields: &FormFields) -> FormValidation {
    let results = Field::ALL
        .into_iter()
        .map(|f| (f, validate_field(f, fields.get(f))))
        .collect();
    FormValidation {
        results,
        all_filled: fields.all_filled(),
    }
}

/// Whether the form may be submitted.
pub fn is_form_valid(fields: &FormFields) -> bool {
    validate_form(fields).is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields() -> FormFields {
        FormFields {
            name: "Ada Lovelace".into(),
            product_line: "AB-12".into(),
            er_code: "ER123456".into(),
            description: "Intermittent fault on the sensor board".into(),
            model_number: "XY1234".into(),
        }
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("Al").is_valid);
        assert!(validate_name("Ada Lovelace").is_valid);
        assert!(!validate_name("A").is_valid);
        assert!(!validate_name("").is_valid);
        assert!(!validate_name("   ").is_valid);
        assert!(!validate_name("Ada1").is_valid);
        assert!(!validate_name("O'Brien").is_valid);
        assert_eq!(validate_name("").message, "Name is required");
        assert_eq!(validate_name("A").message, "Name must be at least 2 characters");
    }

    #[test]
    fn length_bounds_ignore_surrounding_whitespace() {
        assert_eq!(validate_name(" A ").message, "Name must be at least 2 characters");
        assert!(!validate_description(&format!("  {}  ", "x".repeat(8))).is_valid);
        assert!(validate_description(&format!(" {} ", "x".repeat(500))).is_valid);
    }

    #[test]
    fn product_line_rules() {
        assert!(validate_product_line("AB-12").is_valid);
        assert!(validate_product_line("ABCD-1234").is_valid);
        assert!(!validate_product_line("AB").is_valid);
        assert!(!validate_product_line("").is_valid);
        assert!(!validate_product_line("A-12").is_valid);
        assert!(!validate_product_line("ABCDE-12").is_valid);
        assert!(!validate_product_line("AB-12345").is_valid);
        assert!(!validate_product_line("ab-12").is_valid);
        assert!(!validate_product_line("AB12").is_valid);
        assert_eq!(
            validate_product_line("AB").message,
            "Product line must be at least 3 characters"
        );
    }

    #[test]
    fn er_code_rules() {
        assert!(validate_er_code("ER123456").is_valid);
        assert!(!validate_er_code("ER12345").is_valid);
        assert!(!validate_er_code("ER1234567").is_valid);
        assert!(!validate_er_code("er123456").is_valid);
        assert!(!validate_er_code("EX123456").is_valid);
        assert!(!validate_er_code("").is_valid);
        assert_eq!(validate_er_code("").message, "ER code is required");
    }

    #[test]
    fn description_rules() {
        assert!(validate_description(&"x".repeat(10)).is_valid);
        assert!(validate_description(&"x".repeat(500)).is_valid);
        assert!(!validate_description(&"x".repeat(9)).is_valid);
        assert!(!validate_description(&"x".repeat(501)).is_valid);
        assert!(!validate_description("").is_valid);
        // Length counts characters, not bytes.
        assert!(validate_description(&"é".repeat(500)).is_valid);
    }

    #[test]
    fn model_number_rules() {
        assert!(validate_model_number("XY1234").is_valid);
        assert!(validate_model_number("XY1234Z").is_valid);
        assert!(!validate_model_number("XY123").is_valid);
        assert!(!validate_model_number("XY1234ZZ").is_valid);
        assert!(!validate_model_number("xy1234").is_valid);
        assert!(!validate_model_number("X1234").is_valid);
        assert!(!validate_model_number("").is_valid);
    }

    #[test]
    fn whole_form_valid() {
        let v = validate_form(&valid_fields());
        assert!(v.is_valid());
        assert!(v.errors().is_empty());
        assert!(is_form_valid(&valid_fields()));
    }

    #[test]
    fn empty_form_invalid_with_every_field_listed() {
        let v = validate_form(&FormFields::default());
        assert!(!v.is_valid());
        let failing: Vec<Field> = v.errors().into_iter().map(|(f, _)| f).collect();
        assert_eq!(failing, Field::ALL.to_vec());
    }

    #[test]
    fn one_bad_field_fails_the_form() {
        let mut fields = valid_fields();
        fields.set(Field::ModelNumber, "XY12");
        let v = validate_form(&fields);
        assert!(!v.is_valid());
        assert!(!v.get(Field::ModelNumber).is_valid);
        assert!(v.get(Field::Name).is_valid);
    }
}
