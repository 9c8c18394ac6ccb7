//! Intake form: field model, advisory validators, draft persistence and
//! the per-form UI state that ties them together. Also the stored
//! [`Submission`] record, shared by the service and its client.
//!
//! Validation here is advisory. It decides whether the submit action is
//! enabled; the server runs the same rules again before anything is stored.

pub mod draft;
pub mod fields;
pub mod record;
pub mod state;
pub mod validate;

pub use draft::{clear_draft, load_draft, save_draft, DraftError, DRAFT_KEY};
pub use fields::{Field, FormFields};
pub use record::Submission;
pub use state::{FormState, DRAFT_SAVED_WINDOW};
pub use validate::{
    is_form_valid, validate_description, validate_er_code, validate_field, validate_form,
    validate_model_number, validate_name, validate_product_line, FormValidation,
    ValidationResult,
};
