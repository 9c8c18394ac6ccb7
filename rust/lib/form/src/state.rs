use std::sync::Arc;
use std::time::{Duration, Instant};

use intake_kv::KVStore;

use crate::draft::{self, DraftError};
use crate::fields::{Field, FormFields};
use crate::validate::{validate_form, FormValidation};

/// How long the "draft saved" flag stays up after a save.
pub const DRAFT_SAVED_WINDOW: Duration = Duration::from_secs(3);

/// State of one intake form.
///
/// Holds the raw field values, the validation derived from them, and the
/// submit/draft flags a UI renders. Validation is recomputed on every
/// [`set_field`](Self::set_field); it never blocks saving a draft.
pub struct FormState {
    store: Arc<dyn KVStore>,
    fields: FormFields,
    validation: FormValidation,
    submitting: bool,
    submitted: bool,
    draft_saved_at: Option<Instant>,
    draft_saved_window: Duration,
}

impl FormState {
    /// Create the form, restoring a saved draft if one can be read.
    pub fn new(store: Arc<dyn KVStore>) -> Self {
        let fields = draft::load_draft(store.as_ref()).unwrap_or_default();
        if !fields.is_empty() {
            tracing::info!("restored saved draft");
        }
        let validation = validate_form(&fields);
        Self {
            store,
            fields,
            validation,
            submitting: false,
            submitted: false,
            draft_saved_at: None,
            draft_saved_window: DRAFT_SAVED_WINDOW,
        }
    }

    /// Override how long the "draft saved" flag stays up.
    pub fn with_draft_saved_window(mut self, window: Duration) -> Self {
        self.draft_saved_window = window;
        self
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn validation(&self) -> &FormValidation {
        &self.validation
    }

    /// Whether the submit action should be enabled.
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the last submission succeeded.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Update one field and recompute validation.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
        self.validation = validate_form(&self.fields);
    }

    /// Replace every field at once and recompute validation.
    pub fn set_fields(&mut self, fields: FormFields) {
        self.fields = fields;
        self.validation = validate_form(&self.fields);
    }

    /// Persist the current fields as the draft and raise the saved flag.
    pub fn save_draft(&mut self) -> Result<(), DraftError> {
        self.save_draft_at(Instant::now())
    }

    pub fn save_draft_at(&mut self, now: Instant) -> Result<(), DraftError> {
        draft::save_draft(self.store.as_ref(), &self.fields)?;
        self.draft_saved_at = Some(now);
        Ok(())
    }

    /// Whether the "draft saved" flag is up at `now`.
    pub fn draft_saved_visible(&self, now: Instant) -> bool {
        self.draft_saved_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.draft_saved_window)
    }

    /// Drop the "draft saved" flag once its window has passed.
    pub fn tick(&mut self, now: Instant) {
        if !self.draft_saved_visible(now) {
            self.draft_saved_at = None;
        }
    }

    /// Remove the stored draft and reset the form to empty.
    pub fn clear_draft(&mut self) -> Result<(), DraftError> {
        draft::clear_draft(self.store.as_ref())?;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.fields = FormFields::default();
        self.validation = validate_form(&self.fields);
        self.submitting = false;
        self.submitted = false;
        self.draft_saved_at = None;
    }

    /// Mark a submission as in flight. Returns false when one already is.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        true
    }

    /// Mark the in-flight submission as finished.
    ///
    /// A successful submission clears the stored draft and the form.
    pub fn finish_submit(&mut self, success: bool) -> Result<(), DraftError> {
        self.submitting = false;
        if success {
            draft::clear_draft(self.store.as_ref())?;
            self.reset();
            self.submitted = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_kv::MemoryStore;

    fn store() -> Arc<dyn KVStore> {
        Arc::new(MemoryStore::new())
    }

    fn fill(state: &mut FormState) {
        state.set_field(Field::Name, "Ada Lovelace");
        state.set_field(Field::ProductLine, "AB-12");
        state.set_field(Field::ErCode, "ER123456");
        state.set_field(Field::Description, "Board fails self test on boot");
        state.set_field(Field::ModelNumber, "XY1234Z");
    }

    #[test]
    fn validation_recomputed_on_every_change() {
        let mut state = FormState::new(store());
        assert!(!state.is_valid());

        fill(&mut state);
        assert!(state.is_valid());

        state.set_field(Field::ErCode, "ER12345");
        assert!(!state.is_valid());
        assert!(!state.validation().get(Field::ErCode).is_valid);

        state.set_field(Field::ErCode, "ER123456");
        assert!(state.is_valid());
    }

    #[test]
    fn draft_survives_restart() {
        let kv = store();
        let mut state = FormState::new(kv.clone());
        state.set_field(Field::Name, "Ada");
        state.set_field(Field::ErCode, "ER1");
        state.save_draft().unwrap();
        let saved = state.fields().clone();

        let restored = FormState::new(kv);
        assert_eq!(restored.fields(), &saved);
        assert!(!restored.is_valid());
    }

    #[test]
    fn invalid_form_can_still_be_saved() {
        let mut state = FormState::new(store());
        state.set_field(Field::Name, "1");
        assert!(state.save_draft().is_ok());
    }

    #[test]
    fn corrupt_draft_leaves_form_empty() {
        let kv = store();
        kv.set(crate::DRAFT_KEY, b"\xff\xfe garbage").unwrap();
        let state = FormState::new(kv);
        assert!(state.fields().is_empty());
    }

    #[test]
    fn draft_saved_flag_expires() {
        let mut state = FormState::new(store());
        let t0 = Instant::now();
        state.save_draft_at(t0).unwrap();

        assert!(state.draft_saved_visible(t0 + Duration::from_secs(1)));
        state.tick(t0 + Duration::from_secs(2));
        assert!(state.draft_saved_visible(t0 + Duration::from_secs(2)));

        state.tick(t0 + Duration::from_secs(3));
        assert!(!state.draft_saved_visible(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn clear_twice_equals_once() {
        let kv = store();
        let mut state = FormState::new(kv.clone());
        fill(&mut state);
        state.save_draft().unwrap();

        state.clear_draft().unwrap();
        let once = (state.fields().clone(), state.is_valid(), state.is_submitting(), state.is_submitted());
        state.clear_draft().unwrap();
        let twice = (state.fields().clone(), state.is_valid(), state.is_submitting(), state.is_submitted());

        assert_eq!(once, twice);
        assert!(state.fields().is_empty());
        assert!(kv.get(crate::DRAFT_KEY).unwrap().is_none());
    }

    #[test]
    fn submitting_flag_blocks_duplicates() {
        let mut state = FormState::new(store());
        assert!(state.begin_submit());
        assert!(!state.begin_submit());
        state.finish_submit(false).unwrap();
        assert!(state.begin_submit());
    }

    #[test]
    fn successful_submit_clears_draft() {
        let kv = store();
        let mut state = FormState::new(kv.clone());
        fill(&mut state);
        state.save_draft().unwrap();

        assert!(state.begin_submit());
        state.finish_submit(true).unwrap();
        assert!(state.is_submitted());
        assert!(state.fields().is_empty());
        assert!(kv.get(crate::DRAFT_KEY).unwrap().is_none());
    }

    #[test]
    fn failed_submit_keeps_fields() {
        let mut state = FormState::new(store());
        fill(&mut state);
        state.begin_submit();
        state.finish_submit(false).unwrap();
        assert!(state.is_valid());
        assert!(!state.is_submitted());
    }
}
