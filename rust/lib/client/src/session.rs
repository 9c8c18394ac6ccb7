use intake_form::FormState;

use crate::client::{SubmissionClient, SubmitOutcome};
use crate::error::FieldError;

/// A form bound to the service it submits to.
pub struct FormSession {
    state: FormState,
    client: SubmissionClient,
}

impl FormSession {
    pub fn new(state: FormState, client: SubmissionClient) -> Self {
        Self { state, client }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn client(&self) -> &SubmissionClient {
        &self.client
    }

    pub fn into_state(self) -> FormState {
        self.state
    }

    /// Submit the current form.
    ///
    /// An invalid form is rejected without touching the network. The draft
    /// is cleared only when the server stored the submission.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let validation = self.state.validation();
        if !validation.is_valid() {
            let errors = validation
                .errors()
                .into_iter()
                .map(|(field, message)| FieldError {
                    field: field.key().to_string(),
                    message: message.to_string(),
                })
                .collect();
            return SubmitOutcome::rejected("Please fix the highlighted fields", errors);
        }
        if !self.state.begin_submit() {
            return SubmitOutcome::rejected("A submission is already in progress", vec![]);
        }

        let fields = self.state.fields().trimmed();
        let outcome = self.client.submit_form(&fields).await;
        if let Err(e) = self.state.finish_submit(outcome.success) {
            tracing::warn!("submitted, but failed to clear draft: {}", e);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use intake_form::Field;
    use intake_kv::{KVStore, MemoryStore};

    use super::*;
    use crate::error::ApiError;
    use crate::retry::NoDelay;
    use crate::transport::{ApiRequest, ApiResponse, Transport};

    /// Answers every request with a fixed response and counts calls.
    struct Fixed {
        status: u16,
        body: serde_json::Value,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Transport for Fixed {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ApiResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn fixed(status: u16, body: serde_json::Value) -> Arc<Fixed> {
        Arc::new(Fixed {
            status,
            body,
            calls: AtomicUsize::new(0),
        })
    }

    fn session(kv: Arc<dyn KVStore>, t: Arc<Fixed>) -> FormSession {
        let client = SubmissionClient::with_transport(t).with_sleeper(Arc::new(NoDelay));
        FormSession::new(FormState::new(kv), client)
    }

    fn fill(state: &mut FormState) {
        state.set_field(Field::Name, "Ada Lovelace");
        state.set_field(Field::ProductLine, "AB-12");
        state.set_field(Field::ErCode, "ER123456");
        state.set_field(Field::Description, "Display flickers after warm up");
        state.set_field(Field::ModelNumber, "XY1234");
    }

    fn stored() -> serde_json::Value {
        serde_json::json!({
            "success": true,
            "message": "Submission created successfully",
            "data": {
                "id": "0123456789abcdef0123456789abcdef",
                "name": "Ada Lovelace",
                "productLine": "AB-12",
                "erCode": "ER123456",
                "description": "Display flickers after warm up",
                "modelNumber": "XY1234",
                "submittedAt": "2026-10-19T08:00:00Z",
            }
        })
    }

    #[tokio::test]
    async fn empty_form_never_reaches_the_network() {
        let t = fixed(201, stored());
        let mut s = session(Arc::new(MemoryStore::new()), t.clone());

        let outcome = s.submit().await;
        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(outcome.errors.len(), 5);
        assert_eq!(t.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_clears_draft() {
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());
        let t = fixed(201, stored());
        let mut s = session(kv.clone(), t.clone());
        fill(s.state_mut());
        s.state_mut().save_draft().unwrap();

        let outcome = s.submit().await;
        assert!(outcome.success);
        assert!(s.state().is_submitted());
        assert!(!s.state().is_submitting());
        assert!(s.state().fields().is_empty());
        assert!(kv.get(intake_form::DRAFT_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn server_rejection_keeps_draft() {
        let kv: Arc<dyn KVStore> = Arc::new(MemoryStore::new());
        let t = fixed(
            500,
            serde_json::json!({"success": false, "code": "INTERNAL", "message": "Internal server error"}),
        );
        let mut s = session(kv.clone(), t);
        fill(s.state_mut());
        s.state_mut().save_draft().unwrap();

        let outcome = s.submit().await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Internal server error");
        assert!(s.state().is_valid());
        assert!(kv.get(intake_form::DRAFT_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn in_flight_submit_blocks_another() {
        let t = fixed(201, stored());
        let mut s = session(Arc::new(MemoryStore::new()), t.clone());
        fill(s.state_mut());
        assert!(s.state_mut().begin_submit());

        let outcome = s.submit().await;
        assert!(!outcome.success);
        assert_eq!(t.calls.load(Ordering::SeqCst), 0);
    }
}
