use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use intake_core::{is_valid_id, new_id, FieldError, Page, PageParams, ServiceError};
use intake_form::{validate_field, validate_product_line, Field, FormFields};
use intake_kv::{KVError, KVStore};

use crate::model::{CreateSubmission, Submission};

/// Key prefix for stored submissions.
const KEY_PREFIX: &str = "submission:";

/// Longest accepted name. Checked on the server only.
pub const NAME_MAX: usize = 100;

const NOT_FOUND: &str = "Submission not found";
const INVALID_ID: &str = "Invalid submission id";

fn key(id: &str) -> String {
    format!("{}{}", KEY_PREFIX, id)
}

fn storage(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// Submission service. Owns the store handle and the optional product
/// line catalog; every call is independent.
pub struct SubmissionService {
    kv: Arc<dyn KVStore>,
    product_lines: BTreeSet<String>,
}

impl SubmissionService {
    /// Build the service. Each catalog entry must itself be a well-formed
    /// product line code.
    pub fn new(kv: Arc<dyn KVStore>, product_lines: Vec<String>) -> Result<Self, ServiceError> {
        let mut catalog = BTreeSet::new();
        for code in product_lines {
            let code = code.trim().to_string();
            let check = validate_product_line(&code);
            if !check.is_valid {
                return Err(ServiceError::Internal(format!(
                    "product line catalog entry {:?}: {}",
                    code, check.message
                )));
            }
            catalog.insert(code);
        }
        Ok(Self {
            kv,
            product_lines: catalog,
        })
    }

    /// Validate and store a new submission.
    ///
    /// Fields are trimmed first. Every failing field is reported; nothing
    /// is written unless all pass.
    pub fn create(&self, req: CreateSubmission) -> Result<Submission, ServiceError> {
        let fields = req.trimmed();
        let errors = self.validate(&fields);
        if !errors.is_empty() {
            tracing::debug!(failing = errors.len(), "create rejected");
            return Err(ServiceError::Validation(errors));
        }

        let record = Submission::new(new_id(), fields, Utc::now());
        let bytes =
            serde_json::to_vec(&record).map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.kv.set(&key(&record.id), &bytes).map_err(storage)?;
        tracing::info!(id = %record.id, "submission created");
        Ok(record)
    }

    fn validate(&self, fields: &FormFields) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for field in Field::ALL {
            let value = fields.get(field);
            let result = validate_field(field, value);
            if !result.is_valid {
                errors.push(FieldError::new(field.key(), result.message));
                continue;
            }
            match field {
                Field::Name if value.chars().count() > NAME_MAX => {
                    errors.push(FieldError::new(
                        field.key(),
                        format!("Name must be at most {} characters", NAME_MAX),
                    ));
                }
                Field::ProductLine
                    if !self.product_lines.is_empty() && !self.product_lines.contains(value) =>
                {
                    errors.push(FieldError::new(field.key(), "Unknown product line"));
                }
                _ => {}
            }
        }
        errors
    }

    /// One page of submissions, newest first.
    pub fn list(&self, params: &PageParams) -> Result<Page<Submission>, ServiceError> {
        let mut all = Vec::new();
        for (k, bytes) in self.kv.scan(KEY_PREFIX).map_err(storage)? {
            match serde_json::from_slice::<Submission>(&bytes) {
                Ok(record) => all.push(record),
                Err(e) => tracing::warn!(key = %k, "skipping unreadable submission: {}", e),
            }
        }
        all.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(Page::slice(all, params))
    }

    pub fn get(&self, id: &str) -> Result<Submission, ServiceError> {
        if !is_valid_id(id) {
            return Err(ServiceError::InvalidId(INVALID_ID.into()));
        }
        let bytes = self
            .kv
            .get(&key(id))
            .map_err(storage)?
            .ok_or_else(|| ServiceError::NotFound(NOT_FOUND.into()))?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Remove a submission. A missing id is reported, not ignored.
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !is_valid_id(id) {
            return Err(ServiceError::InvalidId(INVALID_ID.into()));
        }
        if !self.kv.delete(&key(id)).map_err(storage)? {
            return Err(ServiceError::NotFound(NOT_FOUND.into()));
        }
        tracing::info!(id, "submission deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_kv::MemoryStore;

    fn service() -> SubmissionService {
        SubmissionService::new(Arc::new(MemoryStore::new()), vec![]).unwrap()
    }

    fn valid() -> CreateSubmission {
        FormFields {
            name: "Ada Lovelace".into(),
            product_line: "AB-12".into(),
            er_code: "ER123456".into(),
            description: "Sensor reads zero after firmware update".into(),
            model_number: "XY1234".into(),
        }
    }

    fn failing(err: ServiceError) -> Vec<String> {
        match err {
            ServiceError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_trims_and_stores() {
        let svc = service();
        let mut req = valid();
        req.name = "  Ada Lovelace ".into();
        let record = svc.create(req).unwrap();
        assert_eq!(record.name, "Ada Lovelace");
        assert!(is_valid_id(&record.id));
        assert_eq!(svc.get(&record.id).unwrap(), record);
    }

    #[test]
    fn create_reports_every_failing_field() {
        let svc = service();
        let mut req = valid();
        req.er_code = "ER12345".into();
        req.model_number = "X".into();
        assert_eq!(failing(svc.create(req).unwrap_err()), vec!["erCode", "modelNumber"]);
        assert!(svc.list(&PageParams::default()).unwrap().items.is_empty());
    }

    #[test]
    fn name_upper_bound() {
        let svc = service();
        let mut req = valid();
        req.name = "a".repeat(NAME_MAX);
        assert!(svc.create(req.clone()).is_ok());
        req.name = "a".repeat(NAME_MAX + 1);
        assert_eq!(failing(svc.create(req).unwrap_err()), vec!["name"]);
    }

    #[test]
    fn catalog_restricts_product_lines() {
        let svc = SubmissionService::new(Arc::new(MemoryStore::new()), vec!["AB-12".into()]).unwrap();
        assert!(svc.create(valid()).is_ok());

        let mut req = valid();
        req.product_line = "CD-34".into();
        assert_eq!(failing(svc.create(req).unwrap_err()), vec!["productLine"]);
    }

    #[test]
    fn catalog_entries_must_match_pattern() {
        let err = SubmissionService::new(Arc::new(MemoryStore::new()), vec!["ab12".into()]);
        assert!(err.is_err());
    }

    #[test]
    fn list_newest_first() {
        let svc = service();
        let first = svc.create(valid()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = svc.create(valid()).unwrap();

        let page = svc.list(&PageParams::default()).unwrap();
        assert_eq!(page.items[0].id, second.id);
        assert_eq!(page.items[1].id, first.id);
    }

    #[test]
    fn bad_id_checked_before_lookup() {
        let svc = service();
        assert!(matches!(svc.get("nope"), Err(ServiceError::InvalidId(_))));
        assert!(matches!(svc.delete("nope"), Err(ServiceError::InvalidId(_))));
        let missing = new_id();
        assert!(matches!(svc.get(&missing), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(&missing), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn delete_removes() {
        let svc = service();
        let record = svc.create(valid()).unwrap();
        svc.delete(&record.id).unwrap();
        assert!(matches!(svc.get(&record.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(&record.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn racing_deletes_succeed_once() {
        let svc = Arc::new(service());
        let record = svc.create(valid()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                let id = record.id.clone();
                std::thread::spawn(move || svc.delete(&id))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ServiceError::NotFound(_))));
    }
}
