//! Submission module: validated create, paginated list, get and delete of
//! intake submissions over a key-value store.

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use intake_core::{Module, ServiceError};
use intake_kv::KVStore;

pub use model::{CreateSubmission, Submission};
pub use service::{SubmissionService, NAME_MAX};

/// The submission module, mounted under `/api`.
pub struct SubmissionModule {
    service: Arc<SubmissionService>,
}

impl SubmissionModule {
    /// Create the module over `kv`. `product_lines` is the optional catalog
    /// of accepted product line codes; empty accepts any well-formed code.
    pub fn new(kv: Arc<dyn KVStore>, product_lines: Vec<String>) -> Result<Self, ServiceError> {
        Ok(Self {
            service: Arc::new(SubmissionService::new(kv, product_lines)?),
        })
    }

    pub fn service(&self) -> &Arc<SubmissionService> {
        &self.service
    }
}

impl Module for SubmissionModule {
    fn name(&self) -> &str {
        "submission"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
