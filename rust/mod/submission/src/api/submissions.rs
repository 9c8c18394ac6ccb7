use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use intake_core::{FieldError, PageParams, ServiceError};
use intake_form::Field;

use crate::model::CreateSubmission;
use crate::service::SubmissionService;

type ServiceState = Arc<SubmissionService>;

pub fn router(service: ServiceState) -> Router {
    Router::new()
        .route("/submissions", post(create_submission).get(list_submissions))
        .route("/submissions/{id}", get(get_submission).delete(delete_submission))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// POST /submissions
// ---------------------------------------------------------------------------

async fn create_submission(
    State(service): State<ServiceState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let Json(body) = body.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let record = service.create(form_from_json(&body)?)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Submission created successfully",
            "data": record,
        })),
    ))
}

/// Read the form fields from a JSON object. Absent or null fields read as
/// empty; a field of any other non-string type fails validation by name.
fn form_from_json(body: &Value) -> Result<CreateSubmission, ServiceError> {
    let Some(object) = body.as_object() else {
        return Err(ServiceError::BadRequest("Request body must be a JSON object".into()));
    };
    let mut req = CreateSubmission::default();
    let mut errors = Vec::new();
    for field in Field::ALL {
        match object.get(field.key()) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => req.set(field, s.as_str()),
            Some(_) => errors.push(FieldError::new(
                field.key(),
                format!("{} must be a string", field.label()),
            )),
        }
    }
    if !errors.is_empty() {
        return Err(ServiceError::Validation(errors));
    }
    Ok(req)
}

// ---------------------------------------------------------------------------
// GET /submissions
// ---------------------------------------------------------------------------

async fn list_submissions(
    State(service): State<ServiceState>,
    query: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Value>, ServiceError> {
    let Query(params) = query.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let page = service.list(&params)?;
    Ok(Json(json!({
        "success": true,
        "data": page.items,
        "pagination": page.pagination,
    })))
}

// ---------------------------------------------------------------------------
// GET /submissions/{id}
// ---------------------------------------------------------------------------

async fn get_submission(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    let record = service.get(&id)?;
    Ok(Json(json!({ "success": true, "data": record })))
}

// ---------------------------------------------------------------------------
// DELETE /submissions/{id}
// ---------------------------------------------------------------------------

async fn delete_submission(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    service.delete(&id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Submission deleted successfully",
    })))
}
