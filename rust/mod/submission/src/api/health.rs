use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use intake_core::now_rfc3339;

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": now_rfc3339(),
    }))
}
