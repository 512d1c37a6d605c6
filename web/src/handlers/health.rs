//! Liveness endpoint.

use axum::Json;
use serde_json::{json, Value};

/// Plain liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "success" }))
}
