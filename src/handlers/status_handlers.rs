use axum::response::Json;
use serde_json::{json, Value};

/// GET / - health check
pub async fn status_handler() -> Json<Value> {
    Json(json!({ "status": "Backend running" }))
}
