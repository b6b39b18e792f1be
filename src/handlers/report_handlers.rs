use axum::response::Json;
use serde_json::Value;

/// GET /reports/ - reports are not persisted yet, so the listing is always empty
pub async fn list_reports_handler() -> Json<Vec<Value>> {
    Json(Vec::new())
}
