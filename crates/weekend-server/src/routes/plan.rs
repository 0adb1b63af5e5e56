use axum::Json;
use serde::Deserialize;
use weekend_core::plan::parse_plan;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct PreviewBody {
    #[serde(default)]
    pub markdown: String,
}

/// POST /api/plan/preview: parse a plan without storing anything.
pub async fn preview(Json(body): Json<PreviewBody>) -> Result<Json<serde_json::Value>, AppError> {
    let items = parse_plan(&body.markdown);
    Ok(Json(serde_json::json!({
        "count": items.len(),
        "items": items,
    })))
}
