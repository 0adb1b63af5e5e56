use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use weekend_core::checklist::{group_by_phase, summarize, ChecklistCounts};
use weekend_core::iteration::{IterationUpdate, NewIteration};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// GET /api/iterations/{id}: iteration with checklist, time logs and assets.
pub async fn get_iteration(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = app.portfolio.clone();
    let details = blocking(move || portfolio.iteration_with_details(&id)).await?;

    let phases: Vec<serde_json::Value> = group_by_phase(&details.checklist_items)
        .iter()
        .map(|g| {
            serde_json::json!({
                "label": g.label,
                "checked": g.checked(),
                "total": g.items.len(),
            })
        })
        .collect();
    let counts = ChecklistCounts::of(&details.checklist_items);

    let mut value = serde_json::to_value(&details)?;
    value["phases"] = serde_json::json!(phases);
    value["checklist_counts"] = serde_json::to_value(counts)?;
    value["checklist_summary"] = serde_json::json!(summarize(&details.checklist_items));
    Ok(Json(value))
}

/// POST /api/iterations: create an iteration and derive its checklist.
pub async fn create_iteration(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<NewIteration>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let portfolio = app.portfolio.clone();
    let iteration =
        blocking(move || portfolio.create_iteration(user.identity(), body)).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(iteration)?)))
}

/// PATCH /api/iterations/{id}: partial update; may replace the checklist.
pub async fn update_iteration(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<IterationUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = app.portfolio.clone();
    let outcome =
        blocking(move || portfolio.update_iteration(user.identity(), &id, body)).await?;
    Ok(Json(serde_json::to_value(outcome)?))
}

/// DELETE /api/iterations/{id}
pub async fn delete_iteration(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let portfolio = app.portfolio.clone();
    blocking(move || portfolio.delete_iteration(user.identity(), &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
