use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub checked: bool,
}

/// POST /api/checklist/{id}/toggle: set an item's checked state.
///
/// The response carries the reconciled iteration status, which callers
/// should display instead of any locally computed guess.
pub async fn toggle_item(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = app.portfolio.clone();
    let outcome = blocking(move || {
        portfolio.toggle_checklist_item(user.identity(), &id, body.checked)
    })
    .await?;
    Ok(Json(serde_json::to_value(outcome)?))
}
