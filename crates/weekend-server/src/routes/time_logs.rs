use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use weekend_core::time_log::{format_minutes, NewTimeLog};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// POST /api/iterations/{id}/time-logs
pub async fn create_time_log(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<NewTimeLog>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let portfolio = app.portfolio.clone();
    let log = blocking(move || portfolio.create_time_log(user.identity(), &id, body)).await?;

    let mut value = serde_json::to_value(&log)?;
    if let Some(minutes) = log.duration_minutes {
        value["duration_display"] = serde_json::json!(format_minutes(minutes));
    }
    Ok((StatusCode::CREATED, Json(value)))
}
