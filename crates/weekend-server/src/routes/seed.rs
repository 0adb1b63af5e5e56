use axum::extract::State;
use axum::{Extension, Json};
use weekend_core::seed::SeedFile;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

/// POST /api/seed: upsert the project catalogue by number.
pub async fn seed_projects(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<SeedFile>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = app.portfolio.clone();
    let projects =
        blocking(move || portfolio.seed_projects(user.identity(), &body.projects)).await?;
    Ok(Json(serde_json::json!({
        "seeded": projects.len(),
        "projects": projects,
    })))
}
