use axum::extract::{Path, State};
use axum::Json;
use weekend_core::project::ProjectWithProgress;

use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

fn project_json(p: &ProjectWithProgress) -> Result<serde_json::Value, AppError> {
    let mut value = serde_json::to_value(p)?;
    value["percent_complete"] = serde_json::json!(p.percent_complete());
    Ok(value)
}

/// GET /api/projects: every project with rolled-up progress.
pub async fn list_projects(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = app.portfolio.clone();
    let projects = blocking(move || portfolio.projects_with_progress()).await?;
    let list = projects
        .iter()
        .map(project_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(serde_json::json!({
        "site": app.site,
        "projects": list,
    })))
}

/// GET /api/projects/{number}
pub async fn get_project(
    State(app): State<AppState>,
    Path(number): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = app.portfolio.clone();
    let project = blocking(move || portfolio.project_by_number(number)).await?;
    Ok(Json(project_json(&project)?))
}
