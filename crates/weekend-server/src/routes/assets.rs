use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::{Extension, Json};
use serde::Deserialize;
use weekend_core::asset::{file_type_label, is_image, IterationAsset};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptionBody {
    #[serde(default)]
    pub caption: Option<String>,
}

fn asset_json(asset: &IterationAsset) -> Result<serde_json::Value, AppError> {
    let mut value = serde_json::to_value(asset)?;
    value["type_label"] = serde_json::json!(file_type_label(&asset.file_type));
    value["is_image"] = serde_json::json!(is_image(&asset.file_type));
    Ok(value)
}

/// POST /api/iterations/{id}/assets?file_name=...: raw request body is the
/// file; `Content-Type` declares its type.
pub async fn upload_asset(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let file_name = query.file_name.unwrap_or_default();
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let portfolio = app.portfolio.clone();
    let asset = blocking(move || {
        portfolio.upload_asset(
            user.identity(),
            &id,
            &file_name,
            declared.as_deref(),
            &body,
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(asset_json(&asset)?)))
}

/// PATCH /api/assets/{id}: set or clear the caption.
pub async fn update_asset(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<CaptionBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let portfolio = app.portfolio.clone();
    let asset = blocking(move || {
        portfolio.update_asset_caption(user.identity(), &id, body.caption.as_deref())
    })
    .await?;
    Ok(Json(asset_json(&asset)?))
}

/// DELETE /api/assets/{id}: remove the record and its stored file.
pub async fn delete_asset(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let portfolio = app.portfolio.clone();
    blocking(move || portfolio.delete_asset(user.identity(), &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
