use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use weekend_core::WeekendError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

fn status_for(e: &WeekendError) -> StatusCode {
    if e.is_conflict() {
        return StatusCode::CONFLICT;
    }
    match e {
        WeekendError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        WeekendError::NotAuthorized => StatusCode::FORBIDDEN,
        WeekendError::ProjectNotFound(_)
        | WeekendError::IterationNotFound(_)
        | WeekendError::ChecklistItemNotFound(_)
        | WeekendError::AssetNotFound(_)
        | WeekendError::UserNotFound(_) => StatusCode::NOT_FOUND,
        WeekendError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        WeekendError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        WeekendError::NotInitialized
        | WeekendError::InvalidStatus(_)
        | WeekendError::InvalidRole(_)
        | WeekendError::Validation(_) => StatusCode::BAD_REQUEST,
        WeekendError::Blob(_)
        | WeekendError::Store(_)
        | WeekendError::Sqlite(_)
        | WeekendError::Io(_)
        | WeekendError::Yaml(_)
        | WeekendError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<WeekendError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
