use axum::extract::State;
use axum::{Extension, Json};

use crate::auth::CurrentUser;
use crate::state::AppState;

/// GET /api/session: who the caller is, as far as the server can tell.
pub async fn get_session(
    State(app): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<serde_json::Value> {
    match user.identity() {
        Some(identity) => Json(serde_json::json!({
            "authenticated": true,
            "user_id": identity.user_id,
            "role": identity.role,
            "is_admin": app.portfolio.is_admin(Some(identity)),
        })),
        None => Json(serde_json::json!({
            "authenticated": false,
            "is_admin": false,
        })),
    }
}
