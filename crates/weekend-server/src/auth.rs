use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use weekend_core::identity::Identity;

use crate::error::AppError;
use crate::state::AppState;

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "weekend_session";

/// Caller identity attached to every request. `None` means anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Resolve the session token (bearer header first, then cookie) into a
/// [`CurrentUser`] extension.
///
/// Unknown or expired tokens are treated as anonymous; admin-only handlers
/// reject them later with 401. Only a failing identity provider aborts the
/// request here.
pub async fn identity_middleware(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = match session_token(req.headers()) {
        None => None,
        Some(token) => {
            let portfolio = app.portfolio.clone();
            let resolved =
                tokio::task::spawn_blocking(move || portfolio.resolve_identity(Some(&token)))
                    .await;
            match resolved {
                Ok(Ok(identity)) => identity,
                Ok(Err(e)) => return AppError(e.into()).into_response(),
                Err(e) => {
                    return AppError(anyhow::anyhow!("task join error: {e}")).into_response()
                }
            }
        }
    };
    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{body::Body, http::Request, middleware, routing::get, Extension, Router};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use weekend_core::actions::Portfolio;
    use weekend_core::blob::FsBlobStore;
    use weekend_core::config::SiteConfig;
    use weekend_core::store::SqliteStore;
    use weekend_core::types::Role;

    async fn whoami(Extension(user): Extension<CurrentUser>) -> String {
        user.identity()
            .map(|i| i.user_id.clone())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn test_app() -> (Router, String, String) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let blobs = Arc::new(FsBlobStore::new("/nonexistent", "http://localhost/files"));
        let portfolio = Portfolio::new(store.clone(), store, blobs);
        let admin = portfolio.create_user(None, Role::Admin).unwrap();
        let token = portfolio.issue_session(&admin.id).unwrap();
        let state = AppState::new(
            portfolio,
            SiteConfig {
                name: "test".into(),
                tagline: None,
            },
        );
        let app = Router::new()
            .route("/", get(whoami))
            .layer(middleware::from_fn_with_state(state, identity_middleware));
        (app, admin.id, token)
    }

    async fn call(app: Router, header: Option<(&str, String)>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        let resp = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn no_token_is_anonymous() {
        let (app, _, _) = test_app();
        let (status, body) = call(app, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn bearer_token_resolves_user() {
        let (app, user_id, token) = test_app();
        let (_, body) = call(app, Some(("authorization", format!("Bearer {token}")))).await;
        assert_eq!(body, user_id);
    }

    #[tokio::test]
    async fn session_cookie_resolves_user() {
        let (app, user_id, token) = test_app();
        let cookie = format!("theme=dark; {SESSION_COOKIE}={token}");
        let (_, body) = call(app, Some(("cookie", cookie))).await;
        assert_eq!(body, user_id);
    }

    #[tokio::test]
    async fn unknown_token_is_anonymous() {
        let (app, _, _) = test_app();
        let (status, body) =
            call(app, Some(("authorization", "Bearer not-a-session".to_string()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc".parse().unwrap());
        headers.insert("cookie", format!("{SESSION_COOKIE}=xyz").parse().unwrap());
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));

        headers.remove("authorization");
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));

        headers.insert("cookie", format!("{SESSION_COOKIE}_old=zzz").parse().unwrap());
        assert_eq!(session_token(&headers), None);
    }
}
