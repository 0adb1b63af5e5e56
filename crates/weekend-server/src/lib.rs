pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Slack on top of the upload limit so oversize files reach the handler and
/// get a precise 413 instead of a bare body-limit rejection.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(app_state.portfolio.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    let mut router = Router::new()
        // Projects
        .route("/api/projects", get(routes::projects::list_projects))
        .route("/api/projects/{number}", get(routes::projects::get_project))
        // Iterations
        .route(
            "/api/iterations",
            post(routes::iterations::create_iteration),
        )
        .route(
            "/api/iterations/{id}",
            get(routes::iterations::get_iteration)
                .patch(routes::iterations::update_iteration)
                .delete(routes::iterations::delete_iteration),
        )
        .route(
            "/api/iterations/{id}/time-logs",
            post(routes::time_logs::create_time_log),
        )
        .route(
            "/api/iterations/{id}/assets",
            post(routes::assets::upload_asset),
        )
        // Checklist
        .route(
            "/api/checklist/{id}/toggle",
            post(routes::checklist::toggle_item),
        )
        // Assets
        .route(
            "/api/assets/{id}",
            patch(routes::assets::update_asset).delete(routes::assets::delete_asset),
        )
        // Plan
        .route("/api/plan/preview", post(routes::plan::preview))
        // Session
        .route("/api/session", get(routes::session::get_session))
        // Seed
        .route("/api/seed", post(routes::seed::seed_projects));

    if let Some(dir) = &app_state.files_dir {
        router = router.nest_service("/files", ServeDir::new(dir));
    }

    router
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::identity_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Open the portfolio under `root` and serve it.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let app_state = state::AppState::open(&root)?;
    let app = build_router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("weekend server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
