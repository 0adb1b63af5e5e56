pub mod assets;
pub mod checklist;
pub mod iterations;
pub mod plan;
pub mod projects;
pub mod seed;
pub mod session;
pub mod time_logs;

use crate::error::AppError;

/// Run a blocking core call off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> weekend_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(result)
}
