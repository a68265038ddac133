pub mod cat;
pub mod info;
pub mod poke;

use crate::error::AppError;

// Store calls do blocking file I/O, keep them off the async workers.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Blocking store task failed: {}", e);
        AppError::Internal
    })
}
