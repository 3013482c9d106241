pub mod auth;
pub mod cart;
pub mod chat;
pub mod dto;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod offers;
pub mod products;
pub mod profiles;
pub mod reviews;
pub mod uploads;
pub mod wishlist;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::error;

use trove_assistant::Assistant;
use trove_db::Database;

pub use error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub assistant: Assistant,
    pub upload_dir: PathBuf,
}

/// Run a database closure off the async runtime. All rusqlite work goes
/// through here so blocking queries never stall the executor.
pub(crate) async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> trove_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
