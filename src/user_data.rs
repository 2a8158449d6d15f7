//! Personal information document
//!
//! Read fresh from disk on every request so edits show up without a restart.

use std::path::Path;

use crate::error::AppError;

/// Load the whole document as UTF-8 text
pub async fn load(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::error!("Failed to read user data from {}: {}", path.display(), e);
        AppError::UserData(e)
    })
}
