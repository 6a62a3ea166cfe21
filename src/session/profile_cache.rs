//! Cached copy of the signed-in user's profile.
//!
//! Stored as JSON beside the settings file so a restart with a valid token
//! does not need a network round trip before the app is usable.

use std::path::PathBuf;

use thiserror::Error;

use crate::{api::auth::User, app_dirs};

const PROFILE_FILE_NAME: &str = "profile.json";

#[derive(Debug, Error)]
pub enum ProfileCacheError {
    #[error("App dir error: {0}")]
    AppDir(#[from] app_dirs::AppDirError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid cached profile: {0}")]
    Parse(#[from] serde_json::Error),
}

fn profile_path() -> Result<PathBuf, ProfileCacheError> {
    Ok(app_dirs::app_root_dir()?.join(PROFILE_FILE_NAME))
}

/// Load the cached profile, `None` when no cache exists.
pub fn load() -> Result<Option<User>, ProfileCacheError> {
    let path = profile_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read(path)?;
    Ok(Some(serde_json::from_slice(&data)?))
}

/// Write the profile cache, replacing any previous contents.
pub fn store(user: &User) -> Result<(), ProfileCacheError> {
    let path = profile_path()?;
    let data = serde_json::to_vec_pretty(user)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Remove the cache. Missing files are fine.
pub fn delete() -> Result<(), ProfileCacheError> {
    let path = profile_path()?;
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
