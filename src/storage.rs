use crate::errors::AppError;
use crate::models::LunarCache;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_cache(path: &Path) -> LunarCache {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(cache) => cache,
            Err(err) => {
                error!("failed to parse lunar cache file: {err}");
                LunarCache::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => LunarCache::default(),
        Err(err) => {
            error!("failed to read lunar cache file: {err}");
            LunarCache::default()
        }
    }
}

pub async fn persist_cache(path: &Path, cache: &LunarCache) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(cache).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
