use crate::config::Config;
use crate::errors::LunarError;
use crate::lunar::UpstreamConverter;
use crate::models::LunarCache;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub cache: Arc<Mutex<LunarCache>>,
    pub converter: UpstreamConverter,
}

impl AppState {
    pub fn new(config: &Config, cache: LunarCache) -> Result<Self, LunarError> {
        Ok(Self {
            data_path: config.data_path.clone(),
            cache: Arc::new(Mutex::new(cache)),
            converter: UpstreamConverter::new(config)?,
        })
    }
}
