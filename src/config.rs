use std::{env, path::PathBuf, time::Duration};
use tracing::warn;

pub const DEFAULT_UPSTREAM_URL: &str = "https://open.oapi.vn/date/convert-to-lunar";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub upstream_url: String,
    /// Pause between two upstream conversions of the same month.
    pub upstream_delay: Duration,
    pub upstream_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: PathBuf::from("data/lunar_cache.json"),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_delay: Duration::from_millis(200),
            upstream_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            upstream_url: lookup("LUNAR_UPSTREAM_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_delay: parsed(&lookup, "LUNAR_UPSTREAM_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.upstream_delay),
            upstream_timeout: parsed(&lookup, "LUNAR_UPSTREAM_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.upstream_timeout),
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}
