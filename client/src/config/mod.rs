use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_TOKEN_PATH: &str = ".rave/auth_token";

/// Fixed prefix every REST route lives under.
pub const API_BASE_PATH: &str = "/api/v1";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_EVENT_LOAD_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_STALE_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub geocode_url: String,
    pub token_path: PathBuf,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub event_load_timeout: Duration,
    pub cache_stale_time: Duration,
}

impl Config {
    /// Loads `.env` from the working directory (or a parent) if there is
    /// one, then reads the environment. Variables already set win.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Config: Could not load .env: {}", e);
            }
        }
        Self::read_env()
    }

    /// Like [`Self::from_env`], with the dotenv file at `path`.
    pub fn from_env_file(path: impl AsRef<Path>) -> Self {
        if let Err(e) = dotenvy::from_path(path.as_ref()) {
            tracing::warn!("Config: Could not load {}: {}", path.as_ref().display(), e);
        }
        Self::read_env()
    }

    fn read_env() -> Self {
        Self {
            api_url: env::var("RAVE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            geocode_url: env::var("RAVE_GEOCODE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODE_URL.to_string()),
            token_path: env::var("RAVE_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_PATH)),
            request_timeout: secs_from_env("RAVE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            upload_timeout: secs_from_env("RAVE_UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS),
            event_load_timeout: secs_from_env(
                "RAVE_EVENT_LOAD_TIMEOUT_SECS",
                DEFAULT_EVENT_LOAD_TIMEOUT_SECS,
            ),
            cache_stale_time: secs_from_env("RAVE_CACHE_STALE_SECS", DEFAULT_CACHE_STALE_SECS),
        }
    }

    /// Config pointing at `api_url` with every other field at its default.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Full URL of the versioned REST API, without a trailing slash.
    pub fn api_base(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), API_BASE_PATH)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            event_load_timeout: Duration::from_secs(DEFAULT_EVENT_LOAD_TIMEOUT_SECS),
            cache_stale_time: Duration::from_secs(DEFAULT_CACHE_STALE_SECS),
        }
    }
}

fn secs_from_env(key: &str, default: u64) -> Duration {
    let secs = match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Config: Invalid value '{}' for {}: {}", raw, key, e);
                default
            }
        },
        Err(_) => default,
    };
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_appends_version_prefix() {
        let config = Config::with_api_url("https://api.rave.example/");
        assert_eq!(config.api_base(), "https://api.rave.example/api/v1");
    }

    #[test]
    fn test_invalid_timeout_falls_back_to_default() {
        std::env::set_var("RAVE_TEST_BOGUS_SECS", "soon");
        assert_eq!(
            secs_from_env("RAVE_TEST_BOGUS_SECS", 7),
            Duration::from_secs(7)
        );
        std::env::set_var("RAVE_TEST_VALID_SECS", " 12 ");
        assert_eq!(
            secs_from_env("RAVE_TEST_VALID_SECS", 7),
            Duration::from_secs(12)
        );
    }

    #[test]
    fn test_env_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "RAVE_GEOCODE_URL=http://geo.test\nRAVE_EVENT_LOAD_TIMEOUT_SECS=3\n",
        )
        .unwrap();

        let config = Config::from_env_file(&path);
        assert_eq!(config.geocode_url, "http://geo.test");
        assert_eq!(config.event_load_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.cache_stale_time, Duration::from_secs(60));
        assert_eq!(config.token_path, PathBuf::from(DEFAULT_TOKEN_PATH));
    }
}
