//! Application configuration management.
//!
//! Configuration is stored at `~/.config/fomento-console/config.json`
//! and can be overridden per-setting through `FOMENTO_*` environment
//! variables (a `.env` file is honored at startup).

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/data directory paths
const APP_NAME: &str = "fomento-console";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Backend access tokens live for an hour; the access window tracks that.
const DEFAULT_ACCESS_WINDOW_SECS: i64 = 60 * 60;

/// Absolute session ceiling of one day regardless of activity.
const DEFAULT_MAX_SESSION_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target host for all backend calls.
    pub backend_url: String,
    /// Seals the session record at rest. Plaintext fallback when unset.
    pub session_secret: Option<String>,
    /// How long a session stays usable between accesses.
    pub access_window_secs: i64,
    /// Ceiling on total session lifetime.
    pub max_session_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            session_secret: None,
            access_window_secs: DEFAULT_ACCESS_WINDOW_SECS,
            max_session_secs: DEFAULT_MAX_SESSION_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FOMENTO_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Ok(secret) = std::env::var("FOMENTO_SESSION_SECRET") {
            self.session_secret = Some(secret);
        }
        if let Ok(value) = std::env::var("FOMENTO_ACCESS_WINDOW_SECS") {
            match value.parse() {
                Ok(secs) => self.access_window_secs = secs,
                Err(_) => warn!(value = %value, "ignoring unparseable FOMENTO_ACCESS_WINDOW_SECS"),
            }
        }
        if let Ok(value) = std::env::var("FOMENTO_MAX_SESSION_SECS") {
            match value.parse() {
                Ok(secs) => self.max_session_secs = secs,
                Err(_) => warn!(value = %value, "ignoring unparseable FOMENTO_MAX_SESSION_SECS"),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the durable session record.
    pub fn session_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert!(config.session_secret.is_none());
        assert_eq!(config.access_window_secs, 3600);
        assert_eq!(config.max_session_secs, 86_400);
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"backend_url": "https://api.fomento.example"}"#)
                .expect("parse failed");
        assert_eq!(config.backend_url, "https://api.fomento.example");
        assert_eq!(config.access_window_secs, 3600);
        assert_eq!(config.max_session_secs, 86_400);
    }
}
