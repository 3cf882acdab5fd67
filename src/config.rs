use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "segmentable.toml";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ZOOM_SCALE_PERCENT: f32 = 180.0;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the review server, without trailing path.
    pub server_url: String,
    /// Cookie header sent by the browser session, e.g. `csrftoken=...; sessionid=...`.
    pub cookie: Option<String>,
    pub zoom_scale_percent: f32,
    pub request_timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Host-supplied document manifest to open on start.
    pub manifest: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: DEFAULT_SERVER_URL.to_string(),
            cookie: None,
            zoom_scale_percent: DEFAULT_ZOOM_SCALE_PERCENT,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: None,
            manifest: None,
        }
    }
}

impl Config {
    /// Zero means "use the default".
    pub fn request_timeout(&self) -> Duration {
        if self.request_timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(self.request_timeout_secs)
        }
    }

    pub fn user_agent(&self) -> String {
        match &self.user_agent {
            Some(agent) if !agent.is_empty() => agent.clone(),
            _ => format!("incident-segmenter/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn server_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}

pub fn parse_config(contents: &str, origin: &str) -> Result<Config> {
    toml::from_str::<Config>(contents).map_err(|source| Error::Config {
        path: origin.to_string(),
        source,
    })
}

/// Loads the config file, falling back to defaults when it does not exist.
pub fn load_config_from_file(file_path: &Path) -> Result<Config> {
    if !file_path.exists() {
        tracing::debug!(path = %file_path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(file_path).map_err(|source| Error::Io {
        path: file_path.display().to_string(),
        source,
    })?;
    parse_config(&contents, &file_path.display().to_string())
}
