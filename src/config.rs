use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CREDENTIALS_PATH: &str = ".hfrl/credentials.json";
/// Matches the 200ms cadence of the synthetic progress ticker.
const DEFAULT_MOCK_TICK_MS: u64 = 200;

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (no trailing slash).
    pub base_url: String,
    /// Per-request timeout on remote calls. The controller itself enforces
    /// no timeout; this is the transport bound.
    pub request_timeout: Duration,
    /// Path to the credential key-value file.
    pub credentials_path: PathBuf,
    /// Interval between synthetic progress ticks in the mock fallback.
    pub mock_tick: Duration,
}

/// On-disk shape of hub.toml. Every field is optional: missing values fall
/// back to defaults, then env vars override.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    backend_url: Option<String>,
    request_timeout_ms: Option<u64>,
    credentials_path: Option<String>,
    mock_tick_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            mock_tick: Duration::from_millis(DEFAULT_MOCK_TICK_MS),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then hub.toml (path overridable via
    /// HFRL_HUB_CONFIG), then environment variables. A missing file is
    /// normal; a malformed one is logged and skipped.
    pub fn load() -> Self {
        let path = env::var("HFRL_HUB_CONFIG").unwrap_or_else(|_| "hub.toml".to_string());
        let file = match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str::<FileConfig>(&raw) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("ignoring malformed {path}: {e}");
                    FileConfig::default()
                }
            },
            Err(_) => FileConfig::default(),
        };

        let mut config = Config::default();

        if let Some(url) = file.backend_url {
            config.base_url = url;
        }
        if let Some(ms) = file.request_timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(p) = file.credentials_path {
            config.credentials_path = PathBuf::from(p);
        }
        if let Some(ms) = file.mock_tick_ms {
            config.mock_tick = Duration::from_millis(ms);
        }

        if let Ok(url) = env::var("HFRL_BACKEND_URL") {
            config.base_url = url;
        }
        if let Ok(ms) = env::var("HFRL_REQUEST_TIMEOUT_MS") {
            match ms.parse() {
                Ok(ms) => config.request_timeout = Duration::from_millis(ms),
                Err(_) => tracing::warn!("HFRL_REQUEST_TIMEOUT_MS not a number: {ms}"),
            }
        }
        if let Ok(p) = env::var("HFRL_CREDENTIALS_PATH") {
            config.credentials_path = PathBuf::from(p);
        }

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config
    }
}
