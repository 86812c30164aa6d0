use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use hoard_store::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server configuration.
///
/// Loaded from TOML, then overridden by `HOARD_*` environment variables.
/// Missing keys fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StoreConfig,
    /// Upper bound on an upload request body, in bytes.
    pub max_file_size: u64,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            storage: StoreConfig::default(),
            max_file_size: 3_000_000,
            request_timeout_secs: 15,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> ServerResult<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn apply_env_from<F>(mut self, lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOARD_LISTEN") {
            self.bind_addr = parse_var("HOARD_LISTEN", &v)?;
        }
        if let Some(v) = lookup("HOARD_ROOT") {
            self.storage.root = PathBuf::from(v);
        }
        if let Some(v) = lookup("HOARD_MAX_FILE_SIZE") {
            self.max_file_size = parse_var("HOARD_MAX_FILE_SIZE", &v)?;
        }
        if let Some(v) = lookup("HOARD_REQUEST_TIMEOUT") {
            self.request_timeout_secs = parse_var("HOARD_REQUEST_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("HOARD_NESTED_DEPTH") {
            self.storage.depth = parse_var("HOARD_NESTED_DEPTH", &v)?;
        }
        if let Some(v) = lookup("HOARD_SEGMENT_LEN") {
            self.storage.segment_len = parse_var("HOARD_SEGMENT_LEN", &v)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> ServerResult<()> {
        self.storage
            .sharding()
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        if self.max_file_size == 0 {
            return Err(ServerError::Config("max_file_size must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ServerError::Config(
                "request_timeout_secs must be positive".into(),
            ));
        }
        for (name, mode) in [
            ("file_mode", self.storage.file_mode),
            ("dir_mode", self.storage.dir_mode),
        ] {
            if mode > 0o7777 {
                return Err(ServerError::Config(format!("{name} {mode:#o} is out of range")));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Body limit in the form `DefaultBodyLimit` expects.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_file_size).unwrap_or(usize::MAX)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> ServerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ServerError::Config(format!("invalid value for {name}: {value:?}")))
}
