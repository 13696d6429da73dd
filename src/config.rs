use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://api.themoviedb.org/3";

pub const ENV_API_KEY: &str = "CINEGRID_API_KEY";
pub const ENV_BASE_URL: &str = "CINEGRID_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "CINEGRID_TIMEOUT_MS";

/// On-disk form; every key optional.
#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct FileConfig {
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    #[serde(default)]
    pub(crate) timeout_ms: Option<u64>,
}

/// Resolved catalog settings.
#[derive(Clone)]
pub struct CatalogConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    /// `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

// Keep the credential out of logs and panics.
impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            api_key: None,
            timeout: None,
        }
    }
}

impl CatalogConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: Some(api_key.into()), ..Self::default() }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Defaults, then the config file, then `CINEGRID_*` environment variables.
    /// With no explicit path the project config dir's `config.toml` is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) if path.is_some() || p.exists() => read_file(&p)?,
            _ => FileConfig::default(),
        };
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self::resolve(file, env(ENV_API_KEY), env(ENV_BASE_URL), env(ENV_TIMEOUT_MS))
    }

    pub(crate) fn resolve(
        file: FileConfig,
        env_api_key: Option<String>,
        env_base_url: Option<String>,
        env_timeout_ms: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(base) = env_base_url.or(file.base_url) {
            cfg.base_url = parse_base_url(&base)?;
        }
        cfg.api_key = env_api_key.or(file.api_key).map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        let timeout_ms = match env_timeout_ms {
            Some(v) => Some(v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue { name: ENV_TIMEOUT_MS, value: v })?),
            None => file.timeout_ms,
        };
        cfg.timeout = timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis);
        Ok(cfg)
    }

    /// The credential, required before any request can be built.
    pub fn credential(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingCredential)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "cinegrid", "cinegrid").map(|d| d.config_dir().join("config.toml"))
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    debug!(path = %path.display(), "reading catalog config");
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
}

// Trailing slashes are dropped; ranking paths are appended as path segments.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl { value: value.to_string(), source })?;
    // Ranking paths and the credential are appended to the base, so it must be a plain path.
    if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidValue { name: "base_url", value: value.to_string() });
    }
    Ok(url)
}
