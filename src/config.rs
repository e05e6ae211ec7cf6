use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{Result, SfError};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

pub const ENV_BIND_ADDR: &str = "SHORTFLIX_ADDR";
pub const ENV_API_URL: &str = "SHORTFLIX_URL";

pub struct AppPaths {
    pub base_dir: PathBuf,
    pub config_file: PathBuf,
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

impl AppPaths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shortflix");
        Self::from_base(base)
    }

    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.toml"),
            base_dir: base,
        }
    }
}

/// Runtime settings. Later sources override earlier ones: built-in
/// defaults, `config.toml`, environment, then command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Result<Self> {
        Self::load_with(paths, |key| std::env::var(key).ok())
    }

    /// Like [`Settings::load`], reading environment variables through `lookup`.
    pub fn load_with(paths: &AppPaths, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self::from_file(&paths.config_file)?.with_env(lookup))
    }

    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .map_err(|e| SfError::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SfError::Io(e)),
        }
    }

    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|s| !s.is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(url) = lookup(ENV_API_URL).filter(|s| !s.is_empty()) {
            self.api_url = url;
        }
        self
    }
}
