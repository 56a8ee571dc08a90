//! # Runtime Configuration Module
//!
//! Settings for hosting a dispatcher: listen address, request body limit, an optional
//! static directory, the `.env` file and logging.
//!
//! Values come from three layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GYR_ADDR` | `addr` |
//! | `GYR_MAX_BODY_BYTES` | `max_body_bytes` (decimal or `0x` hex) |
//! | `GYR_STATIC_DIR` | `static_dir` |
//! | `GYR_STATIC_PREFIX` | `static_prefix` |
//! | `GYR_ENV_FILE` | `env_file` |
//! | `GYR_LOG_LEVEL`, `GYR_LOG_FORMAT`, `GYR_DEBUG` | `log` |
//!
//! ## Example Configuration
//!
//! ```toml
//! addr = "0.0.0.0:8080"
//! max_body_bytes = 1048576
//! static_dir = "public"
//!
//! [log]
//! level = "debug"
//! format = "json"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::logging::LogConfig;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
/// 1 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_STATIC_PREFIX: &str = "/static";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub addr: String,
    /// Requests with larger bodies are rejected with `413` before dispatch.
    pub max_body_bytes: usize,
    /// Directory served under `static_prefix` when set.
    pub static_dir: Option<PathBuf>,
    pub static_prefix: String,
    /// `.env` file applied at start-up; a missing file is ignored.
    pub env_file: Option<PathBuf>,
    pub log: LogConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            static_dir: None,
            static_prefix: DEFAULT_STATIC_PREFIX.to_owned(),
            env_file: None,
            log: LogConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Parse TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Invalid runtime configuration")
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Overlay the `GYR_*` environment variables. Unparseable numbers are logged and
    /// ignored.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Ok(addr) = env::var("GYR_ADDR") {
            self.addr = addr;
        }
        if let Ok(raw) = env::var("GYR_MAX_BODY_BYTES") {
            match parse_size(&raw) {
                Some(bytes) => self.max_body_bytes = bytes,
                None => warn!(value = %raw, "Ignoring invalid GYR_MAX_BODY_BYTES"),
            }
        }
        if let Some(dir) = env::var_os("GYR_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }
        if let Ok(prefix) = env::var("GYR_STATIC_PREFIX") {
            self.static_prefix = prefix;
        }
        if let Some(file) = env::var_os("GYR_ENV_FILE") {
            self.env_file = Some(PathBuf::from(file));
        }
        self.log = self.log.apply_env();
        self
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.static_prefix, "/static");
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            addr = "0.0.0.0:9000"
            static_dir = "public"

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.addr, "0.0.0.0:9000");
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(RuntimeConfig::from_toml_str("port = 8080").is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gyr.toml");
        fs::write(&path, "max_body_bytes = 16\n").unwrap();
        let config = RuntimeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.max_body_bytes, 16);
        assert!(RuntimeConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("4096"), Some(4096));
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size("lots"), None);
    }
}
