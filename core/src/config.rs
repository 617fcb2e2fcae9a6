//! Bridge configuration (~/.config/Easel/config.toml)
//!
//! Handles loading, saving, and providing defaults for bridge settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use easel_shared::constants::{DEFAULT_REFRESH_RATE, MAX_CANVAS_SIDE, MAX_CSTRING_SCAN};

/// Bridge configuration.
///
/// Every section defaults independently, so a partial file is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Execution limits and pacing
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// System-call shim behavior
    #[serde(default)]
    pub shim: ShimConfig,
    /// Message framing between the two threads
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

/// Execution limits and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Refresh rate used by hosts without a real display (default: 60)
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u32,
    /// Maximum module linear memory in bytes (default: 64 MiB)
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,
    /// How long a host waits for `initialize` before giving up (default: 5000)
    #[serde(default = "default_init_timeout_ms")]
    pub init_timeout_ms: u64,
    /// Largest canvas width or height the host will allocate (default: 8192)
    #[serde(default = "default_max_canvas_side")]
    pub max_canvas_side: u32,
}

/// System-call shim behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Upper bound on a NUL-terminated string scan (default: 1024)
    #[serde(default = "default_max_cstring_len")]
    pub max_cstring_len: usize,
    /// Forward module stdout/stderr to the log (default: true)
    #[serde(default = "default_true")]
    pub log_stdio: bool,
}

/// Message framing between the two threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Send one `multiple` message per frame instead of one message per
    /// command (default: true)
    #[serde(default = "default_true")]
    pub batch_commands: bool,
    /// Log every message in its JSON wire form at trace level (default: false)
    #[serde(default)]
    pub trace_messages: bool,
}

fn default_refresh_rate() -> u32 {
    DEFAULT_REFRESH_RATE
}

fn default_memory_limit() -> usize {
    64 * 1024 * 1024
}

fn default_init_timeout_ms() -> u64 {
    5000
}

fn default_max_canvas_side() -> u32 {
    MAX_CANVAS_SIDE
}

fn default_max_cstring_len() -> usize {
    MAX_CSTRING_SCAN
}

fn default_true() -> bool {
    true
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            refresh_rate: default_refresh_rate(),
            memory_limit: default_memory_limit(),
            init_timeout_ms: default_init_timeout_ms(),
            max_canvas_side: default_max_canvas_side(),
        }
    }
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            max_cstring_len: default_max_cstring_len(),
            log_stdio: default_true(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            batch_commands: default_true(),
            trace_messages: false,
        }
    }
}

/// Errors reading an explicit configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Easel\config`
/// On macOS: `~/Library/Application Support/io.easel.Easel`
/// On Linux: `~/.config/Easel`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.easel", "", "Easel")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> BridgeConfig {
    config_dir()
        .and_then(|dir| std::fs::read_to_string(dir.join("config.toml")).ok())
        .and_then(|content| match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring malformed config.toml: {}", e);
                None
            }
        })
        .unwrap_or_default()
}

/// Loads the configuration from an explicit path.
///
/// Unlike [`load`], a missing or malformed file is an error: the caller
/// asked for this file by name.
pub fn load_from(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &BridgeConfig) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        save_to(config, &dir.join("config.toml"))?;
    }
    Ok(())
}

/// Saves the configuration to an explicit path.
pub fn save_to(config: &BridgeConfig, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, content)
}
