//! Configuration loading.
//!
//! Core knobs only: grid dimensions, scrollback cap, default shell, and the
//! connect timeout. Everything is optional in the file and falls back to the
//! defaults below.
//!
//! ```toml
//! columns = 120
//! rows = 40
//! scrollback_limit = 5000
//! shell = "/bin/zsh"
//! connect_timeout_secs = 15
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Core configuration. Grid dimensions apply at emulator construction only;
/// changing them later has no effect on existing sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid width in cells.
    pub columns: u16,
    /// Grid height in cells.
    pub rows: u16,
    /// Maximum retained scrollback rows per session.
    pub scrollback_limit: usize,
    /// Shell command for local sessions; defaults to `$SHELL`.
    pub shell: Option<String>,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 24,
            scrollback_limit: 10000,
            shell: None,
            connect_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
