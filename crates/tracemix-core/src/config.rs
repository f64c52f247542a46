//! Configuration types for tracemix.
//!
//! [`Config::load`] reads `~/.config/tracemix/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] reads an
//! explicit file on top of the same defaults. [`Config::defaults`] returns the
//! defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::export::OutputFormat;
use crate::types::LabelStyle;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[merge]
queue_capacity = 64

[window]
stop_at_end = true

[output]
format = "text"
label  = "path"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/tracemix/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[merge]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    /// Items buffered between two stages. 0 hands each item over directly.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize { 64 }

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// `[window]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    /// Stop reading every source at the first record past the window end.
    #[serde(default = "default_stop_at_end")]
    pub stop_at_end: bool,
}

fn default_stop_at_end() -> bool { true }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            stop_at_end: default_stop_at_end(),
        }
    }
}

/// `[output]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub label: LabelStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/tracemix/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::layered(Some(&path), false)
    }

    /// Load an explicit config file on top of the built-in defaults. The file
    /// must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Self::layered(Some(path), true)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        Self::layered(None, false).expect("built-in default config must deserialize correctly")
    }

    fn layered(path: Option<&Path>, required: bool) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(required));
        }
        builder.build()?.try_deserialize().map_err(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("tracemix")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
