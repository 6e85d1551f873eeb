//! Application configuration value object

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidLogLevel;

/// ffmpeg executable used when none is configured
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Log level used when none is configured
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warn;

/// Log verbosity accepted in config and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = InvalidLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(InvalidLogLevel {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub downloads_dir: Option<String>,
    pub ffmpeg_path: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Create config with default values.
    ///
    /// `downloads_dir` stays unset here; it depends on the host and is
    /// resolved by the caller.
    pub fn defaults() -> Self {
        Self {
            downloads_dir: None,
            ffmpeg_path: Some(DEFAULT_FFMPEG_PATH.to_string()),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            downloads_dir: other.downloads_dir.or(self.downloads_dir),
            ffmpeg_path: other.ffmpeg_path.or(self.ffmpeg_path),
            log_level: other.log_level.or(self.log_level),
        }
    }

    /// Get the downloads directory, or `fallback` if not set
    pub fn downloads_dir_or(&self, fallback: PathBuf) -> PathBuf {
        self.downloads_dir
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(fallback)
    }

    /// Get the ffmpeg executable, or "ffmpeg" if not set
    pub fn ffmpeg_path_or_default(&self) -> &str {
        self.ffmpeg_path
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_FFMPEG_PATH)
    }

    /// Get log level as parsed LogLevel, or default if not set/invalid
    pub fn log_level_or_default(&self) -> LogLevel {
        self.log_level
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
