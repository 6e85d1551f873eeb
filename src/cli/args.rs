//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::widget::ReleaseTrigger;

/// hold-record - press and hold to record, release to save
#[derive(Parser, Debug)]
#[command(name = "hold-record")]
#[command(version)]
#[command(about = "Press-and-hold microphone recorder that saves each take as a file")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory finished recordings are saved into
    #[arg(long, value_name = "DIR", env = "HOLD_RECORD_DOWNLOADS_DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// ffmpeg executable used to encode recordings
    #[arg(long, value_name = "PATH", env = "HOLD_RECORD_FFMPEG")]
    pub ffmpeg: Option<String>,

    /// Log verbosity (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send a gesture or query to the running widget
    Control {
        #[command(subcommand)]
        action: ControlAction,
    },
}

/// Widget control actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Press the trigger (start recording)
    Press,
    /// Release the trigger (stop and save)
    Release,
    /// Cancel the press (stops and saves like release)
    Cancel,
    /// Focus lost (stops and saves like release)
    Blur,
    /// Show widget status
    Status,
}

impl ControlAction {
    /// Command line sent over the control socket
    pub const fn as_command(&self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
            Self::Cancel => "cancel",
            Self::Blur => "blur",
            Self::Status => "status",
        }
    }

    /// Parse a command line received over the control socket
    pub fn from_command(line: &str) -> Option<Self> {
        match line.trim() {
            "press" => Some(Self::Press),
            "release" => Some(Self::Release),
            "cancel" => Some(Self::Cancel),
            "blur" => Some(Self::Blur),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Gesture that ends a press, if this action is one
    pub const fn release_trigger(&self) -> Option<ReleaseTrigger> {
        match self {
            Self::Release => Some(ReleaseTrigger::PointerUp),
            Self::Cancel => Some(ReleaseTrigger::PointerCancel),
            Self::Blur => Some(ReleaseTrigger::WindowBlur),
            Self::Press | Self::Status => None,
        }
    }
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Resolved options for running the widget
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub downloads_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["downloads_dir", "ffmpeg_path", "log_level"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::try_parse_from(["hold-record"]).unwrap();
        assert!(cli.log_level.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_options() {
        let cli = Cli::parse_from([
            "hold-record",
            "--downloads-dir",
            "/tmp/takes",
            "--ffmpeg",
            "/opt/bin/ffmpeg",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.downloads_dir, Some(PathBuf::from("/tmp/takes")));
        assert_eq!(cli.ffmpeg, Some("/opt/bin/ffmpeg".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn cli_parses_control_actions() {
        for (arg, expected) in [
            ("press", ControlAction::Press),
            ("release", ControlAction::Release),
            ("cancel", ControlAction::Cancel),
            ("blur", ControlAction::Blur),
            ("status", ControlAction::Status),
        ] {
            let cli = Cli::parse_from(["hold-record", "control", arg]);
            match cli.command {
                Some(Commands::Control { action }) => {
                    assert_eq!(action, expected);
                    assert_eq!(action.as_command(), arg);
                    assert_eq!(ControlAction::from_command(arg), Some(action));
                }
                other => panic!("Expected control command, got {:?}", other),
            }
        }
    }

    #[test]
    fn release_like_actions_map_to_triggers() {
        assert_eq!(
            ControlAction::Release.release_trigger(),
            Some(ReleaseTrigger::PointerUp)
        );
        assert_eq!(
            ControlAction::Cancel.release_trigger(),
            Some(ReleaseTrigger::PointerCancel)
        );
        assert_eq!(
            ControlAction::Blur.release_trigger(),
            Some(ReleaseTrigger::WindowBlur)
        );
        assert_eq!(ControlAction::Press.release_trigger(), None);
        assert_eq!(ControlAction::Status.release_trigger(), None);
    }

    #[test]
    fn socket_command_lines_are_trimmed() {
        assert_eq!(
            ControlAction::from_command(" blur\n"),
            Some(ControlAction::Blur)
        );
        assert_eq!(ControlAction::from_command("toggle"), None);
        assert_eq!(ControlAction::from_command(""), None);
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["hold-record", "config", "set", "ffmpeg_path", "/usr/bin/ffmpeg"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "ffmpeg_path");
            assert_eq!(value, "/usr/bin/ffmpeg");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("downloads_dir"));
        assert!(is_valid_config_key("ffmpeg_path"));
        assert!(is_valid_config_key("log_level"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
