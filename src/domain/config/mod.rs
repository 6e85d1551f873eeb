//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, LogLevel, DEFAULT_FFMPEG_PATH, DEFAULT_LOG_LEVEL};
