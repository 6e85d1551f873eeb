//! Shared app setup: exit codes, config merging, logging

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, LogLevel};

use super::args::{Cli, WidgetOptions};
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Directory used when neither config nor the platform names one
const FALLBACK_DOWNLOADS_DIR: &str = "downloads";

/// Build the CLI layer of the config from parsed args
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        downloads_dir: cli
            .downloads_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        ffmpeg_path: cli.ffmpeg.clone(),
        log_level: cli.log_level.clone(),
    }
}

/// Load and merge configuration: defaults < file < CLI (env is read by clap)
pub async fn load_merged_config<S: ConfigStore>(
    store: &S,
    cli_config: AppConfig,
    presenter: &Presenter,
) -> AppConfig {
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            presenter.warn(&format!("Ignoring config file: {}", e));
            AppConfig::empty()
        }
    };

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Resolve widget options from a merged config
pub fn widget_options(config: &AppConfig) -> WidgetOptions {
    let fallback = dirs::download_dir().unwrap_or_else(|| PathBuf::from(FALLBACK_DOWNLOADS_DIR));
    WidgetOptions {
        downloads_dir: config.downloads_dir_or(fallback),
        ffmpeg_path: PathBuf::from(config.ffmpeg_path_or_default()),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `level`.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hold_record={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
