//! hold-record CLI entry point

use std::process::ExitCode;

use clap::Parser;

use hold_record::cli::{
    app::{
        cli_config, init_logging, load_merged_config, widget_options, EXIT_ERROR,
        EXIT_USAGE_ERROR,
    },
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    handle_control_command, run_widget,
    presenter::Presenter,
};
use hold_record::domain::config::{LogLevel, DEFAULT_LOG_LEVEL};
use hold_record::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    match cli.command {
        Some(Commands::Config { action }) => {
            init_logging(DEFAULT_LOG_LEVEL);
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Control { action }) => {
            init_logging(DEFAULT_LOG_LEVEL);
            if let Err(e) = handle_control_command(action, &presenter).await {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    if let Some(level) = cli.log_level.as_deref() {
        if let Err(e) = level.parse::<LogLevel>() {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    }

    let store = XdgConfigStore::new();
    let config = load_merged_config(&store, cli_config(&cli), &presenter).await;
    init_logging(config.log_level_or_default());

    run_widget(widget_options(&config)).await
}
