//! CLI layer - Command-line interface
//!
//! Contains argument parsing, terminal rendering, signal handling,
//! the control socket and the widget runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod control_cmd;
pub mod pid_file;
pub mod presenter;
pub mod signals;
pub mod socket;
pub mod surface;
pub mod widget_app;

// Re-export commonly used types
pub use app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, ControlAction, WidgetOptions};
pub use control_cmd::handle_control_command;
pub use presenter::Presenter;
pub use widget_app::run_widget;
