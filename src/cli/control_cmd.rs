//! Control command handler - sends gestures to the running widget

use super::args::ControlAction;
use super::presenter::Presenter;
use super::socket::{SocketPath, WidgetSocketClient};

/// Handle control subcommand
pub async fn handle_control_command(
    action: ControlAction,
    presenter: &Presenter,
) -> Result<(), String> {
    send_control(action, &WidgetSocketClient::new(SocketPath::new()), presenter).await
}

/// Send `action` through `client` and report the reply
pub async fn send_control(
    action: ControlAction,
    client: &WidgetSocketClient,
    presenter: &Presenter,
) -> Result<(), String> {
    if !client.is_widget_running() {
        return Err("No widget running. Start with: hold-record".to_string());
    }

    let cmd = action.as_command();
    let response = client
        .send_command(cmd)
        .await
        .map_err(|e| format!("Failed to communicate with widget: {}", e))?;

    let response = response.trim();

    match action {
        ControlAction::Status => presenter.output(response),
        _ => {
            if let Some(stripped) = response.strip_prefix("error:") {
                return Err(stripped.trim().to_string());
            }
            presenter.info(&format!("Command sent: {}", cmd));
        }
    }

    Ok(())
}
