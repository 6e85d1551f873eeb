//! Control signals for the widget loop

use colored::Colorize;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use crate::domain::widget::ReleaseTrigger;

/// Commands delivered to the widget loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetSignal {
    /// Trigger pressed
    Press,
    /// Press ended by one of the release gestures
    Release(ReleaseTrigger),
    /// Shutdown widget (SIGINT/SIGTERM)
    Shutdown,
}

/// Widget signal handler
///
/// Handles OS shutdown signals (SIGINT/SIGTERM) and provides a channel
/// for receiving widget commands from other sources (e.g., socket server).
pub struct WidgetSignalHandler {
    receiver: mpsc::Receiver<WidgetSignal>,
}

impl WidgetSignalHandler {
    /// Create a new signal handler and start listening for shutdown signals.
    ///
    /// Returns the handler and a sender that other sources (like the
    /// socket server) use to send commands to the widget loop.
    pub async fn new() -> Result<(Self, mpsc::Sender<WidgetSignal>), std::io::Error> {
        let (tx, rx) = mpsc::channel(16);

        let tx_int = tx.clone();
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            sigint.recv().await;
            eprintln!("{} Received SIGINT (shutdown)", "↓".cyan());
            let _ = tx_int.send(WidgetSignal::Shutdown).await;
        });

        let tx_term = tx.clone();
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            sigterm.recv().await;
            eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
            let _ = tx_term.send(WidgetSignal::Shutdown).await;
        });

        Ok((Self { receiver: rx }, tx))
    }

    /// Build a handler fed only by the returned sender
    pub fn detached() -> (Self, mpsc::Sender<WidgetSignal>) {
        let (tx, rx) = mpsc::channel(16);
        (Self { receiver: rx }, tx)
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<WidgetSignal> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_signal_equality() {
        assert_eq!(WidgetSignal::Press, WidgetSignal::Press);
        assert_ne!(
            WidgetSignal::Release(ReleaseTrigger::PointerUp),
            WidgetSignal::Release(ReleaseTrigger::WindowBlur)
        );
    }

    #[tokio::test]
    async fn detached_handler_receives_in_order() {
        let (mut handler, tx) = WidgetSignalHandler::detached();
        tx.send(WidgetSignal::Press).await.unwrap();
        tx.send(WidgetSignal::Release(ReleaseTrigger::PointerCancel))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(handler.recv().await, Some(WidgetSignal::Press));
        assert_eq!(
            handler.recv().await,
            Some(WidgetSignal::Release(ReleaseTrigger::PointerCancel))
        );
        assert_eq!(handler.recv().await, None);
    }
}
