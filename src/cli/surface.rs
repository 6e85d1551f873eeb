//! Terminal rendering of the widget

use std::sync::{Arc, Mutex, PoisonError};

use crate::application::ports::WidgetSurface;
use crate::domain::widget::{UiState, RECORDING_CLASS};

use super::presenter::Presenter;

/// Status shared with the control socket for `status` queries
pub type StatusSnapshot = Arc<Mutex<UiState>>;

/// Widget surface drawn on the terminal.
///
/// The trigger and status line go to stderr; a spinner runs while
/// recording. Every status change is also published to the snapshot.
pub struct TerminalSurface {
    presenter: Presenter,
    trigger_active: bool,
    snapshot: StatusSnapshot,
}

impl TerminalSurface {
    pub fn new(presenter: Presenter) -> Self {
        Self {
            presenter,
            trigger_active: false,
            snapshot: Arc::new(Mutex::new(UiState::Idle)),
        }
    }

    /// Handle for reading the latest status from another task
    pub fn snapshot(&self) -> StatusSnapshot {
        Arc::clone(&self.snapshot)
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn is_trigger_active(&self) -> bool {
        self.trigger_active
    }
}

impl WidgetSurface for TerminalSurface {
    fn set_trigger_active(&mut self, active: bool) {
        if self.trigger_active == active {
            return;
        }
        self.trigger_active = active;
        eprintln!("{}", self.presenter.format_trigger(active, RECORDING_CLASS));
    }

    fn set_status(&mut self, state: &UiState) {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();

        match state {
            UiState::Recording => self.presenter.start_spinner(state.status_text()),
            UiState::Idle => {
                self.presenter.stop_spinner();
                self.presenter.widget_status(state.status_text());
            }
            UiState::Error(message) => {
                self.presenter.stop_spinner();
                self.presenter.error(message);
            }
        }
    }
}
