//! Interaction binder: press-and-hold gesture to recording lifecycle

use tracing::{debug, error, info};

use crate::domain::widget::{ReleaseTrigger, UiState};

use super::ports::{
    CaptureEngine, CaptureError, Clock, DownloadLink, DownloadSink, RecorderEvent, WidgetSurface,
};
use super::recording::RecordingController;

/// Release listeners armed for one press.
///
/// Taken by the first release trigger; later triggers find nothing armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReleaseListeners;

/// Binds the trigger's press gesture to a [`RecordingController`] and
/// mirrors the outcome onto a [`WidgetSurface`].
pub struct InteractionBinder<E, D, C, S>
where
    E: CaptureEngine,
    D: DownloadSink<E::Fragment>,
    C: Clock,
    S: WidgetSurface,
{
    controller: RecordingController<E, D, C>,
    surface: S,
    ui: UiState,
    pressed: bool,
    release: Option<ReleaseListeners>,
}

impl<E, D, C, S> InteractionBinder<E, D, C, S>
where
    E: CaptureEngine,
    D: DownloadSink<E::Fragment>,
    C: Clock,
    S: WidgetSurface,
{
    /// Create a binder and paint the initial idle state
    pub fn new(controller: RecordingController<E, D, C>, mut surface: S) -> Self {
        let ui = UiState::Idle;
        surface.set_trigger_active(false);
        surface.set_status(&ui);
        Self {
            controller,
            surface,
            ui,
            pressed: false,
            release: None,
        }
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    /// Whether the trigger is shown as held
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether a release trigger would currently act
    pub fn is_release_armed(&self) -> bool {
        self.release.is_some()
    }

    pub fn controller(&self) -> &RecordingController<E, D, C> {
        &self.controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// First half of a press: show the trigger as active.
    ///
    /// Returns `false` if the trigger is already held, in which case the
    /// press is ignored.
    pub fn press_started(&mut self) -> bool {
        if self.pressed {
            debug!("press ignored, trigger already held");
            return false;
        }
        self.pressed = true;
        self.surface.set_trigger_active(true);
        true
    }

    /// Second half of a press: the capture session request has settled.
    pub fn capture_ready(&mut self, outcome: Result<&E::Source, CaptureError>) {
        let source = match outcome {
            Ok(source) => source,
            Err(e) => {
                error!("Error accessing microphone: {}", e);
                self.fail(e);
                return;
            }
        };

        if let Err(e) = self.controller.start(source) {
            error!("Error starting capture: {}", e);
            self.fail(e);
            return;
        }

        self.release = Some(ReleaseListeners);
        self.set_ui(UiState::Recording);
    }

    /// Drop a press whose capture session request never settled
    pub fn abandon_press(&mut self) {
        if !self.pressed || self.release.is_some() {
            return;
        }
        debug!("Abandoning press before the microphone was ready");
        self.pressed = false;
        self.surface.set_trigger_active(false);
        self.set_ui(UiState::Idle);
    }

    /// Handle pointer-up, pointer-cancel or window-blur.
    ///
    /// Only the first trigger after a successful press acts; returns
    /// whether this one did.
    pub fn release(&mut self, trigger: ReleaseTrigger) -> bool {
        if self.release.take().is_none() {
            debug!("{} ignored, no release armed", trigger);
            return false;
        }

        info!("Released via {}", trigger);
        self.pressed = false;
        self.surface.set_trigger_active(false);
        self.controller.stop();
        self.set_ui(UiState::Idle);
        true
    }

    /// Forward an engine notification to the controller.
    ///
    /// Returns the link of a freshly downloaded artifact.
    pub async fn handle_recorder_event(
        &mut self,
        event: RecorderEvent<E::Fragment>,
    ) -> Option<DownloadLink> {
        let was_recording = self.controller.is_recording();
        let result = self.controller.handle_event(event).await;

        if was_recording && !self.controller.is_recording() {
            // Capture died under a held trigger
            self.release = None;
            self.pressed = false;
            self.surface.set_trigger_active(false);
            self.set_ui(UiState::Idle);
        }

        match result {
            Ok(link) => link,
            Err(e) => {
                error!("Download failed: {}", e);
                self.set_ui(UiState::Error(e.to_string()));
                None
            }
        }
    }

    fn fail(&mut self, e: CaptureError) {
        self.pressed = false;
        self.surface.set_trigger_active(false);
        self.set_ui(UiState::Error(e.to_string()));
    }

    fn set_ui(&mut self, ui: UiState) {
        self.surface.set_status(&ui);
        self.ui = ui;
    }
}
