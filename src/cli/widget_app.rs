//! Widget app runner

use std::process::ExitCode;
use std::sync::PoisonError;
use std::time::Duration as StdDuration;

use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::application::ports::{
    CaptureEngine, CaptureError, Clock, DownloadLink, DownloadSink, MicrophoneAccess, RecorderEvent,
    WidgetSurface,
};
use crate::application::{CaptureSessionManager, InteractionBinder, RecordingController};
use crate::domain::widget::ReleaseTrigger;
use crate::infrastructure::{CpalMicrophone, DirectoryDownloads, FfmpegCaptureEngine, SystemClock};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::args::WidgetOptions;
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::{WidgetSignal, WidgetSignalHandler};
use super::socket::{SocketPath, WidgetSocketServer};
use super::surface::TerminalSurface;

/// How long shutdown waits for the last recording to be saved
pub const SHUTDOWN_GRACE: StdDuration = StdDuration::from_secs(5);

/// Run the widget until SIGINT/SIGTERM
pub async fn run_widget(options: WidgetOptions) -> ExitCode {
    let presenter = Presenter::new();

    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another widget is already running (PID: {})", pid));
            }
            _ => presenter.error(&e.to_string()),
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let (event_tx, mut events) = mpsc::unbounded_channel();
    let engine = FfmpegCaptureEngine::probe(&options.ffmpeg_path, event_tx).await;
    let downloads = DirectoryDownloads::new(&options.downloads_dir);
    let controller = RecordingController::new(engine, downloads, SystemClock);

    let surface = TerminalSurface::new(Presenter::new());
    let snapshot = surface.snapshot();
    let mut binder = InteractionBinder::new(controller, surface);
    let sessions = CaptureSessionManager::new(CpalMicrophone::new());

    match binder.controller().negotiate_format() {
        Some(format) => info!("Recordings will be encoded as {}", format),
        None => presenter.warn("ffmpeg offers none of the preferred formats, using its default"),
    }

    // Setup signal handler (returns handler + sender for socket server)
    let (mut signals, signal_tx) = match WidgetSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            let _ = pid_file.release();
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let socket_path = SocketPath::new();
    let mut socket_server = WidgetSocketServer::new(socket_path.clone());
    if let Err(e) = socket_server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        let _ = pid_file.release();
        return ExitCode::from(EXIT_ERROR);
    }

    let server = tokio::spawn(async move {
        let _ = socket_server
            .run(signal_tx, move || {
                snapshot.lock().unwrap_or_else(PoisonError::into_inner).clone()
            })
            .await;
    });

    presenter.info(&format!(
        "PID: {} | Socket: {} | Downloads: {}",
        std::process::id(),
        socket_path.path().display(),
        options.downloads_dir.display()
    ));
    presenter.info("Hold with: hold-record control press / release");

    let result = widget_loop(&mut binder, &sessions, &mut signals, &mut events, |link| {
        presenter.download_link(link)
    })
    .await;

    // Dropping the server task drops the server, which removes the socket file
    server.abort();
    let _ = server.await;
    let _ = pid_file.release();

    if result {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// Process gestures and recorder events in arrival order until shutdown.
///
/// Recorder events are handled before gestures that are ready at the same
/// time. While a press waits for the microphone, releases are held back
/// until the request settles and a shutdown abandons it. On shutdown a held
/// trigger is released like a window blur and the loop waits up to
/// [`SHUTDOWN_GRACE`] for the last artifact.
///
/// Returns `false` if the signal channel closed without a shutdown request.
pub async fn widget_loop<E, D, C, S, M, L>(
    binder: &mut InteractionBinder<E, D, C, S>,
    sessions: &CaptureSessionManager<M>,
    signals: &mut WidgetSignalHandler,
    events: &mut mpsc::UnboundedReceiver<RecorderEvent<E::Fragment>>,
    mut on_download: L,
) -> bool
where
    E: CaptureEngine,
    D: DownloadSink<E::Fragment>,
    C: Clock,
    S: WidgetSurface,
    M: MicrophoneAccess<Stream = E::Source>,
    L: FnMut(&DownloadLink),
{
    loop {
        let signal = tokio::select! {
            biased;

            Some(event) = events.recv() => {
                if let Some(link) = binder.handle_recorder_event(event).await {
                    on_download(&link);
                }
                continue;
            }
            signal = signals.recv() => signal,
        };

        let shutdown = match signal {
            Some(WidgetSignal::Press) => {
                if !binder.press_started() {
                    continue;
                }
                match acquire_for_press(sessions, signals).await {
                    Acquisition::Settled { outcome, releases } => {
                        binder.capture_ready(outcome);
                        for trigger in releases {
                            binder.release(trigger);
                        }
                        continue;
                    }
                    Acquisition::Shutdown => {
                        binder.abandon_press();
                        true
                    }
                    Acquisition::Closed => {
                        binder.abandon_press();
                        false
                    }
                }
            }
            Some(WidgetSignal::Release(trigger)) => {
                binder.release(trigger);
                continue;
            }
            Some(WidgetSignal::Shutdown) => true,
            None => false,
        };

        if !shutdown {
            debug!("Signal channel closed");
            return false;
        }

        info!("Shutting down");
        binder.release(ReleaseTrigger::WindowBlur);
        finish_pending(binder, events, &mut on_download).await;
        return true;
    }
}

/// How a pending microphone request ended
enum Acquisition<'a, T> {
    Settled {
        outcome: Result<&'a T, CaptureError>,
        releases: Vec<ReleaseTrigger>,
    },
    Shutdown,
    Closed,
}

/// Wait for the microphone while still listening for gestures.
///
/// A settled request wins over gestures that are ready at the same time.
/// Release gestures received meanwhile are returned so they apply once the
/// press has settled.
async fn acquire_for_press<'a, M>(
    sessions: &'a CaptureSessionManager<M>,
    signals: &mut WidgetSignalHandler,
) -> Acquisition<'a, M::Stream>
where
    M: MicrophoneAccess,
{
    let acquire = sessions.acquire();
    tokio::pin!(acquire);
    let mut releases = Vec::new();

    loop {
        tokio::select! {
            biased;

            outcome = &mut acquire => return Acquisition::Settled { outcome, releases },
            signal = signals.recv() => match signal {
                Some(WidgetSignal::Release(trigger)) => releases.push(trigger),
                Some(WidgetSignal::Press) => debug!("press ignored, microphone request pending"),
                Some(WidgetSignal::Shutdown) => return Acquisition::Shutdown,
                None => return Acquisition::Closed,
            },
        }
    }
}

/// Wait for the engine to confirm the last stop so its artifact is saved
async fn finish_pending<E, D, C, S, L>(
    binder: &mut InteractionBinder<E, D, C, S>,
    events: &mut mpsc::UnboundedReceiver<RecorderEvent<E::Fragment>>,
    on_download: &mut L,
) where
    E: CaptureEngine,
    D: DownloadSink<E::Fragment>,
    C: Clock,
    S: WidgetSurface,
    L: FnMut(&DownloadLink),
{
    let deadline = Instant::now() + SHUTDOWN_GRACE;

    while binder.controller().is_finalizing() {
        match timeout_at(deadline, events.recv()).await {
            Ok(Some(event)) => {
                if let Some(link) = binder.handle_recorder_event(event).await {
                    on_download(&link);
                }
            }
            Ok(None) => break,
            Err(_) => {
                warn!("Gave up waiting for the last recording to finish");
                break;
            }
        }
    }
}
