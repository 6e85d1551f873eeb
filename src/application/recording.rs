//! Recording controller

use tracing::{debug, info, warn};

use crate::domain::recording::{
    Artifact, EncodingFormat, RecorderState, RecordingId, RecordingSession,
};

use super::ports::{
    CaptureEngine, CaptureError, Clock, DownloadError, DownloadLink, DownloadSink, RecorderEvent,
};

/// Starts and stops capture, collects fragments and turns each finished
/// recording into a download.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> IDLE (stop, or the engine reporting that it halted)
///
/// `start` and `stop` called out of turn are no-ops.
pub struct RecordingController<E, D, C>
where
    E: CaptureEngine,
    D: DownloadSink<E::Fragment>,
    C: Clock,
{
    engine: E,
    downloads: D,
    clock: C,
    state: RecorderState,
    session: Option<RecordingSession<E::Fragment>>,
    next_id: RecordingId,
}

impl<E, D, C> RecordingController<E, D, C>
where
    E: CaptureEngine,
    D: DownloadSink<E::Fragment>,
    C: Clock,
{
    /// Create an idle controller
    pub fn new(engine: E, downloads: D, clock: C) -> Self {
        Self {
            engine,
            downloads,
            clock,
            state: RecorderState::Idle,
            session: None,
            next_id: RecordingId::new(1),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Id of the current session, if any
    pub fn current_recording(&self) -> Option<RecordingId> {
        self.session.as_ref().map(RecordingSession::id)
    }

    /// Fragments collected by the current session
    pub fn fragment_count(&self) -> usize {
        self.session
            .as_ref()
            .map(RecordingSession::fragment_count)
            .unwrap_or(0)
    }

    /// Whether a session is waiting for the engine to confirm it stopped
    pub fn is_finalizing(&self) -> bool {
        self.state == RecorderState::Idle
            && self.session.as_ref().is_some_and(|s| !s.is_active())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn downloads(&self) -> &D {
        &self.downloads
    }

    /// First format in preference order the engine supports
    pub fn negotiate_format(&self) -> Option<EncodingFormat> {
        EncodingFormat::negotiate(|format| self.engine.supports(format))
    }

    /// Begin a new recording against `source`.
    ///
    /// Returns the new recording's id, or `None` if already recording.
    /// Any previous session is discarded first.
    pub fn start(&mut self, source: &E::Source) -> Result<Option<RecordingId>, CaptureError> {
        if self.is_recording() {
            debug!("start ignored, already recording");
            return Ok(None);
        }

        if let Some(previous) = self.session.take() {
            debug!(
                "Discarding session {} with {} fragment(s), {} byte(s)",
                previous.id(),
                previous.fragment_count(),
                previous.size_bytes()
            );
        }

        let id = self.next_id;
        self.next_id = id.next();

        let format = self.negotiate_format();
        match format {
            Some(format) => debug!("Negotiated format {}", format),
            None => debug!("No preferred format supported, using engine default"),
        }

        self.engine.begin(source, id, format)?;

        self.session = Some(RecordingSession::new(id));
        self.state = RecorderState::Recording;
        info!("Recording {} started", id);
        Ok(Some(id))
    }

    /// Ask the engine to halt the current recording.
    ///
    /// Returns whether a recording was running. A failed stop request is
    /// ignored: the engine's stop notification still finalizes the session.
    pub fn stop(&mut self) -> bool {
        if !self.is_recording() {
            debug!("stop ignored, not recording");
            return false;
        }

        if let Err(e) = self.engine.request_stop() {
            debug!("Stop request failed (ignored): {}", e);
        }

        if let Some(session) = self.session.as_mut() {
            session.deactivate();
        }
        self.state = RecorderState::Idle;
        info!("Recording stop requested");
        true
    }

    /// Feed an engine notification to the controller.
    ///
    /// Returns the download link when a stop notification produced an artifact.
    pub async fn handle_event(
        &mut self,
        event: RecorderEvent<E::Fragment>,
    ) -> Result<Option<DownloadLink>, DownloadError> {
        if self.current_recording() != Some(event.recording()) {
            debug!("Dropping event for stale recording {}", event.recording());
            return Ok(None);
        }

        match event {
            RecorderEvent::Fragment { data, .. } => {
                if let Some(session) = self.session.as_mut() {
                    if !session.push(data) {
                        debug!("Discarded empty fragment");
                    }
                }
                Ok(None)
            }
            RecorderEvent::Stopped { mime_type, .. } => self.finalize(mime_type.as_deref()).await,
        }
    }

    async fn finalize(&mut self, mime_type: Option<&str>) -> Result<Option<DownloadLink>, DownloadError> {
        if self.is_recording() {
            warn!("Capture halted without a stop request");
            self.state = RecorderState::Idle;
        }

        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let id = session.id();
        let fragments = session.into_fragments();

        let Some(artifact) = Artifact::assemble(fragments, mime_type, self.clock.now()) else {
            info!("Recording {} captured no audio, nothing to download", id);
            return Ok(None);
        };

        info!(
            "Recording {} finished: {} ({}, {})",
            id,
            artifact.filename(),
            artifact.mime_type(),
            artifact.human_readable_size()
        );
        let link = self.downloads.offer(&artifact).await?;
        Ok(Some(link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Default)]
    struct MockEngine {
        supported: Vec<EncodingFormat>,
        begun: Vec<(RecordingId, Option<EncodingFormat>)>,
        stop_requests: usize,
        fail_begin: bool,
        fail_stop: bool,
    }

    impl CaptureEngine for MockEngine {
        type Source = ();
        type Fragment = Vec<u8>;

        fn supports(&self, format: EncodingFormat) -> bool {
            self.supported.contains(&format)
        }

        fn begin(
            &mut self,
            _source: &(),
            recording: RecordingId,
            format: Option<EncodingFormat>,
        ) -> Result<(), CaptureError> {
            if self.fail_begin {
                return Err(CaptureError::StartFailed("encoder missing".into()));
            }
            self.begun.push((recording, format));
            Ok(())
        }

        fn request_stop(&mut self) -> Result<(), CaptureError> {
            self.stop_requests += 1;
            if self.fail_stop {
                return Err(CaptureError::StopFailed("already stopped".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryDownloads {
        saved: Vec<(String, String, Vec<u8>)>,
    }

    #[async_trait]
    impl DownloadSink<Vec<u8>> for MemoryDownloads {
        async fn offer(&mut self, artifact: &Artifact<Vec<u8>>) -> Result<DownloadLink, DownloadError> {
            self.saved.push((
                artifact.filename().to_string(),
                artifact.mime_type().to_string(),
                artifact.to_bytes(),
            ));
            Ok(DownloadLink::new(artifact.filename(), "memory"))
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
        }
    }

    fn controller(engine: MockEngine) -> RecordingController<MockEngine, MemoryDownloads, FixedClock> {
        RecordingController::new(engine, MemoryDownloads::default(), FixedClock)
    }

    fn fragment(id: RecordingId, data: &[u8]) -> RecorderEvent<Vec<u8>> {
        RecorderEvent::Fragment {
            recording: id,
            data: data.to_vec(),
        }
    }

    fn stopped(id: RecordingId, mime: Option<&str>) -> RecorderEvent<Vec<u8>> {
        RecorderEvent::Stopped {
            recording: id,
            mime_type: mime.map(str::to_string),
        }
    }

    #[test]
    fn new_controller_is_idle() {
        let controller = controller(MockEngine::default());
        assert_eq!(controller.state(), RecorderState::Idle);
        assert!(controller.current_recording().is_none());
        assert_eq!(controller.fragment_count(), 0);
    }

    #[test]
    fn start_negotiates_best_supported_format() {
        let mut controller = controller(MockEngine {
            supported: vec![EncodingFormat::Ogg, EncodingFormat::OggOpus],
            ..Default::default()
        });

        let id = controller.start(&()).unwrap().unwrap();
        assert!(controller.is_recording());
        assert_eq!(controller.engine().begun, vec![(id, Some(EncodingFormat::OggOpus))]);
    }

    #[test]
    fn start_uses_engine_default_when_nothing_supported() {
        let mut controller = controller(MockEngine::default());
        controller.start(&()).unwrap();
        assert_eq!(controller.engine().begun[0].1, None);
    }

    #[test]
    fn start_while_recording_is_noop() {
        let mut controller = controller(MockEngine::default());
        assert!(controller.start(&()).unwrap().is_some());
        assert!(controller.start(&()).unwrap().is_none());
        assert_eq!(controller.engine().begun.len(), 1);
    }

    #[test]
    fn failed_begin_stays_idle() {
        let mut controller = controller(MockEngine {
            fail_begin: true,
            ..Default::default()
        });
        let err = controller.start(&()).unwrap_err();
        assert!(matches!(err, CaptureError::StartFailed(_)));
        assert_eq!(controller.state(), RecorderState::Idle);
        assert!(controller.current_recording().is_none());
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let mut controller = controller(MockEngine::default());
        assert!(!controller.stop());
        assert_eq!(controller.engine().stop_requests, 0);
    }

    #[tokio::test]
    async fn stop_failure_is_swallowed() {
        let mut controller = controller(MockEngine {
            fail_stop: true,
            ..Default::default()
        });
        let id = controller.start(&()).unwrap().unwrap();
        controller.handle_event(fragment(id, b"abc")).await.unwrap();

        assert!(controller.stop());
        assert_eq!(controller.state(), RecorderState::Idle);
        assert!(controller.is_finalizing());

        let link = controller.handle_event(stopped(id, Some("audio/webm"))).await.unwrap();
        assert!(link.is_some());
        assert_eq!(controller.downloads().saved[0].2, b"abc".to_vec());
    }

    #[tokio::test]
    async fn fragments_are_concatenated_in_arrival_order() {
        let mut controller = controller(MockEngine::default());
        let id = controller.start(&()).unwrap().unwrap();

        controller.handle_event(fragment(id, b"one-")).await.unwrap();
        controller.handle_event(fragment(id, b"")).await.unwrap();
        controller.handle_event(fragment(id, b"two-")).await.unwrap();
        controller.handle_event(fragment(id, b"three")).await.unwrap();
        assert_eq!(controller.fragment_count(), 3);

        controller.stop();
        let link = controller
            .handle_event(stopped(id, Some("audio/webm;codecs=opus")))
            .await
            .unwrap()
            .unwrap();

        let saved = &controller.downloads().saved;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "recording-input-2025-01-02T03-04-05-000Z.webm");
        assert_eq!(saved[0].1, "audio/webm;codecs=opus");
        assert_eq!(saved[0].2, b"one-two-three".to_vec());
        assert_eq!(link.label, "Download recording-input-2025-01-02T03-04-05-000Z.webm");
        assert!(!controller.is_finalizing());
    }

    #[tokio::test]
    async fn empty_recording_produces_nothing() {
        let mut controller = controller(MockEngine::default());
        let id = controller.start(&()).unwrap().unwrap();
        controller.stop();

        let link = controller.handle_event(stopped(id, Some("audio/ogg"))).await.unwrap();
        assert!(link.is_none());
        assert!(controller.downloads().saved.is_empty());
    }

    #[tokio::test]
    async fn ogg_mime_type_gives_ogg_extension() {
        let mut controller = controller(MockEngine::default());
        let id = controller.start(&()).unwrap().unwrap();
        controller.handle_event(fragment(id, b"x")).await.unwrap();
        controller.stop();
        controller.handle_event(stopped(id, Some("audio/ogg;codecs=opus"))).await.unwrap();

        assert!(controller.downloads().saved[0].0.ends_with(".ogg"));
    }

    #[tokio::test]
    async fn missing_mime_type_falls_back_to_webm() {
        let mut controller = controller(MockEngine::default());
        let id = controller.start(&()).unwrap().unwrap();
        controller.handle_event(fragment(id, b"x")).await.unwrap();
        controller.stop();
        controller.handle_event(stopped(id, None)).await.unwrap();

        let saved = &controller.downloads().saved[0];
        assert_eq!(saved.1, "audio/webm");
        assert!(saved.0.ends_with(".webm"));
    }

    #[tokio::test]
    async fn start_resets_fragments() {
        let mut controller = controller(MockEngine::default());
        let first = controller.start(&()).unwrap().unwrap();
        controller.handle_event(fragment(first, b"old")).await.unwrap();
        controller.stop();

        // Restarted before the first recording confirmed its stop
        let second = controller.start(&()).unwrap().unwrap();
        assert_ne!(first, second);
        assert_eq!(controller.fragment_count(), 0);

        // Late events from the abandoned recording are ignored
        controller.handle_event(fragment(first, b"late")).await.unwrap();
        assert!(controller.handle_event(stopped(first, None)).await.unwrap().is_none());
        assert!(controller.is_recording());

        controller.handle_event(fragment(second, b"new")).await.unwrap();
        controller.stop();
        controller.handle_event(stopped(second, None)).await.unwrap();

        let saved = &controller.downloads().saved;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].2, b"new".to_vec());
    }

    #[tokio::test]
    async fn unexpected_halt_finalizes() {
        let mut controller = controller(MockEngine::default());
        let id = controller.start(&()).unwrap().unwrap();
        controller.handle_event(fragment(id, b"partial")).await.unwrap();

        let link = controller.handle_event(stopped(id, Some("audio/ogg"))).await.unwrap();
        assert!(link.is_some());
        assert_eq!(controller.state(), RecorderState::Idle);
        assert!(!controller.stop());
    }
}
