//! FFmpeg-based capture engine adapter
//!
//! Raw PCM from the microphone tap is piped into an ffmpeg child process;
//! whatever ffmpeg writes to stdout is reported as fragments.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::ports::{CaptureEngine, CaptureError, RecorderEvent};
use crate::domain::recording::{EncodingFormat, RecordingId};
use crate::infrastructure::microphone::{MicrophoneStream, PcmReceiver};

/// Sample rate libopus is fed at
const OPUS_SAMPLE_RATE: u32 = 48_000;

/// Size of each stdout read
const READ_CHUNK_SIZE: usize = 16 * 1024;

/// Sender for engine notifications
pub type EventSender = mpsc::UnboundedSender<RecorderEvent<Vec<u8>>>;

/// Muxers and encoders an ffmpeg binary was built with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FfmpegCapabilities {
    muxers: HashSet<String>,
    encoders: HashSet<String>,
}

impl FfmpegCapabilities {
    /// Capabilities of an ffmpeg that could not be probed
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from the output of `ffmpeg -muxers` and `ffmpeg -encoders`
    pub fn from_listings(muxers: &str, encoders: &str) -> Self {
        Self {
            muxers: parse_listing(muxers),
            encoders: parse_listing(encoders),
        }
    }

    /// Ask `ffmpeg` what it supports. A failed probe yields no capabilities.
    pub async fn probe(ffmpeg: &Path) -> Self {
        let muxers = list(ffmpeg, "-muxers").await;
        let encoders = list(ffmpeg, "-encoders").await;
        match (muxers, encoders) {
            (Some(muxers), Some(encoders)) => {
                let caps = Self::from_listings(&muxers, &encoders);
                debug!(
                    "ffmpeg offers {} muxer(s), {} encoder(s)",
                    caps.muxers.len(),
                    caps.encoders.len()
                );
                caps
            }
            _ => {
                warn!("Could not probe {}, using its default output", ffmpeg.display());
                Self::none()
            }
        }
    }

    pub fn has_muxer(&self, name: &str) -> bool {
        self.muxers.contains(name)
    }

    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }

    /// Whether a container/codec pairing for `format` is available
    pub fn supports(&self, format: EncodingFormat) -> bool {
        OutputPlan::for_format(format, self).is_some()
    }
}

/// Extract names from an ffmpeg listing.
///
/// Entries follow a line of dashes and read `<flags> <name>[,<alias>] <description>`.
fn parse_listing(listing: &str) -> HashSet<String> {
    listing
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("--"))
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .flat_map(|names| names.split(','))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

async fn list(ffmpeg: &Path, flag: &str) -> Option<String> {
    let output = Command::new(ffmpeg)
        .args(["-hide_banner", flag])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Container and codec passed to ffmpeg for one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputPlan {
    muxer: &'static str,
    codec: &'static str,
    mime_type: &'static str,
}

impl OutputPlan {
    fn for_format(format: EncodingFormat, caps: &FfmpegCapabilities) -> Option<Self> {
        let muxer = if format.is_ogg() { "ogg" } else { "webm" };
        if !caps.has_muxer(muxer) {
            return None;
        }

        let codec = if format.requires_opus() {
            caps.has_encoder("libopus").then_some("libopus")?
        } else if format.is_ogg() {
            ["libvorbis", "libopus"]
                .into_iter()
                .find(|codec| caps.has_encoder(codec))?
        } else {
            ["libopus", "libvorbis"]
                .into_iter()
                .find(|codec| caps.has_encoder(codec))?
        };

        Some(Self {
            muxer,
            codec,
            mime_type: format.mime_type(),
        })
    }

    /// Output used when no preferred format is available
    fn engine_default() -> Self {
        Self {
            muxer: "ogg",
            codec: "flac",
            mime_type: "audio/ogg",
        }
    }
}

/// Build ffmpeg args for encoding mono s16le PCM from stdin to stdout
fn build_ffmpeg_args(input_rate: u32, plan: &OutputPlan) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "s16le".to_string(),
        "-ar".to_string(),
        input_rate.to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-i".to_string(),
        "pipe:0".to_string(),
        "-c:a".to_string(),
        plan.codec.to_string(),
    ];

    if plan.codec == "libopus" && input_rate != OPUS_SAMPLE_RATE {
        args.push("-ar".to_string());
        args.push(OPUS_SAMPLE_RATE.to_string());
    }

    args.extend([
        "-f".to_string(),
        plan.muxer.to_string(),
        "pipe:1".to_string(),
    ]);

    args
}

/// Little-endian bytes of PCM samples
fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

struct ActiveCapture {
    recording: RecordingId,
    source: MicrophoneStream,
}

/// Capture engine that encodes with an ffmpeg child process
pub struct FfmpegCaptureEngine {
    ffmpeg: PathBuf,
    capabilities: FfmpegCapabilities,
    events: EventSender,
    active: Option<ActiveCapture>,
}

impl FfmpegCaptureEngine {
    /// Create an engine with already known capabilities
    pub fn new(ffmpeg: impl Into<PathBuf>, capabilities: FfmpegCapabilities, events: EventSender) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            capabilities,
            events,
            active: None,
        }
    }

    /// Probe `ffmpeg` and create an engine for it
    pub async fn probe(ffmpeg: impl Into<PathBuf>, events: EventSender) -> Self {
        let ffmpeg = ffmpeg.into();
        let capabilities = FfmpegCapabilities::probe(&ffmpeg).await;
        Self::new(ffmpeg, capabilities, events)
    }

    /// Recording currently fed to ffmpeg, if any
    pub fn active_recording(&self) -> Option<RecordingId> {
        self.active.as_ref().map(|a| a.recording)
    }

    fn spawn_ffmpeg(&self, args: &[String]) -> Result<Child, CaptureError> {
        Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptureError::StartFailed(format!("{} not found", self.ffmpeg.display()))
                } else {
                    CaptureError::StartFailed(e.to_string())
                }
            })
    }
}

impl CaptureEngine for FfmpegCaptureEngine {
    type Source = MicrophoneStream;
    type Fragment = Vec<u8>;

    fn supports(&self, format: EncodingFormat) -> bool {
        self.capabilities.supports(format)
    }

    fn begin(
        &mut self,
        source: &MicrophoneStream,
        recording: RecordingId,
        format: Option<EncodingFormat>,
    ) -> Result<(), CaptureError> {
        if let Some(previous) = self.active.take() {
            debug!("Abandoning capture for recording {}", previous.recording);
            previous.source.detach();
        }

        let plan = match format {
            Some(format) => OutputPlan::for_format(format, &self.capabilities).ok_or_else(|| {
                CaptureError::StartFailed(format!("{} is not supported by ffmpeg", format))
            })?,
            None => OutputPlan::engine_default(),
        };

        let args = build_ffmpeg_args(source.sample_rate(), &plan);
        debug!("Spawning {} {}", self.ffmpeg.display(), args.join(" "));
        let mut child = self.spawn_ffmpeg(&args)?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(CaptureError::StartFailed("ffmpeg pipes unavailable".into()));
        };

        let stderr = child.stderr.take();
        let wrote_pcm = Arc::new(AtomicBool::new(false));
        let pcm = source.attach();

        tokio::spawn(feed_pcm(pcm, stdin, Arc::clone(&wrote_pcm)));
        tokio::spawn(collect_output(
            child,
            stdout,
            stderr,
            recording,
            plan.mime_type,
            wrote_pcm,
            self.events.clone(),
        ));

        info!("ffmpeg encoding {} as {}", recording, plan.mime_type);
        self.active = Some(ActiveCapture {
            recording,
            source: source.clone(),
        });
        Ok(())
    }

    fn request_stop(&mut self) -> Result<(), CaptureError> {
        let active = self
            .active
            .take()
            .ok_or_else(|| CaptureError::StopFailed("No capture in progress".into()))?;

        // Closing the tap ends ffmpeg's stdin
        if !active.source.detach() {
            return Err(CaptureError::StopFailed("Capture already halted".into()));
        }
        Ok(())
    }
}

/// Write PCM to ffmpeg until the tap closes, then close stdin
async fn feed_pcm(mut pcm: PcmReceiver, mut stdin: ChildStdin, wrote_pcm: Arc<AtomicBool>) {
    while let Some(samples) = pcm.recv().await {
        if let Err(e) = stdin.write_all(&pcm_bytes(&samples)).await {
            debug!("ffmpeg stdin closed: {}", e);
            return;
        }
        wrote_pcm.store(true, Ordering::SeqCst);
    }

    if let Err(e) = stdin.shutdown().await {
        debug!("Closing ffmpeg stdin failed: {}", e);
    }
}

/// Report ffmpeg's output as fragments, then report the stop once it exits
async fn collect_output(
    mut child: Child,
    mut stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    recording: RecordingId,
    mime_type: &'static str,
    wrote_pcm: Arc<AtomicBool>,
    events: EventSender,
) {
    let diagnostics = tokio::spawn(last_stderr_line(stderr));
    let mut held = Vec::new();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("Reading ffmpeg output failed: {}", e);
                break;
            }
        };

        held.extend_from_slice(&buf[..n]);
        if wrote_pcm.load(Ordering::SeqCst) {
            let data = std::mem::take(&mut held);
            if events.send(RecorderEvent::Fragment { recording, data }).is_err() {
                debug!("Event receiver gone, dropping ffmpeg output");
            }
        }
    }

    if wrote_pcm.load(Ordering::SeqCst) && !held.is_empty() {
        let _ = events.send(RecorderEvent::Fragment {
            recording,
            data: held,
        });
    } else if !held.is_empty() {
        debug!("Discarding {} byte(s) of output with no audio", held.len());
    }

    let status = child.wait().await;
    let last_line = diagnostics.await.ok().flatten();
    match status {
        Ok(status) if !status.success() => {
            warn!(
                "ffmpeg exited with {}: {}",
                status,
                last_line.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(_) => debug!("ffmpeg finished recording {}", recording),
        Err(e) => warn!("Waiting for ffmpeg failed: {}", e),
    }

    let _ = events.send(RecorderEvent::Stopped {
        recording,
        mime_type: Some(mime_type.to_string()),
    });
}

/// Read ffmpeg's stderr to the end, keeping the last non-empty line
async fn last_stderr_line(stderr: Option<ChildStderr>) -> Option<String> {
    let mut lines = BufReader::new(stderr?).lines();
    let mut last = None;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => last = Some(line),
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                debug!("Reading ffmpeg stderr failed: {}", e);
                break;
            }
        }
    }
    last
}
