//! Microphone adapter using cpal
//!
//! The input stream lives on a dedicated thread for the rest of the process
//! because cpal::Stream is not Send. Captured PCM (mono, i16, device rate) is
//! forwarded to whichever tap is attached to the [`MicrophoneStream`].

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::application::ports::{CaptureError, MicrophoneAccess};

/// Sample rate requested from the device when it offers it
pub const PREFERRED_SAMPLE_RATE: u32 = 48_000;

/// Receiving end of a PCM tap
pub type PcmReceiver = mpsc::UnboundedReceiver<Vec<i16>>;

type PcmSender = mpsc::UnboundedSender<Vec<i16>>;

struct StreamShared {
    sample_rate: u32,
    tap: StdMutex<Option<PcmSender>>,
}

/// Handle to the open microphone input.
///
/// Cloning shares the same input. At most one tap is attached at a time.
#[derive(Clone)]
pub struct MicrophoneStream {
    shared: Arc<StreamShared>,
}

impl MicrophoneStream {
    /// Create a handle for an input running at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        Self {
            shared: Arc::new(StreamShared {
                sample_rate,
                tap: StdMutex::new(None),
            }),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.shared.sample_rate
    }

    /// Start receiving PCM. Replaces any tap already attached.
    pub fn attach(&self) -> PcmReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.tap().replace(tx).is_some() {
            debug!("Replaced existing microphone tap");
        }
        rx
    }

    /// Stop forwarding PCM; the receiver sees end of stream.
    ///
    /// Returns whether a tap was attached.
    pub fn detach(&self) -> bool {
        self.tap().take().is_some()
    }

    pub fn is_tapped(&self) -> bool {
        self.tap().is_some()
    }

    /// Forward captured samples to the tap, if any
    pub fn push(&self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }
        let mut tap = self.tap();
        if let Some(tx) = tap.as_ref() {
            if tx.send(samples.to_vec()).is_err() {
                // Receiver went away
                *tap = None;
            }
        }
    }

    fn tap(&self) -> MutexGuard<'_, Option<PcmSender>> {
        self.shared.tap.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Microphone access backed by the default cpal input device
pub struct CpalMicrophone {
    preferred_rate: u32,
}

impl CpalMicrophone {
    pub fn new() -> Self {
        Self {
            preferred_rate: PREFERRED_SAMPLE_RATE,
        }
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(CaptureError::NoInputDevice)
    }

    /// Pick an input configuration, preferring fewer channels and `preferred_rate`
    fn get_input_config(
        device: &cpal::Device,
        preferred_rate: u32,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device.supported_input_configs().map_err(|e| match e {
            cpal::SupportedStreamConfigsError::DeviceNotAvailable => CaptureError::NoInputDevice,
            cpal::SupportedStreamConfigsError::BackendSpecific { err } => {
                backend_error(&err.description)
            }
            other => CaptureError::Unavailable(other.to_string()),
        })?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_preferred = config.min_sample_rate().0 <= preferred_rate
                && config.max_sample_rate().0 >= preferred_rate;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let current_includes = current.min_sample_rate().0 <= preferred_rate
                        && current.max_sample_rate().0 >= preferred_rate;
                    fewer_channels || (includes_preferred && !current_includes)
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or_else(|| {
            CaptureError::Unavailable("No suitable input configuration".into())
        })?;

        let sample_rate = if config_range.min_sample_rate().0 <= preferred_rate
            && config_range.max_sample_rate().0 >= preferred_rate
        {
            SampleRate(preferred_rate)
        } else {
            config_range.max_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Open the input stream. Runs on the thread that will own it.
    fn open_stream(preferred_rate: u32) -> Result<(cpal::Stream, MicrophoneStream), CaptureError> {
        let device = Self::get_input_device()?;
        if let Ok(name) = device.name() {
            debug!("Using input device {}", name);
        }

        let (config, sample_format) = Self::get_input_config(&device, preferred_rate)?;
        let channels = config.channels;
        let handle = MicrophoneStream::new(config.sample_rate.0);

        let on_error = |err: cpal::StreamError| warn!("Audio stream error: {}", err);

        let stream = match sample_format {
            SampleFormat::I16 => {
                let handle = handle.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        handle.push(&downmix(data, channels));
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::F32 => {
                let handle = handle.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let samples: Vec<i16> = data.iter().copied().map(f32_to_i16).collect();
                        handle.push(&downmix(&samples, channels));
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(CaptureError::Unavailable(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::NoInputDevice,
            cpal::BuildStreamError::BackendSpecific { err } => backend_error(&err.description),
            other => CaptureError::Unavailable(other.to_string()),
        })?;

        stream.play().map_err(|e| match e {
            cpal::PlayStreamError::DeviceNotAvailable => CaptureError::NoInputDevice,
            cpal::PlayStreamError::BackendSpecific { err } => backend_error(&err.description),
        })?;

        Ok((stream, handle))
    }
}

impl Default for CpalMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MicrophoneAccess for CpalMicrophone {
    type Stream = MicrophoneStream;

    async fn request(&self) -> Result<MicrophoneStream, CaptureError> {
        let (tx, rx) = oneshot::channel();
        let preferred_rate = self.preferred_rate;

        std::thread::Builder::new()
            .name("microphone-input".into())
            .spawn(move || match Self::open_stream(preferred_rate) {
                Ok((stream, handle)) => {
                    info!("Microphone open at {} Hz", handle.sample_rate());
                    if tx.send(Ok(handle)).is_err() {
                        return;
                    }
                    // Own the stream for the rest of the process
                    let _stream = stream;
                    loop {
                        std::thread::park();
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                }
            })
            .map_err(|e| CaptureError::Unavailable(format!("Input thread failed: {}", e)))?;

        rx.await
            .map_err(|_| CaptureError::Unavailable("Input thread exited".into()))?
    }
}

/// Map a backend-specific failure, recognising denied permissions
fn backend_error(description: &str) -> CaptureError {
    let lower = description.to_lowercase();
    if lower.contains("permission") || lower.contains("not authorized") {
        CaptureError::PermissionDenied
    } else {
        CaptureError::Unavailable(description.to_string())
    }
}

/// Mix interleaved multi-channel audio down to mono
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|chunk| {
            let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
            (sum / chunk.len() as i32) as i16
        })
        .collect()
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
