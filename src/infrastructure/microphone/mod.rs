//! Microphone infrastructure module
//!
//! Opens the default input device with cpal and keeps it open for the
//! life of the process.

mod cpal_microphone;

pub use cpal_microphone::{CpalMicrophone, MicrophoneStream, PcmReceiver};
