//! Widget domain module

mod ui_state;

pub use ui_state::{ReleaseTrigger, UiState, RECORDING_CLASS};
