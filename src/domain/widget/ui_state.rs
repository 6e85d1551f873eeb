//! Widget UI state

use std::fmt;

/// State class carried by the trigger while it is held
pub const RECORDING_CLASS: &str = "recording";

/// What the status surface shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Recording,
    Error(String),
}

impl UiState {
    /// Text written to the status surface
    pub fn status_text(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Recording => "Recording...",
            Self::Error(message) => message,
        }
    }

    /// Short machine-readable form used by the control socket
    pub fn as_wire(&self) -> String {
        match self {
            Self::Idle => "idle".to_string(),
            Self::Recording => "recording".to_string(),
            Self::Error(message) => format!("error: {}", message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for UiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_text())
    }
}

/// Gesture events that end a press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseTrigger {
    PointerUp,
    PointerCancel,
    WindowBlur,
}

impl ReleaseTrigger {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PointerUp => "pointer-up",
            Self::PointerCancel => "pointer-cancel",
            Self::WindowBlur => "window-blur",
        }
    }
}

impl fmt::Display for ReleaseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_texts() {
        assert_eq!(UiState::Idle.status_text(), "Idle");
        assert_eq!(UiState::Recording.status_text(), "Recording...");
        assert_eq!(
            UiState::Error("Microphone access denied".into()).status_text(),
            "Microphone access denied"
        );
    }

    #[test]
    fn wire_format() {
        assert_eq!(UiState::Idle.as_wire(), "idle");
        assert_eq!(UiState::Recording.as_wire(), "recording");
        assert_eq!(UiState::Error("boom".into()).as_wire(), "error: boom");
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(UiState::default(), UiState::Idle);
        assert!(!UiState::default().is_error());
    }

    #[test]
    fn release_trigger_display() {
        assert_eq!(ReleaseTrigger::PointerUp.to_string(), "pointer-up");
        assert_eq!(ReleaseTrigger::PointerCancel.to_string(), "pointer-cancel");
        assert_eq!(ReleaseTrigger::WindowBlur.to_string(), "window-blur");
    }
}
