//! Recording session entity

use std::fmt;

use super::fragment::AudioFragment;

/// Identifies one press-and-hold recording cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordingId(u64);

impl RecordingId {
    /// Create an id from its raw value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The id that follows this one
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the raw value
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Recording controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

impl RecorderState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One press-and-hold cycle.
///
/// Holds the fragments in arrival order. The session stays around after
/// capture is asked to stop so late fragments and the stop notification
/// can still be matched to it.
#[derive(Debug)]
pub struct RecordingSession<F> {
    id: RecordingId,
    fragments: Vec<F>,
    active: bool,
}

impl<F: AudioFragment> RecordingSession<F> {
    /// Create a new active session
    pub fn new(id: RecordingId) -> Self {
        Self {
            id,
            fragments: Vec::new(),
            active: true,
        }
    }

    pub fn id(&self) -> RecordingId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the session as no longer capturing
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Append a fragment. Empty fragments are discarded.
    ///
    /// Returns whether the fragment was kept.
    pub fn push(&mut self, fragment: F) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.fragments.push(fragment);
        true
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Total bytes collected so far
    pub fn size_bytes(&self) -> usize {
        self.fragments.iter().map(AudioFragment::size).sum()
    }

    /// Consume the session, yielding its fragments in arrival order
    pub fn into_fragments(self) -> Vec<F> {
        self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_active_and_empty() {
        let session = RecordingSession::<Vec<u8>>::new(RecordingId::new(1));
        assert!(session.is_active());
        assert_eq!(session.fragment_count(), 0);
        assert_eq!(session.size_bytes(), 0);
    }

    #[test]
    fn push_discards_empty_fragments() {
        let mut session = RecordingSession::new(RecordingId::new(1));
        assert!(session.push(vec![1u8, 2]));
        assert!(!session.push(Vec::new()));
        assert!(session.push(vec![3u8]));
        assert_eq!(session.fragment_count(), 2);
        assert_eq!(session.size_bytes(), 3);
    }

    #[test]
    fn fragments_keep_arrival_order() {
        let mut session = RecordingSession::new(RecordingId::new(7));
        session.push(vec![1u8]);
        session.push(vec![2u8]);
        session.push(vec![3u8]);
        assert_eq!(session.into_fragments(), vec![vec![1u8], vec![2], vec![3]]);
    }

    #[test]
    fn deactivate() {
        let mut session = RecordingSession::<Vec<u8>>::new(RecordingId::new(1));
        session.deactivate();
        assert!(!session.is_active());
    }

    #[test]
    fn recording_id_sequence() {
        let id = RecordingId::new(1);
        assert_eq!(id.next(), RecordingId::new(2));
        assert_eq!(id.next().value(), 2);
        assert_eq!(id.to_string(), "#1");
    }

    #[test]
    fn state_display() {
        assert_eq!(RecorderState::Idle.to_string(), "idle");
        assert_eq!(RecorderState::Recording.to_string(), "recording");
        assert_eq!(RecorderState::default(), RecorderState::Idle);
    }
}
