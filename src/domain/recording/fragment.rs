//! Captured audio fragments

/// One chunk of encoded audio delivered while capture is running.
///
/// Fragments are opaque to the widget; only their size matters for
/// deciding whether they are kept.
pub trait AudioFragment {
    /// Size of the fragment in bytes
    fn size(&self) -> usize;

    /// Whether the fragment carries no data
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

impl AudioFragment for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }
}
