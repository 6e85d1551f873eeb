//! Encoding format value object

use std::fmt;

/// MIME type assumed when the capture engine does not report one
pub const FALLBACK_MIME_TYPE: &str = "audio/webm";

/// Encoding formats a capture engine may be asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingFormat {
    WebmOpus,
    Webm,
    OggOpus,
    Ogg,
}

impl EncodingFormat {
    /// Formats in order of preference, best first
    pub const PREFERENCE: [EncodingFormat; 4] = [
        EncodingFormat::WebmOpus,
        EncodingFormat::Webm,
        EncodingFormat::OggOpus,
        EncodingFormat::Ogg,
    ];

    /// Get the MIME type string
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::WebmOpus => "audio/webm;codecs=opus",
            Self::Webm => "audio/webm",
            Self::OggOpus => "audio/ogg;codecs=opus",
            Self::Ogg => "audio/ogg",
        }
    }

    /// Whether the format pins the Opus codec
    pub const fn requires_opus(&self) -> bool {
        matches!(self, Self::WebmOpus | Self::OggOpus)
    }

    /// Whether the container is Ogg
    pub const fn is_ogg(&self) -> bool {
        matches!(self, Self::OggOpus | Self::Ogg)
    }

    /// Pick the first format in preference order that `supported` accepts.
    ///
    /// Returns `None` when nothing is explicitly supported; the engine's
    /// own default should be used then.
    pub fn negotiate<F>(supported: F) -> Option<Self>
    where
        F: Fn(EncodingFormat) -> bool,
    {
        Self::PREFERENCE.into_iter().find(|format| supported(*format))
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types() {
        assert_eq!(EncodingFormat::WebmOpus.mime_type(), "audio/webm;codecs=opus");
        assert_eq!(EncodingFormat::Webm.mime_type(), "audio/webm");
        assert_eq!(EncodingFormat::OggOpus.mime_type(), "audio/ogg;codecs=opus");
        assert_eq!(EncodingFormat::Ogg.mime_type(), "audio/ogg");
    }

    #[test]
    fn negotiate_prefers_webm_opus() {
        let chosen = EncodingFormat::negotiate(|_| true);
        assert_eq!(chosen, Some(EncodingFormat::WebmOpus));
    }

    #[test]
    fn negotiate_skips_unsupported() {
        let chosen = EncodingFormat::negotiate(|f| f.is_ogg());
        assert_eq!(chosen, Some(EncodingFormat::OggOpus));

        let chosen = EncodingFormat::negotiate(|f| f == EncodingFormat::Ogg);
        assert_eq!(chosen, Some(EncodingFormat::Ogg));
    }

    #[test]
    fn negotiate_falls_back_to_none() {
        assert_eq!(EncodingFormat::negotiate(|_| false), None);
    }

    #[test]
    fn plain_webm_beats_ogg_opus() {
        let chosen = EncodingFormat::negotiate(|f| f != EncodingFormat::WebmOpus);
        assert_eq!(chosen, Some(EncodingFormat::Webm));
    }
}
