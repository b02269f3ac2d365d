//! Byte-signature classification of fetched file content.

/// Content classification derived purely from the leading bytes of a file.
/// The declared MIME type from the listing is never consulted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
    PlainText,
    Unknown,
}

impl Classification {
    /// IANA media type; `None` for `Unknown`.
    pub fn media_type(self) -> Option<&'static str> {
        match self {
            Classification::Jpeg => Some("image/jpeg"),
            Classification::Png => Some("image/png"),
            Classification::Gif => Some("image/gif"),
            Classification::Webp => Some("image/webp"),
            Classification::Bmp => Some("image/bmp"),
            Classification::PlainText => Some("text/plain"),
            Classification::Unknown => None,
        }
    }

    /// Media type for the image variants only.
    pub fn image_media_type(self) -> Option<&'static str> {
        match self {
            Classification::PlainText | Classification::Unknown => None,
            image => image.media_type(),
        }
    }
}

const SIGNATURES: &[(&[u8], Classification)] = &[
    (&[0xFF, 0xD8, 0xFF, 0xE0], Classification::Jpeg),
    (&[0x89, 0x50, 0x4E, 0x47], Classification::Png),
    (b"GIF8", Classification::Gif),
    (b"RIFF", Classification::Webp),
    (b"BM", Classification::Bmp),
];

/// Classify a byte buffer by magic-number prefix, falling back to plain
/// text for non-empty UTF-8 content. This is the single source of truth for
/// eligibility after download; a file whose declared type was `image/*` but
/// whose bytes match nothing lands on `Unknown` here.
pub fn classify(bytes: &[u8]) -> Classification {
    for (signature, classification) in SIGNATURES {
        if bytes.starts_with(signature) {
            return *classification;
        }
    }
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.trim().is_empty() => Classification::PlainText,
        _ => Classification::Unknown,
    }
}
