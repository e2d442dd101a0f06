#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Unsupported,
}

/// Transcripts are accepted as `.txt` files only, matched case-insensitively.
pub fn detect_content_kind(filename: &str) -> ContentKind {
    if filename.to_lowercase().ends_with(".txt") {
        ContentKind::Text
    } else {
        ContentKind::Unsupported
    }
}

/// Decode UTF-8, dropping invalid byte sequences.
pub fn decode_utf8_ignoring_errors(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
