use unicode_normalization::UnicodeNormalization;

pub const FALLBACK_SLUG: &str = "node";

/// Derive an identifier from free text.
///
/// Accents are stripped via NFKD decomposition and anything non-ASCII is
/// dropped. Alphanumerics are kept lowercased, each of ` -_.` becomes `-`,
/// and leading/trailing hyphens are trimmed. Runs of separators are not
/// collapsed.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.nfkd().filter(char::is_ascii) {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if matches!(ch, ' ' | '-' | '_' | '.') {
            out.push('-');
        }
    }

    let slug = out.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
