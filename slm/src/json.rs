use serde_json::Value;

/// Best-effort extraction of a JSON object from free-form model output.
///
/// Takes everything from the first `{` to the last `}`. If that does not
/// parse, Markdown code-fence markers are stripped and parsing is retried.
pub fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let candidate = &text[start..=end];
    serde_json::from_str(candidate)
        .ok()
        .or_else(|| serde_json::from_str(&strip_code_fences(candidate.trim())).ok())
}

/// Like [`extract_json`], substituting `fallback` when nothing usable is found.
pub fn extract_json_or(text: &str, fallback: impl FnOnce() -> Value) -> Value {
    match extract_json(text) {
        Some(value) => value,
        None => {
            tracing::warn!("model output held no parseable JSON object, using fallback");
            fallback()
        }
    }
}

fn strip_code_fences(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = line.strip_prefix("```json").unwrap_or(line);
            line.strip_suffix("```").unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
