use crate::bundle::{BundleStore, StoreError, SUMMARY_FILE, TRANSCRIPT_FILE};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// The material a chat answer is grounded on.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub run: String,
    pub bullets: Vec<String>,
    pub transcript: String,
}

impl BundleStore {
    /// Pick the run directory to ground chat on.
    ///
    /// A named run wins when that directory exists. Otherwise the most
    /// recently modified run holding both a transcript and a summary, then
    /// the most recent one holding a transcript.
    pub async fn select_run(&self, name: Option<&str>) -> Result<Option<PathBuf>, StoreError> {
        if let Some(name) = name.filter(|n| is_plain_name(n)) {
            let candidate = self.root().join(name);
            if fs::metadata(&candidate)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false)
            {
                return Ok(Some(candidate));
            }
            tracing::debug!(run = name, "named run not found, falling back to latest");
        }

        let runs = self.runs_by_recency().await?;
        for dir in &runs {
            if has_file(dir, TRANSCRIPT_FILE).await && has_file(dir, SUMMARY_FILE).await {
                return Ok(Some(dir.clone()));
            }
        }
        for dir in runs {
            if has_file(&dir, TRANSCRIPT_FILE).await {
                return Ok(Some(dir));
            }
        }
        Ok(None)
    }

    /// Load bullets and transcript of the selected run. Unreadable
    /// artifacts read as empty.
    pub async fn load_run_context(
        &self,
        name: Option<&str>,
    ) -> Result<Option<RunContext>, StoreError> {
        let Some(dir) = self.select_run(name).await? else {
            return Ok(None);
        };

        let run = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let bullets = match fs::read(dir.join(SUMMARY_FILE)).await {
            Ok(data) => bullets_from_summary(&data),
            Err(_) => Vec::new(),
        };
        let transcript = match fs::read(dir.join(TRANSCRIPT_FILE)).await {
            Ok(data) => String::from_utf8_lossy(&data).into_owned(),
            Err(_) => String::new(),
        };

        Ok(Some(RunContext {
            run,
            bullets,
            transcript,
        }))
    }

    /// Every subdirectory of the root, most recently modified first.
    async fn runs_by_recency(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !fs::try_exists(self.root()).await? {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(self.root()).await?;
        let mut runs: Vec<(SystemTime, PathBuf)> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_dir() {
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                runs.push((modified, entry.path()));
            }
        }

        runs.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(runs.into_iter().map(|(_, path)| path).collect())
    }
}

/// A single normal path component, so a run name cannot leave the data root.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

async fn has_file(dir: &Path, file: &str) -> bool {
    fs::try_exists(dir.join(file)).await.unwrap_or(false)
}

fn bullets_from_summary(data: &[u8]) -> Vec<String> {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return Vec::new();
    };
    match value.get("bullets") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_plain_name_rejects_traversal() {
        assert!(is_plain_name("2025-09-12"));
        assert!(is_plain_name("standup"));
        assert!(!is_plain_name("../etc"));
        assert!(!is_plain_name("a/b"));
        assert!(!is_plain_name("/abs"));
        assert!(!is_plain_name(""));
    }

    #[test]
    fn test_bullets_from_summary() {
        assert_eq!(
            bullets_from_summary(br#"{"bullets": ["a", 2]}"#),
            vec!["a".to_string(), "2".to_string()]
        );
        assert!(bullets_from_summary(b"not json").is_empty());
        assert!(bullets_from_summary(br#"{"bullets": "a"}"#).is_empty());
    }
}
