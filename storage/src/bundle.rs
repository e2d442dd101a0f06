use chrono::NaiveDate;
use meetmap_core::error::{ErrorCode, MeetmapError};
use meetmap_core::model::{CollabGraph, RunBundle, SummaryBlock, TaskList};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

pub const TRANSCRIPT_FILE: &str = "transcript.txt";
pub const GRAPH_FILE: &str = "star_connect.json";
pub const SUMMARY_FILE: &str = "summary.json";
pub const TASKS_FILE: &str = "tasks.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt artifact {file} in {day}: {reason}")]
    Corrupt {
        day: String,
        file: &'static str,
        reason: String,
    },
    #[error("{0}")]
    NotFound(String),
}

impl MeetmapError for StoreError {
    fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::Io(_) => ErrorCode::Internal,
            StoreError::Serialization(_) => ErrorCode::Internal,
            StoreError::Corrupt { .. } => ErrorCode::Internal,
            StoreError::NotFound(_) => ErrorCode::NotFound,
        }
    }
}

/// Where a transcript stored on its own ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMeta {
    pub date_dir: String,
    pub path: String,
    pub chars: usize,
}

/// Dated bundles on disk: one `YYYY-MM-DD` directory per processed day.
/// Reprocessing on the same day overwrites that day's artifacts.
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn day_key(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub async fn ensure_day_dir(&self, date: NaiveDate) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(Self::day_key(date));
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Persist all four artifacts for `date` and return them as a bundle.
    pub async fn write_bundle(
        &self,
        date: NaiveDate,
        transcript: &str,
        graph: &CollabGraph,
        summary: &SummaryBlock,
        tasks: &TaskList,
    ) -> Result<RunBundle, StoreError> {
        let dir = self.ensure_day_dir(date).await?;

        write_atomic(&dir.join(TRANSCRIPT_FILE), transcript.as_bytes()).await?;
        write_json(&dir.join(GRAPH_FILE), graph).await?;
        write_json(&dir.join(SUMMARY_FILE), summary).await?;
        write_json(&dir.join(TASKS_FILE), tasks).await?;

        let date_dir = Self::day_key(date);
        tracing::info!(
            date_dir = %date_dir,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "bundle written"
        );

        Ok(RunBundle {
            date_dir,
            star_connect: graph.clone(),
            summary: summary.clone(),
            tasks: tasks.clone(),
        })
    }

    /// Store only the transcript for `date`, leaving other artifacts untouched.
    pub async fn save_transcript(
        &self,
        date: NaiveDate,
        text: &str,
    ) -> Result<TranscriptMeta, StoreError> {
        let dir = self.ensure_day_dir(date).await?;
        let path = dir.join(TRANSCRIPT_FILE);
        write_atomic(&path, text.as_bytes()).await?;

        Ok(TranscriptMeta {
            date_dir: Self::day_key(date),
            path: path.display().to_string(),
            chars: text.chars().count(),
        })
    }

    /// Names of all `YYYY-MM-DD` run directories, ascending.
    pub async fn list_days(&self) -> Result<Vec<String>, StoreError> {
        if !fs::try_exists(&self.root).await? {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.root).await?;
        let mut days = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_day_name(name) {
                    days.push(name.to_string());
                }
            }
        }

        days.sort();
        Ok(days)
    }

    pub async fn latest_day(&self) -> Result<Option<String>, StoreError> {
        Ok(self.list_days().await?.pop())
    }

    pub async fn find_day(&self, date: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .list_days()
            .await?
            .into_iter()
            .find(|day| day == date))
    }

    /// Load a stored bundle. The graph is required; a missing summary or
    /// task list reads as empty.
    pub async fn read_bundle(&self, day: &str) -> Result<RunBundle, StoreError> {
        let dir = self.root.join(day);

        let star_connect: CollabGraph = read_json(&dir, day, GRAPH_FILE).await?.ok_or_else(|| {
            StoreError::NotFound(format!("{GRAPH_FILE} not found in {day}"))
        })?;
        let summary: SummaryBlock = read_json(&dir, day, SUMMARY_FILE)
            .await?
            .unwrap_or_default();
        let tasks: TaskList = read_json(&dir, day, TASKS_FILE).await?.unwrap_or_default();

        Ok(RunBundle {
            date_dir: day.to_string(),
            star_connect,
            summary,
            tasks,
        })
    }
}

/// `YYYY-MM-DD` by shape only; the date itself is not validated.
pub fn is_day_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

/// Writes to a temp file then renames over the target.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &data).await
}

async fn read_json<T: DeserializeOwned>(
    dir: &Path,
    day: &str,
    file: &'static str,
) -> Result<Option<T>, StoreError> {
    let path = dir.join(file);
    if !fs::try_exists(&path).await? {
        return Ok(None);
    }
    let data = fs::read(&path).await?;
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|err| StoreError::Corrupt {
            day: day.to_string(),
            file,
            reason: err.to_string(),
        })
}
