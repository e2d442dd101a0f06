use crate::extract::{decode_utf8_ignoring_errors, detect_content_kind, ContentKind};
use meetmap_core::error::{ErrorCode, MeetmapError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiPayloadError {
    #[error("Provide a .txt file or 'transcript' text.")]
    Missing,
    #[error("Only .txt files are accepted.")]
    UnsupportedFile { filename: String },
}

impl MeetmapError for ApiPayloadError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidArgument
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

/// A transcript as submitted: an uploaded file, inline text, or both.
#[derive(Debug, Clone, Default)]
pub struct TranscriptUpload {
    pub file: Option<UploadedFile>,
    pub transcript: Option<String>,
}

impl TranscriptUpload {
    pub fn text(transcript: impl Into<String>) -> Self {
        Self {
            file: None,
            transcript: Some(transcript.into()),
        }
    }

    pub fn file(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file: Some(UploadedFile {
                filename: filename.into(),
                content,
            }),
            transcript: None,
        }
    }

    /// Resolve to transcript text. A file takes precedence over inline text;
    /// empty inline text counts as missing.
    pub fn into_text(self) -> Result<String, ApiPayloadError> {
        if let Some(file) = self.file {
            return match detect_content_kind(&file.filename) {
                ContentKind::Text => Ok(decode_utf8_ignoring_errors(&file.content)),
                ContentKind::Unsupported => Err(ApiPayloadError::UnsupportedFile {
                    filename: file.filename,
                }),
            };
        }

        match self.transcript {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(ApiPayloadError::Missing),
        }
    }
}
