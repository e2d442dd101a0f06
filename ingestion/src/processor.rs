use crate::api::{ApiPayloadError, TranscriptUpload};
use chrono::{Local, NaiveDate};
use meetmap_core::error::{ErrorCode, MeetmapError};
use meetmap_core::model::RunBundle;
use slm::{GatewayError, MeetingExtractor};
use std::sync::Arc;
use storage::{BundleStore, StoreError, TranscriptMeta};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error(transparent)]
    Payload(#[from] ApiPayloadError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Model gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl MeetmapError for IngestionError {
    fn error_code(&self) -> ErrorCode {
        match self {
            IngestionError::Payload(err) => err.error_code(),
            IngestionError::Store(err) => err.error_code(),
            IngestionError::Gateway(err) => err.error_code(),
        }
    }
}

/// Transcript in, dated bundle out: extract, normalize, persist.
pub struct TranscriptPipeline {
    store: Arc<BundleStore>,
    extractor: MeetingExtractor,
}

impl TranscriptPipeline {
    pub fn new(store: Arc<BundleStore>, extractor: MeetingExtractor) -> Self {
        Self { store, extractor }
    }

    pub fn store(&self) -> &Arc<BundleStore> {
        &self.store
    }

    pub async fn process(&self, upload: TranscriptUpload) -> Result<RunBundle, IngestionError> {
        self.process_on(today(), upload).await
    }

    pub async fn process_on(
        &self,
        date: NaiveDate,
        upload: TranscriptUpload,
    ) -> Result<RunBundle, IngestionError> {
        let transcript = upload.into_text()?;
        info!(
            chars = transcript.chars().count(),
            mock = self.extractor.is_mock(),
            "processing transcript"
        );

        let extraction = self.extractor.run(&transcript).await?;

        let graph = &extraction.graph;
        let unresolved = graph.unresolved_endpoints();
        if !unresolved.is_empty() {
            warn!(?unresolved, "edges reference ids missing from the node list");
        }
        if !graph.matrix_matches_nodes() {
            warn!(
                nodes = graph.nodes.len(),
                rows = graph.matrix.len(),
                "matrix dimension differs from node count"
            );
        }

        let bundle = self
            .store
            .write_bundle(
                date,
                &transcript,
                &extraction.graph,
                &extraction.summary,
                &extraction.tasks,
            )
            .await?;
        Ok(bundle)
    }

    /// Persist the transcript alone, without running extraction.
    pub async fn store_transcript(
        &self,
        upload: TranscriptUpload,
    ) -> Result<TranscriptMeta, IngestionError> {
        self.store_transcript_on(today(), upload).await
    }

    pub async fn store_transcript_on(
        &self,
        date: NaiveDate,
        upload: TranscriptUpload,
    ) -> Result<TranscriptMeta, IngestionError> {
        let transcript = upload.into_text()?;
        let meta = self.store.save_transcript(date, &transcript).await?;
        info!(date_dir = %meta.date_dir, chars = meta.chars, "transcript stored");
        Ok(meta)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
