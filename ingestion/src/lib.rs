pub mod api;
pub mod extract;
pub mod processor;

pub use api::{ApiPayloadError, TranscriptUpload, UploadedFile};
pub use processor::{IngestionError, TranscriptPipeline};
