use crate::error::ApiError;
use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use ingestion::{TranscriptUpload, UploadedFile};
use serde::Deserialize;

/// Transcript submitted as multipart form, JSON body or plain text.
///
/// Multipart reads the `file` and `transcript` fields, JSON reads
/// `{"transcript": ...}`, any other body is taken as the transcript itself.
pub struct TranscriptForm(pub TranscriptUpload);

#[derive(Deserialize)]
struct TranscriptBody {
    #[serde(default)]
    transcript: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S> for TranscriptForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|err| ApiError::bad_request(err.body_text()))?;
            return read_multipart(multipart).await.map(TranscriptForm);
        }

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<TranscriptBody>::from_request(req, state)
                .await
                .map_err(|err| ApiError::bad_request(err.body_text()))?;
            return Ok(TranscriptForm(TranscriptUpload {
                file: None,
                transcript: body.transcript,
            }));
        }

        let text = String::from_request(req, state)
            .await
            .map_err(|err| ApiError::bad_request(err.body_text()))?;
        Ok(TranscriptForm(TranscriptUpload {
            file: None,
            transcript: Some(text),
        }))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<TranscriptUpload, ApiError> {
    let mut upload = TranscriptUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("invalid multipart payload: {err}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::bad_request(format!("invalid file field: {err}")))?;
                upload.file = Some(UploadedFile {
                    filename,
                    content: content.to_vec(),
                });
            }
            Some("transcript") => {
                let text = field.text().await.map_err(|err| {
                    ApiError::bad_request(format!("invalid transcript field: {err}"))
                })?;
                upload.transcript = Some(text);
            }
            _ => {}
        }
    }

    Ok(upload)
}
