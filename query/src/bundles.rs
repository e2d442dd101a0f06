use meetmap_core::error::{ErrorCode, MeetmapError};
use meetmap_core::model::RunBundle;
use std::sync::Arc;
use storage::{BundleStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MeetmapError for QueryError {
    fn error_code(&self) -> ErrorCode {
        match self {
            QueryError::NotFound(_) => ErrorCode::NotFound,
            QueryError::Store(err) => err.error_code(),
        }
    }
}

/// Read-only access to stored bundles.
#[derive(Clone)]
pub struct BundleQuery {
    store: Arc<BundleStore>,
}

impl BundleQuery {
    pub fn new(store: Arc<BundleStore>) -> Self {
        Self { store }
    }

    pub async fn latest(&self) -> Result<RunBundle, QueryError> {
        let day = self
            .store
            .latest_day()
            .await?
            .ok_or_else(|| QueryError::NotFound("No saved runs yet.".to_string()))?;
        Ok(self.store.read_bundle(&day).await?)
    }

    pub async fn by_date(&self, date: &str) -> Result<RunBundle, QueryError> {
        let day = self
            .store
            .find_day(date)
            .await?
            .ok_or_else(|| QueryError::NotFound(format!("No run for {date}")))?;
        Ok(self.store.read_bundle(&day).await?)
    }

    pub async fn runs(&self) -> Result<Vec<String>, QueryError> {
        Ok(self.store.list_days().await?)
    }
}
