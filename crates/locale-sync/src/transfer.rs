use serde::{Deserialize, Serialize};

use crate::locale::LocaleId;
use crate::source::UploadOptions;
use crate::target::DownloadOptions;

/// Errors from moving a single file to or from the remote service.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

/// A single file to upload.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file_name: String,
    pub content: Vec<u8>,
    pub locale_id: Option<LocaleId>,
    pub options: UploadOptions,
}

/// What the remote service reports back about an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub state: String,
}

/// Moves locale content between the remote service and the caller.
#[async_trait::async_trait]
pub trait Transfer: Send + Sync {
    /// Download the rendered content of one locale.
    async fn download(
        &self,
        project_id: &str,
        locale_id: &LocaleId,
        options: &DownloadOptions,
    ) -> Result<Vec<u8>, TransferError>;

    /// Upload one file into the project.
    async fn upload(
        &self,
        project_id: &str,
        request: &UploadRequest,
    ) -> Result<UploadSummary, TransferError>;
}

#[async_trait::async_trait]
impl<T: Transfer + ?Sized> Transfer for std::sync::Arc<T> {
    async fn download(
        &self,
        project_id: &str,
        locale_id: &LocaleId,
        options: &DownloadOptions,
    ) -> Result<Vec<u8>, TransferError> {
        (**self).download(project_id, locale_id, options).await
    }

    async fn upload(
        &self,
        project_id: &str,
        request: &UploadRequest,
    ) -> Result<UploadSummary, TransferError> {
        (**self).upload(project_id, request).await
    }
}
