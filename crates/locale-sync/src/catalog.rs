use crate::locale::{LocaleId, LocaleRecord};

/// Errors from fetching the remote locale catalog, or from a catalog entry
/// that cannot serve the target it was fetched for.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("remote locale could not be read correctly: {0}")]
    Malformed(String),

    #[error(
        "locale code is not set for locale with id {locale_id} but <locale_code> is used in the file pattern"
    )]
    MissingCode { locale_id: LocaleId },
}

/// Lists the locales a remote project knows about.
#[async_trait::async_trait]
pub trait LocaleCatalog: Send + Sync {
    /// Every locale visible to `project_id`. Implementations drain any
    /// pagination before returning.
    async fn locales(&self, project_id: &str) -> Result<Vec<LocaleRecord>, CatalogError>;
}

#[async_trait::async_trait]
impl<T: LocaleCatalog + ?Sized> LocaleCatalog for std::sync::Arc<T> {
    async fn locales(&self, project_id: &str) -> Result<Vec<LocaleRecord>, CatalogError> {
        (**self).locales(project_id).await
    }
}
