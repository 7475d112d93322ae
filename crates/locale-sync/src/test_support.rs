use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    CatalogError, DownloadOptions, Feedback, LocaleCatalog, LocaleId, LocaleRecord, Reporter,
    Transfer, TransferError, UploadRequest, UploadSummary,
};

/// In-memory catalog for testing. Counts how often it is asked.
#[derive(Default)]
pub struct InMemoryCatalog {
    records: Vec<LocaleRecord>,
    failure: Option<String>,
    fetches: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<LocaleRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// A catalog whose every fetch fails with a network error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LocaleCatalog for InMemoryCatalog {
    async fn locales(&self, _project_id: &str) -> Result<Vec<LocaleRecord>, CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(CatalogError::Network(message.clone())),
            None => Ok(self.records.clone()),
        }
    }
}

type DownloadCall = (String, LocaleId, DownloadOptions);

/// Transfer double that serves canned content and records every call.
///
/// Locales without explicit content download as `content for <id>`.
#[derive(Default)]
pub struct FakeTransfer {
    contents: HashMap<LocaleId, Vec<u8>>,
    failing: HashSet<LocaleId>,
    failing_uploads: HashSet<String>,
    downloads: Mutex<Vec<DownloadCall>>,
    uploads: Mutex<Vec<UploadRequest>>,
}

impl FakeTransfer {
    pub fn with_content(mut self, locale_id: &str, content: impl Into<Vec<u8>>) -> Self {
        self.contents.insert(LocaleId::new(locale_id), content.into());
        self
    }

    /// Make downloads of `locale_id` fail with HTTP 500.
    pub fn failing(mut self, locale_id: &str) -> Self {
        self.failing.insert(LocaleId::new(locale_id));
        self
    }

    /// Make uploads of files named `file_name` fail with HTTP 422.
    pub fn failing_upload(mut self, file_name: &str) -> Self {
        self.failing_uploads.insert(file_name.to_owned());
        self
    }

    pub fn download_calls(&self) -> Vec<DownloadCall> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn downloaded_ids(&self) -> Vec<LocaleId> {
        self.download_calls()
            .into_iter()
            .map(|(_, id, _)| id)
            .collect()
    }

    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transfer for FakeTransfer {
    async fn download(
        &self,
        project_id: &str,
        locale_id: &LocaleId,
        options: &DownloadOptions,
    ) -> Result<Vec<u8>, TransferError> {
        self.downloads.lock().unwrap().push((
            project_id.to_owned(),
            locale_id.clone(),
            options.clone(),
        ));

        if self.failing.contains(locale_id) {
            return Err(TransferError::Http {
                status: 500,
                body: "internal error".into(),
            });
        }

        Ok(self
            .contents
            .get(locale_id)
            .cloned()
            .unwrap_or_else(|| format!("content for {locale_id}").into_bytes()))
    }

    async fn upload(
        &self,
        _project_id: &str,
        request: &UploadRequest,
    ) -> Result<UploadSummary, TransferError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(request.clone());

        if self.failing_uploads.contains(&request.file_name) {
            return Err(TransferError::Http {
                status: 422,
                body: "file could not be parsed".into(),
            });
        }
        Ok(UploadSummary {
            id: format!("upload-{}", uploads.len()),
            filename: request.file_name.clone(),
            format: request.options.file_format.clone().unwrap_or_default(),
            state: "success".into(),
        })
    }
}

/// Reporter that keeps everything it is given.
#[derive(Default)]
pub struct RecordingReporter {
    feedback: Mutex<Vec<Feedback>>,
}

impl RecordingReporter {
    pub fn feedback(&self) -> Vec<Feedback> {
        self.feedback.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, feedback: Feedback) {
        self.feedback.lock().unwrap().push(feedback);
    }
}

/// A cloneable in-memory writer for capturing diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
