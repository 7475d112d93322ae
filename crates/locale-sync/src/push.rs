use std::path::{Path, PathBuf};

use crate::catalog::LocaleCatalog;
use crate::diagnostics::Diagnostics;
use crate::error::SyncError;
use crate::feedback::{Feedback, Reporter};
use crate::locale::{LocaleId, LocaleRecord};
use crate::pattern::{CapturedValues, PatternError, PatternMode};
use crate::source::SourceSpec;
use crate::transfer::{Transfer, UploadRequest, UploadSummary};

/// A local file matched by a source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub values: CapturedValues,
}

/// One accepted upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub locale_id: Option<LocaleId>,
    pub summary: UploadSummary,
}

/// Files uploaded for one source, in path order.
#[derive(Debug, Default)]
pub struct PushReport {
    pub files: Vec<UploadedFile>,
}

/// Uploads every local file a source pattern matches.
///
/// Sources and files are processed one after another. The first failing file
/// ends its source; the first failing source ends `push_all`.
pub struct Pusher<'a> {
    catalog: &'a dyn LocaleCatalog,
    transfer: &'a dyn Transfer,
    reporter: &'a dyn Reporter,
    diagnostics: &'a Diagnostics,
}

impl<'a> Pusher<'a> {
    pub fn new(
        catalog: &'a dyn LocaleCatalog,
        transfer: &'a dyn Transfer,
        reporter: &'a dyn Reporter,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            catalog,
            transfer,
            reporter,
            diagnostics,
        }
    }

    pub async fn push_all(&self, specs: &[SourceSpec]) -> Result<Vec<PushReport>, SyncError> {
        let mut reports = Vec::with_capacity(specs.len());
        for spec in specs {
            reports.push(self.push(spec).await?);
        }
        Ok(reports)
    }

    /// Push one source. Any failure is reported once before it is returned.
    pub async fn push(&self, spec: &SourceSpec) -> Result<PushReport, SyncError> {
        let result = self.push_source(spec).await;
        if let Err(e) = &result {
            self.reporter.report(Feedback::error(format!("push failed: {e}")));
        }
        result
    }

    async fn push_source(&self, spec: &SourceSpec) -> Result<PushReport, SyncError> {
        spec.file_pattern.validate(PatternMode::Upload)?;

        let files = local_files(spec)?;
        if files.is_empty() {
            return Err(SyncError::NoLocalFiles {
                pattern: spec.file_pattern.to_string(),
            });
        }

        // Fetched on first use and shared by every file of the source.
        let mut remote: Option<Vec<LocaleRecord>> = None;
        let mut report = PushReport::default();

        for file in files {
            let locale_id = self.locale_for(spec, &file, &mut remote).await?;
            let summary = self.push_file(spec, &file, locale_id.as_ref()).await?;

            self.reporter.report(Feedback::success(format!(
                "Uploaded {} (upload {}, state: {})",
                file.path.display(),
                summary.id,
                summary.state
            )));
            self.diagnostics.separator();
            report.files.push(UploadedFile {
                path: file.path,
                locale_id,
                summary,
            });
        }

        tracing::info!(
            pattern = %spec.file_pattern,
            files = report.files.len(),
            "pushed source"
        );

        Ok(report)
    }

    /// The configured locale, else the remote locale the path names, else none.
    async fn locale_for(
        &self,
        spec: &SourceSpec,
        file: &LocalFile,
        remote: &mut Option<Vec<LocaleRecord>>,
    ) -> Result<Option<LocaleId>, SyncError> {
        if let Some(id) = spec.locale_id() {
            return Ok(Some(LocaleId::new(id)));
        }
        if !file.values.names_locale() {
            return Ok(None);
        }

        if remote.is_none() {
            *remote = Some(self.catalog.locales(&spec.project_id).await?);
        }
        let records = remote.as_deref().unwrap_or_default();

        records
            .iter()
            .find(|record| names_record(&file.values, record))
            .map(|record| Some(record.id.clone()))
            .ok_or_else(|| SyncError::UnknownLocale {
                path: file.path.clone(),
            })
    }

    async fn push_file(
        &self,
        spec: &SourceSpec,
        file: &LocalFile,
        locale_id: Option<&LocaleId>,
    ) -> Result<UploadSummary, SyncError> {
        let content = std::fs::read(&file.path).map_err(|source| SyncError::Filesystem {
            path: file.path.clone(),
            source,
        })?;

        let mut options = spec.upload_options.clone();
        if options.file_format.is_none() {
            options.file_format = spec.format().map(str::to_owned);
        }
        if let Some(tag) = &file.values.tag {
            options.add_tag(tag);
        }

        let request = UploadRequest {
            file_name: file_name(&file.path),
            content,
            locale_id: locale_id.cloned(),
            options,
        };
        self.trace(spec, file, &request);

        self.transfer
            .upload(&spec.project_id, &request)
            .await
            .map_err(|source| SyncError::Transfer {
                path: file.path.clone(),
                source,
            })
    }

    fn trace(&self, spec: &SourceSpec, file: &LocalFile, request: &UploadRequest) {
        let d = self.diagnostics;
        if !d.is_enabled() {
            return;
        }
        d.field("Source file pattern", &spec.file_pattern);
        d.field("Actual file path", file.path.display());
        d.optional_field("LocaleID", request.locale_id.as_ref());
        d.field("ProjectID", &spec.project_id);
        d.optional_field("FileFormat", request.options.file_format.as_deref());
        d.optional_field("Tags", request.options.tags.as_deref());
        d.optional_field("UpdateTranslations", request.options.update_translations);
        d.field("FormatOptions", format_args!("{:?}", request.options.format_options));
    }
}

/// Every regular file the pattern matches, sorted by path.
pub fn local_files(spec: &SourceSpec) -> Result<Vec<LocalFile>, SyncError> {
    let cwd = std::env::current_dir().map_err(PatternError::WorkingDirectory)?;
    local_files_in(spec, &cwd)
}

/// Like [`local_files`], anchoring relative patterns at `base`.
pub fn local_files_in(spec: &SourceSpec, base: &Path) -> Result<Vec<LocalFile>, SyncError> {
    let expression = spec.file_pattern.glob_in(base)?;
    let matcher = spec.file_pattern.matcher_in(base)?;

    let entries = glob::glob(&expression).map_err(PatternError::from)?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SyncError::Filesystem {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if !path.is_file() {
            continue;
        }
        // Placeholders must match a non-empty value; the glob alone is looser.
        let Some(values) = matcher.captures(&path) else {
            continue;
        };
        files.push(LocalFile { path, values });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(%expression, matched = files.len(), "matched local files");
    Ok(files)
}

fn names_record(values: &CapturedValues, record: &LocaleRecord) -> bool {
    let code_ok = values
        .locale_code
        .as_deref()
        .is_none_or(|code| code == record.code);
    let name_ok = values
        .locale_name
        .as_deref()
        .is_none_or(|name| name == record.name);
    code_ok && name_ok
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
