use std::collections::HashMap;
use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::catalog::LocaleCatalog;
use crate::diagnostics::Diagnostics;
use crate::error::SyncError;
use crate::feedback::{Feedback, Reporter};
use crate::resolver::{ResolvedFile, check_preconditions, resolve};
use crate::target::{DownloadOptions, TargetSpec};
use crate::transfer::Transfer;

/// Owner-only permissions for created directories and files.
#[cfg(unix)]
const PRIVATE_MODE: u32 = 0o700;

/// Files written by a successful pull of one target, in resolution order.
#[derive(Debug, Default)]
pub struct PullReport {
    pub files: Vec<ResolvedFile>,
}

/// Downloads every resolved locale file of a target to disk.
///
/// Targets and files are processed strictly one after another. The first
/// failing file ends its target; the first failing target ends `pull_all`.
pub struct Puller<'a> {
    catalog: &'a dyn LocaleCatalog,
    transfer: &'a dyn Transfer,
    reporter: &'a dyn Reporter,
    diagnostics: &'a Diagnostics,
}

impl<'a> Puller<'a> {
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

    pub async fn pull_all(&self, specs: &[TargetSpec]) -> Result<Vec<PullReport>, SyncError> {
        let mut reports = Vec::with_capacity(specs.len());
        for spec in specs {
            reports.push(self.pull(spec).await?);
        }
        Ok(reports)
    }

    /// Pull one target. Any failure is reported once before it is returned.
    pub async fn pull(&self, spec: &TargetSpec) -> Result<PullReport, SyncError> {
        let result = self.pull_target(spec).await;
        if let Err(e) = &result {
            self.reporter.report(Feedback::error(format!("pull failed: {e}")));
        }
        result
    }

    async fn pull_target(&self, spec: &TargetSpec) -> Result<PullReport, SyncError> {
        check_preconditions(spec)?;

        let records = self.catalog.locales(&spec.project_id).await?;
        let files = resolve(spec, &records)?;
        self.warn_shared_destinations(&files);

        let mut report = PullReport::default();
        for file in files {
            self.pull_file(spec, &file).await?;

            self.reporter.report(Feedback::success(format!(
                "Downloaded {} to {}",
                describe_locale(&file),
                file.path.display()
            )));
            self.diagnostics.separator();
            report.files.push(file);
        }

        tracing::info!(
            pattern = %spec.file_pattern,
            files = report.files.len(),
            "pulled target"
        );

        Ok(report)
    }

    /// Several locales expanding to one path all get written; the last wins.
    fn warn_shared_destinations(&self, files: &[ResolvedFile]) {
        let mut owners: HashMap<&Path, &ResolvedFile> = HashMap::new();
        for file in files {
            if let Some(first) = owners.insert(file.path.as_path(), file) {
                self.reporter.report(Feedback::warning(format!(
                    "{} and {} both resolve to {}; the later download overwrites the earlier",
                    describe_locale(first),
                    describe_locale(file),
                    file.path.display()
                )));
            }
        }
    }

    async fn pull_file(&self, spec: &TargetSpec, file: &ResolvedFile) -> Result<(), SyncError> {
        ensure_parent_dir(&file.path)?;

        let mut options = spec.download_options.clone();
        if options.file_format.is_none() {
            options.file_format = file.file_format.clone();
        }
        self.trace(spec, file, &options);

        let content = self
            .transfer
            .download(&spec.project_id, &file.locale_id, &options)
            .await
            .map_err(|source| SyncError::Transfer {
                path: file.path.clone(),
                source,
            })?;

        write_private(&file.path, &content)
    }

    fn trace(&self, spec: &TargetSpec, file: &ResolvedFile, options: &DownloadOptions) {
        let d = self.diagnostics;
        if !d.is_enabled() {
            return;
        }
        d.field("Target file pattern", &spec.file_pattern);
        d.field("Actual file path", file.path.display());
        d.field("LocaleID", &file.locale_id);
        d.field("ProjectID", &spec.project_id);
        d.optional_field("FileFormat", options.file_format.as_deref());
        d.optional_field("ConvertEmoji", options.convert_emoji);
        d.optional_field("IncludeEmptyTranslations", options.include_empty_translations);
        d.optional_field("KeepNotranslateTags", options.keep_notranslate_tags);
        d.optional_field("Tag", options.tag.as_deref());
        d.field("FormatOptions", format_args!("{:?}", options.format_options));
    }
}

fn describe_locale(file: &ResolvedFile) -> String {
    if file.locale_code.is_empty() {
        format!("{} ({})", file.locale_name, file.locale_id)
    } else {
        format!("{} [{}] ({})", file.locale_name, file.locale_code, file.locale_id)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), SyncError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(PRIVATE_MODE);
    }

    builder.create(parent).map_err(|source| SyncError::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}

fn write_private(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PRIVATE_MODE);
    }

    options
        .open(path)
        .and_then(|mut file| file.write_all(content))
        .map_err(|source| SyncError::Filesystem {
            path: path.to_path_buf(),
            source,
        })
}
