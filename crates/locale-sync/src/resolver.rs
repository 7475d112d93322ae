use std::path::PathBuf;

use crate::catalog::CatalogError;
use crate::error::SyncError;
use crate::locale::{LocaleId, LocaleRecord};
use crate::pattern::{PatternError, PatternMode, Placeholder, PlaceholderValues};
use crate::target::TargetSpec;

/// One remote locale paired with the local file it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Id passed to the transfer call.
    pub locale_id: LocaleId,
    pub locale_name: String,
    pub locale_code: String,
    pub tag: Option<String>,
    pub file_format: Option<String>,
    pub path: PathBuf,
}

/// Reject targets whose pattern cannot name one file per locale.
pub fn check_preconditions(spec: &TargetSpec) -> Result<(), PatternError> {
    spec.file_pattern.validate(PatternMode::Download)
}

/// Turn a target and the remote catalog into concrete files.
///
/// Records are kept in catalog order. Two records expanding to the same path
/// both appear in the output. Any malformed record fails the whole target.
pub fn resolve(spec: &TargetSpec, catalog: &[LocaleRecord]) -> Result<Vec<ResolvedFile>, SyncError> {
    let selector = spec.locale_selector();
    let mut files = Vec::new();

    for record in catalog {
        if let Some(selector) = selector
            && !record.matches_selector(selector)
        {
            continue;
        }

        check_record(spec, record)?;

        let path = spec.file_pattern.expand(&PlaceholderValues {
            locale_name: &record.name,
            locale_code: &record.code,
            tag: spec.tag(),
        })?;

        files.push(ResolvedFile {
            locale_id: record.id.clone(),
            locale_name: record.name.clone(),
            locale_code: record.code.clone(),
            tag: spec.tag().map(str::to_owned),
            file_format: spec.format().map(str::to_owned),
            path,
        });
    }

    // The selector may carry the operator's own identifier for the locale.
    if let Some(selector) = selector
        && let [only] = files.as_mut_slice()
    {
        only.locale_id = LocaleId::new(selector);
    }

    tracing::debug!(
        pattern = %spec.file_pattern,
        matched = files.len(),
        "resolved target"
    );

    Ok(files)
}

fn check_record(spec: &TargetSpec, record: &LocaleRecord) -> Result<(), CatalogError> {
    if record.id.is_empty() {
        return Err(CatalogError::Malformed(format!(
            "locale '{}' has no id",
            record.name
        )));
    }

    if spec.file_pattern.uses(Placeholder::LocaleCode) && record.code.is_empty() {
        return Err(CatalogError::MissingCode {
            locale_id: record.id.clone(),
        });
    }

    Ok(())
}
