use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::FilePattern;
use crate::target::OptionValue;

/// Options sent along with every uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadOptions {
    pub file_format: Option<String>,
    /// Comma-separated tags attached to every key in the file.
    pub tags: Option<String>,
    pub update_translations: Option<bool>,
    pub update_descriptions: Option<bool>,
    pub skip_upload_tags: Option<bool>,
    pub skip_unverification: Option<bool>,
    pub convert_emoji: Option<bool>,
    pub file_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub format_options: BTreeMap<String, OptionValue>,
}

impl UploadOptions {
    /// Append a tag unless it is already listed.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() || self.tag_list().any(|t| t == tag) {
            return;
        }
        self.tags = Some(match self.tags.take().filter(|t| !t.trim().is_empty()) {
            Some(existing) => format!("{existing},{tag}"),
            None => tag.to_owned(),
        });
    }

    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// One configured upload unit with every default already applied.
///
/// Unlike a pull target, the pattern may contain `*` and match many files.
#[derive(Clone)]
pub struct SourceSpec {
    pub file_pattern: FilePattern,
    pub project_id: String,
    pub access_token: String,
    pub file_format: Option<String>,
    /// Locale every matched file is uploaded into.
    pub locale_id: Option<String>,
    pub upload_options: UploadOptions,
}

impl SourceSpec {
    pub fn new(file_pattern: impl Into<FilePattern>, project_id: impl Into<String>) -> Self {
        Self {
            file_pattern: file_pattern.into(),
            project_id: project_id.into(),
            access_token: String::new(),
            file_format: None,
            locale_id: None,
            upload_options: UploadOptions::default(),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn with_file_format(mut self, format: impl Into<String>) -> Self {
        self.file_format = Some(format.into());
        self
    }

    pub fn with_locale_id(mut self, locale_id: impl Into<String>) -> Self {
        self.locale_id = Some(locale_id.into());
        self
    }

    pub fn with_upload_options(mut self, options: UploadOptions) -> Self {
        self.upload_options = options;
        self
    }

    pub fn locale_id(&self) -> Option<&str> {
        self.locale_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn format(&self) -> Option<&str> {
        self.upload_options
            .file_format
            .as_deref()
            .or(self.file_format.as_deref())
    }
}

impl fmt::Debug for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSpec")
            .field("file_pattern", &self.file_pattern)
            .field("project_id", &self.project_id)
            .field("access_token", &"[redacted]")
            .field("file_format", &self.file_format)
            .field("locale_id", &self.locale_id)
            .field("upload_options", &self.upload_options)
            .finish()
    }
}
