use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::FilePattern;

/// A scalar option value forwarded to the remote service as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Options for downloading one locale file.
///
/// None of these are interpreted locally except `file_format` and `tag`,
/// which also feed path expansion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadOptions {
    pub file_format: Option<String>,
    pub tag: Option<String>,
    pub convert_emoji: Option<bool>,
    pub include_empty_translations: Option<bool>,
    pub keep_notranslate_tags: Option<bool>,
    pub encoding: Option<String>,
    pub fallback_locale_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub format_options: BTreeMap<String, OptionValue>,
}

/// One configured sync unit with every default already applied.
#[derive(Clone)]
pub struct TargetSpec {
    pub file_pattern: FilePattern,
    pub project_id: String,
    pub access_token: String,
    pub file_format: Option<String>,
    /// Locale id or locale name restricting the target to a single locale.
    pub locale_selector: Option<String>,
    pub download_options: DownloadOptions,
}

impl TargetSpec {
    pub fn new(file_pattern: impl Into<FilePattern>, project_id: impl Into<String>) -> Self {
        Self {
            file_pattern: file_pattern.into(),
            project_id: project_id.into(),
            access_token: String::new(),
            file_format: None,
            locale_selector: None,
            download_options: DownloadOptions::default(),
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

    pub fn with_locale_selector(mut self, selector: impl Into<String>) -> Self {
        self.locale_selector = Some(selector.into());
        self
    }

    pub fn with_download_options(mut self, options: DownloadOptions) -> Self {
        self.download_options = options;
        self
    }

    /// The selector, treating an empty string as unset.
    pub fn locale_selector(&self) -> Option<&str> {
        self.locale_selector.as_deref().filter(|s| !s.is_empty())
    }

    pub fn tag(&self) -> Option<&str> {
        self.download_options.tag.as_deref()
    }

    /// Format from the download options, falling back to the target's format.
    pub fn format(&self) -> Option<&str> {
        self.download_options
            .file_format
            .as_deref()
            .or(self.file_format.as_deref())
    }
}

impl fmt::Debug for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetSpec")
            .field("file_pattern", &self.file_pattern)
            .field("project_id", &self.project_id)
            .field("access_token", &"[redacted]")
            .field("file_format", &self.file_format)
            .field("locale_selector", &self.locale_selector)
            .field("download_options", &self.download_options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_format_wins_over_target_format() {
        let spec = TargetSpec::new("a.yml", "p1")
            .with_file_format("yml")
            .with_download_options(DownloadOptions {
                file_format: Some("json".into()),
                ..Default::default()
            });
        assert_eq!(spec.format(), Some("json"));
    }

    #[test]
    fn target_format_used_when_options_silent() {
        let spec = TargetSpec::new("a.yml", "p1").with_file_format("yml");
        assert_eq!(spec.format(), Some("yml"));
    }

    #[test]
    fn empty_selector_is_unset() {
        let spec = TargetSpec::new("a.yml", "p1").with_locale_selector("");
        assert_eq!(spec.locale_selector(), None);
    }

    #[test]
    fn debug_hides_access_token() {
        let spec = TargetSpec::new("a.yml", "p1").with_access_token("secret-token");
        assert!(!format!("{spec:?}").contains("secret-token"));
    }

    #[test]
    fn download_options_parse_known_keys() {
        let yaml = "tag: web\nconvert_emoji: true\nformat_options:\n  indent: 2\n  quote: single\n";
        let options: DownloadOptions = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(options.tag.as_deref(), Some("web"));
        assert_eq!(options.convert_emoji, Some(true));
        assert_eq!(options.format_options["indent"], OptionValue::Int(2));
        assert_eq!(options.format_options["quote"].to_string(), "single");
    }

    #[test]
    fn download_options_reject_unknown_keys() {
        let result = serde_yaml_ng::from_str::<DownloadOptions>("no_such_option: 1\n");
        assert!(result.is_err());
    }
}
