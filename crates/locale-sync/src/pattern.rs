use std::fmt;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Character that makes a pattern match many local files.
pub const WILDCARD: char = '*';

/// A token inside a file pattern that is replaced during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    LocaleName,
    LocaleCode,
    Tag,
}

impl Placeholder {
    /// All recognized placeholders, in the order they are reported.
    pub const ALL: [Placeholder; 3] = [Self::LocaleName, Self::LocaleCode, Self::Tag];

    pub fn token(self) -> &'static str {
        match self {
            Self::LocaleName => "<locale_name>",
            Self::LocaleCode => "<locale_code>",
            Self::Tag => "<tag>",
        }
    }

    fn group(self) -> &'static str {
        match self {
            Self::LocaleName => "locale_name",
            Self::LocaleCode => "locale_code",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// What a pattern is about to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    /// One destination per locale. Wildcards are rejected.
    Download,
    /// May match many local files.
    Upload,
}

/// Errors raised while validating or expanding a file pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("file pattern is empty")]
    Empty,

    #[error(
        "file pattern '{pattern}' for pull cannot include '*'; specify a direct path including the file name"
    )]
    Wildcard { pattern: String },

    #[error("{} can only occur once in a file pattern", join_tokens(.placeholders))]
    DuplicatePlaceholders { placeholders: Vec<Placeholder> },

    #[error("could not determine working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("file pattern is not a valid glob: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("file pattern cannot be matched against paths: {0}")]
    Matcher(#[from] regex::Error),
}

fn join_tokens(placeholders: &[Placeholder]) -> String {
    placeholders
        .iter()
        .map(|p| p.token())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values substituted into a pattern for one locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderValues<'a> {
    pub locale_name: &'a str,
    pub locale_code: &'a str,
    pub tag: Option<&'a str>,
}

/// A local file path template such as `config/locales/<locale_code>.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilePattern(String);

impl FilePattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the placeholder appears anywhere in the pattern.
    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.0.contains(placeholder.token())
    }

    fn occurrences(&self, placeholder: Placeholder) -> usize {
        self.0.matches(placeholder.token()).count()
    }

    /// Check the pattern is usable in `mode`.
    ///
    /// The wildcard rule is checked before placeholder repetition so the
    /// first reported problem is stable.
    pub fn validate(&self, mode: PatternMode) -> Result<(), PatternError> {
        if self.0.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        if mode == PatternMode::Download && self.0.contains(WILDCARD) {
            return Err(PatternError::Wildcard {
                pattern: self.0.clone(),
            });
        }

        let duplicated: Vec<Placeholder> = Placeholder::ALL
            .into_iter()
            .filter(|p| self.occurrences(*p) > 1)
            .collect();

        if !duplicated.is_empty() {
            return Err(PatternError::DuplicatePlaceholders {
                placeholders: duplicated,
            });
        }

        Ok(())
    }

    /// Expand against the current working directory.
    pub fn expand(&self, values: &PlaceholderValues<'_>) -> Result<PathBuf, PatternError> {
        let cwd = std::env::current_dir().map_err(PatternError::WorkingDirectory)?;
        self.expand_in(&cwd, values)
    }

    /// Expand into an absolute path, anchoring relative patterns at `base`.
    ///
    /// The pattern itself is cleaned before substitution; substituted values
    /// are inserted verbatim, separators included.
    pub fn expand_in(
        &self,
        base: &Path,
        values: &PlaceholderValues<'_>,
    ) -> Result<PathBuf, PatternError> {
        let expanded = self
            .template_in(base)?
            .replace(Placeholder::LocaleName.token(), values.locale_name)
            .replace(Placeholder::LocaleCode.token(), values.locale_code)
            .replace(Placeholder::Tag.token(), values.tag.unwrap_or_default());

        Ok(PathBuf::from(expanded))
    }

    /// Glob expression for every local file the pattern can name. Each
    /// placeholder matches like `*`.
    pub fn glob_in(&self, base: &Path) -> Result<String, PatternError> {
        let template = self.template_in(base)?;
        let expression = Placeholder::ALL
            .into_iter()
            .fold(template, |acc, p| acc.replace(p.token(), "*"));
        glob::Pattern::new(&expression)?;
        Ok(expression)
    }

    /// Matcher that recovers placeholder values from a path found by
    /// [`FilePattern::glob_in`].
    pub fn matcher_in(&self, base: &Path) -> Result<PathMatcher, PatternError> {
        let template = self.template_in(base)?;
        let separator = regex::escape(std::path::MAIN_SEPARATOR_STR);
        let segment = format!("[^{separator}]");

        let mut expression = String::from("^");
        let mut rest = template.as_str();
        while let Some(ch) = rest.chars().next() {
            if let Some(p) = Placeholder::ALL
                .into_iter()
                .find(|p| rest.starts_with(p.token()))
            {
                expression.push_str(&format!("(?P<{}>{segment}+)", p.group()));
                rest = &rest[p.token().len()..];
            } else if let Some(after) = rest.strip_prefix("**") {
                match after.strip_prefix(std::path::MAIN_SEPARATOR) {
                    Some(after) => {
                        expression.push_str(&format!("(?:.*{separator})?"));
                        rest = after;
                    }
                    None => {
                        expression.push_str(".*");
                        rest = after;
                    }
                }
            } else if ch == WILDCARD {
                expression.push_str(&segment);
                expression.push('*');
                rest = &rest[1..];
            } else if ch == '?' {
                expression.push_str(&segment);
                rest = &rest[1..];
            } else {
                let len = ch.len_utf8();
                expression.push_str(&regex::escape(&rest[..len]));
                rest = &rest[len..];
            }
        }
        expression.push('$');

        Ok(PathMatcher(Regex::new(&expression)?))
    }

    /// Absolute, lexically cleaned pattern with placeholders still in place.
    fn template_in(&self, base: &Path) -> Result<String, PatternError> {
        let absolute = clean(&base.join(&self.0));
        absolute
            .to_str()
            .map(str::to_owned)
            .ok_or(PatternError::NonUtf8Path(absolute))
    }
}

/// Placeholder values read back out of a local path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedValues {
    pub locale_name: Option<String>,
    pub locale_code: Option<String>,
    pub tag: Option<String>,
}

impl CapturedValues {
    /// True if the path names a locale by code or name.
    pub fn names_locale(&self) -> bool {
        self.locale_name.is_some() || self.locale_code.is_some()
    }
}

/// Compiled form of a pattern used to read placeholders back from paths.
#[derive(Debug, Clone)]
pub struct PathMatcher(Regex);

impl PathMatcher {
    /// `None` when the path does not fit the pattern.
    pub fn captures(&self, path: &Path) -> Option<CapturedValues> {
        let captures = self.0.captures(path.to_str()?)?;
        let value = |p: Placeholder| captures.name(p.group()).map(|m| m.as_str().to_owned());
        Some(CapturedValues {
            locale_name: value(Placeholder::LocaleName),
            locale_code: value(Placeholder::LocaleCode),
            tag: value(Placeholder::Tag),
        })
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilePattern {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Lexically drop `.` segments and fold `..` into its parent.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(name: &'a str, code: &'a str, tag: Option<&'a str>) -> PlaceholderValues<'a> {
        PlaceholderValues {
            locale_name: name,
            locale_code: code,
            tag,
        }
    }

    // -- validate --

    #[test]
    fn wildcard_rejected_for_download() {
        for pattern in ["*.yml", "/locales/*/<locale_code>.yml", "a/**/b.json"] {
            let err = FilePattern::new(pattern)
                .validate(PatternMode::Download)
                .unwrap_err();
            assert!(matches!(err, PatternError::Wildcard { .. }), "{pattern}");
        }
    }

    #[test]
    fn wildcard_allowed_for_upload() {
        FilePattern::new("/locales/*/<locale_code>.yml")
            .validate(PatternMode::Upload)
            .unwrap();
    }

    #[test]
    fn pattern_without_wildcard_passes() {
        FilePattern::new("config/<locale_name>/<locale_code>-<tag>.yml")
            .validate(PatternMode::Download)
            .unwrap();
    }

    #[test]
    fn pattern_without_placeholders_passes() {
        FilePattern::new("config/en.yml")
            .validate(PatternMode::Download)
            .unwrap();
    }

    #[test]
    fn repeated_placeholder_rejected() {
        let err = FilePattern::new("<locale_code>/<locale_code>.yml")
            .validate(PatternMode::Download)
            .unwrap_err();
        match err {
            PatternError::DuplicatePlaceholders { placeholders } => {
                assert_eq!(placeholders, vec![Placeholder::LocaleCode]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn all_repeated_placeholders_reported_in_order() {
        let err = FilePattern::new("<tag>/<locale_name>/<tag>/<locale_name>.yml")
            .validate(PatternMode::Upload)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "<locale_name>, <tag> can only occur once in a file pattern"
        );
    }

    #[test]
    fn wildcard_reported_before_duplicates() {
        let err = FilePattern::new("*/<tag>/<tag>.yml")
            .validate(PatternMode::Download)
            .unwrap_err();
        assert!(matches!(err, PatternError::Wildcard { .. }));
    }

    #[test]
    fn empty_pattern_rejected() {
        let err = FilePattern::new("  ")
            .validate(PatternMode::Download)
            .unwrap_err();
        assert!(matches!(err, PatternError::Empty));
    }

    // -- expand --

    #[test]
    fn expands_all_placeholders() {
        let path = FilePattern::new("/locales/<locale_name>/<locale_code>-<tag>.yml")
            .expand_in(Path::new("/ignored"), &values("German", "de", Some("web")))
            .unwrap();
        assert_eq!(path, PathBuf::from("/locales/German/de-web.yml"));
    }

    #[test]
    fn missing_tag_expands_to_empty() {
        let path = FilePattern::new("/locales/<locale_code><tag>.yml")
            .expand_in(Path::new("/"), &values("English", "en", None))
            .unwrap();
        assert_eq!(path, PathBuf::from("/locales/en.yml"));
    }

    #[test]
    fn relative_pattern_anchored_at_base() {
        let path = FilePattern::new("./config/../locales/<locale_code>.yml")
            .expand_in(Path::new("/srv/app"), &values("English", "en", None))
            .unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/locales/en.yml"));
    }

    #[test]
    fn substituted_separators_are_kept() {
        let path = FilePattern::new("/locales/<locale_name>.yml")
            .expand_in(Path::new("/"), &values("a/../b", "", None))
            .unwrap();
        assert_eq!(path, PathBuf::from("/locales/a/../b.yml"));
    }

    #[test]
    fn expand_is_idempotent() {
        let pattern = FilePattern::new("locales/<locale_code>.yml");
        let v = values("English", "en", Some("x"));
        let first = pattern.expand(&v).unwrap();
        let second = pattern.expand(&v).unwrap();
        assert_eq!(first, second);
        assert!(first.is_absolute());
    }

    #[test]
    fn uses_detects_placeholders() {
        let pattern = FilePattern::new("/locales/<locale_code>.yml");
        assert!(pattern.uses(Placeholder::LocaleCode));
        assert!(!pattern.uses(Placeholder::LocaleName));
        assert!(!pattern.uses(Placeholder::Tag));
    }

    // -- upload matching --

    #[test]
    fn glob_replaces_placeholders_with_wildcards() {
        let expression = FilePattern::new("./locales/<locale_code>/<tag>-*.yml")
            .glob_in(Path::new("/work"))
            .unwrap();
        assert_eq!(expression, "/work/locales/*/*-*.yml");
    }

    #[test]
    fn invalid_glob_is_reported() {
        let err = FilePattern::new("/locales/***.yml")
            .glob_in(Path::new("/"))
            .unwrap_err();
        assert!(matches!(err, PatternError::Glob(_)));
    }

    #[test]
    fn matcher_reads_back_placeholders() {
        let matcher = FilePattern::new("locales/<locale_name>/<locale_code>.<tag>.yml")
            .matcher_in(Path::new("/work"))
            .unwrap();
        let values = matcher
            .captures(Path::new("/work/locales/German/de.web.yml"))
            .unwrap();
        assert_eq!(values.locale_name.as_deref(), Some("German"));
        assert_eq!(values.locale_code.as_deref(), Some("de"));
        assert_eq!(values.tag.as_deref(), Some("web"));
        assert!(values.names_locale());
    }

    #[test]
    fn matcher_honors_wildcards() {
        let matcher = FilePattern::new("/app/**/<locale_code>/*.json")
            .matcher_in(Path::new("/"))
            .unwrap();

        let nested = matcher
            .captures(Path::new("/app/web/admin/fr/messages.json"))
            .unwrap();
        assert_eq!(nested.locale_code.as_deref(), Some("fr"));

        let direct = matcher.captures(Path::new("/app/en/messages.json")).unwrap();
        assert_eq!(direct.locale_code.as_deref(), Some("en"));

        assert!(matcher.captures(Path::new("/app/en/messages.yml")).is_none());
    }

    #[test]
    fn matcher_escapes_literal_characters() {
        let matcher = FilePattern::new("/l10n/strings+(<locale_code>).xml")
            .matcher_in(Path::new("/"))
            .unwrap();
        let values = matcher
            .captures(Path::new("/l10n/strings+(pt-BR).xml"))
            .unwrap();
        assert_eq!(values.locale_code.as_deref(), Some("pt-BR"));
        assert!(matcher.captures(Path::new("/l10n/stringsss(pt).xml")).is_none());
    }

    #[test]
    fn matcher_without_placeholders_captures_nothing() {
        let matcher = FilePattern::new("/l10n/*.yml")
            .matcher_in(Path::new("/"))
            .unwrap();
        let values = matcher.captures(Path::new("/l10n/en.yml")).unwrap();
        assert_eq!(values, CapturedValues::default());
        assert!(!values.names_locale());
    }
}
