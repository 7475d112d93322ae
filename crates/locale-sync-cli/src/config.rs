use std::path::{Path, PathBuf};

use locale_sync::{DownloadOptions, FilePattern, SourceSpec, TargetSpec, UploadOptions};
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};

/// File name looked up in the working directory, then in the home directory.
pub const CONFIG_FILE_NAME: &str = ".phrase.yml";

/// Environment variable that overrides the configured access token.
pub const TOKEN_ENV: &str = "PHRASE_ACCESS_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration file found; create {} or pass --config", CONFIG_FILE_NAME)]
    NotFound,

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("no targets for download specified")]
    NoTargets,

    #[error("no targets could be identified; refine the targets list in your config")]
    NoValidTargets,

    #[error("no sources for upload specified")]
    NoSources,

    #[error("no sources could be identified; refine the sources list in your config")]
    NoValidSources,

    #[error("entry {index}: 'file' is required")]
    MissingFile { index: usize },

    #[error("entry {index}: no project_id set on the entry or at the top level")]
    MissingProjectId { index: usize },

    #[error(
        "entry {index}: no access_token set on the entry, at the top level or in {}",
        TOKEN_ENV
    )]
    MissingAccessToken { index: usize },

    #[error("entry {index}: params.locale_id must be a string")]
    InvalidLocaleId { index: usize },

    #[error("entry {index}: invalid params: {source}")]
    InvalidParams {
        index: usize,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("no project_id configured; pass --project-id")]
    MissingDefaultProjectId,

    #[error(
        "no access_token configured; set it in the config file or in {}",
        TOKEN_ENV
    )]
    MissingDefaultAccessToken,
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub phrase: PhraseConfig,
}

/// Top-level settings; every field doubles as the default for targets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhraseConfig {
    pub access_token: Option<String>,
    pub project_id: Option<String>,
    pub file_format: Option<String>,
    pub host: Option<String>,
    pub pull: Option<PullConfig>,
    pub push: Option<PushConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullConfig {
    /// Null entries are allowed and skipped.
    pub targets: Option<Vec<Option<FileEntry>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushConfig {
    /// Null entries are allowed and skipped.
    pub sources: Option<Vec<Option<FileEntry>>>,
}

/// A pull target or push source as written in the file, before defaults
/// are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    pub file: Option<String>,
    pub project_id: Option<String>,
    pub access_token: Option<String>,
    pub file_format: Option<String>,
    pub params: Option<Mapping>,
}

/// Values a target falls back to for fields it leaves unset.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    pub access_token: Option<String>,
    pub project_id: Option<String>,
    pub file_format: Option<String>,
}

impl PhraseConfig {
    /// Top-level defaults. A token from the environment wins over the file.
    pub fn defaults(&self, env_token: Option<String>) -> Defaults {
        Defaults {
            access_token: non_empty(env_token).or_else(|| non_empty(self.access_token.clone())),
            project_id: non_empty(self.project_id.clone()),
            file_format: non_empty(self.file_format.clone()),
        }
    }

    /// Token for commands that run with the top-level credentials.
    pub fn default_access_token(&self, env_token: Option<String>) -> Result<String, ConfigError> {
        self.defaults(env_token)
            .access_token
            .ok_or(ConfigError::MissingDefaultAccessToken)
    }

    /// Build every pull target with defaults applied.
    pub fn pull_targets(&self, env_token: Option<String>) -> Result<Vec<TargetSpec>, ConfigError> {
        let entries = self
            .pull
            .as_ref()
            .and_then(|pull| pull.targets.as_deref())
            .filter(|targets| !targets.is_empty())
            .ok_or(ConfigError::NoTargets)?;

        let targets = resolve_all(entries, &self.defaults(env_token), FileEntry::into_target)?;
        if targets.is_empty() {
            return Err(ConfigError::NoValidTargets);
        }
        Ok(targets)
    }

    /// Build every push source with defaults applied.
    pub fn push_sources(&self, env_token: Option<String>) -> Result<Vec<SourceSpec>, ConfigError> {
        let entries = self
            .push
            .as_ref()
            .and_then(|push| push.sources.as_deref())
            .filter(|sources| !sources.is_empty())
            .ok_or(ConfigError::NoSources)?;

        let sources = resolve_all(entries, &self.defaults(env_token), FileEntry::into_source)?;
        if sources.is_empty() {
            return Err(ConfigError::NoValidSources);
        }
        Ok(sources)
    }
}

fn resolve_all<T>(
    entries: &[Option<FileEntry>],
    defaults: &Defaults,
    build: impl Fn(Merged, usize) -> Result<T, ConfigError>,
) -> Result<Vec<T>, ConfigError> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| entry.as_ref().map(|e| (index, e)))
        .map(|(index, entry)| build(entry.clone().merge(index, defaults)?, index))
        .collect()
}

/// An entry with defaults applied and `locale_id` taken out of its params.
pub struct Merged {
    pub file: String,
    pub project_id: String,
    pub access_token: String,
    pub file_format: Option<String>,
    pub locale_id: Option<String>,
    pub params: Mapping,
}

impl FileEntry {
    /// Merge with `defaults`. Fields set on the entry win.
    pub fn merge(self, index: usize, defaults: &Defaults) -> Result<Merged, ConfigError> {
        let file = non_empty(self.file).ok_or(ConfigError::MissingFile { index })?;
        let project_id = non_empty(self.project_id)
            .or_else(|| defaults.project_id.clone())
            .ok_or(ConfigError::MissingProjectId { index })?;
        let access_token = non_empty(self.access_token)
            .or_else(|| defaults.access_token.clone())
            .ok_or(ConfigError::MissingAccessToken { index })?;
        let file_format = non_empty(self.file_format).or_else(|| defaults.file_format.clone());

        let mut params = self.params.unwrap_or_default();
        let locale_id = extract_locale_selector(&mut params, index)?;

        Ok(Merged {
            file,
            project_id,
            access_token,
            file_format,
            locale_id,
            params,
        })
    }

    /// Turn `params` into typed download options.
    fn into_target(merged: Merged, index: usize) -> Result<TargetSpec, ConfigError> {
        Ok(TargetSpec {
            file_pattern: FilePattern::new(merged.file),
            project_id: merged.project_id,
            access_token: merged.access_token,
            file_format: merged.file_format,
            locale_selector: merged.locale_id,
            download_options: typed_params(merged.params, index)?,
        })
    }

    /// Turn `params` into typed upload options.
    fn into_source(merged: Merged, index: usize) -> Result<SourceSpec, ConfigError> {
        let upload_options: UploadOptions = typed_params(merged.params, index)?;
        Ok(SourceSpec {
            file_pattern: FilePattern::new(merged.file),
            project_id: merged.project_id,
            access_token: merged.access_token,
            file_format: merged.file_format,
            locale_id: merged.locale_id,
            upload_options,
        })
    }
}

fn typed_params<T: serde::de::DeserializeOwned>(
    params: Mapping,
    index: usize,
) -> Result<T, ConfigError> {
    serde_yaml_ng::from_value(Value::Mapping(params))
        .map_err(|source| ConfigError::InvalidParams { index, source })
}

/// Remove `locale_id` from the params. Neither option set has such a field,
/// so it has to be taken out before the rest is applied.
pub fn extract_locale_selector(
    params: &mut Mapping,
    index: usize,
) -> Result<Option<String>, ConfigError> {
    match params.remove("locale_id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(non_empty(Some(id))),
        Some(_) => Err(ConfigError::InvalidLocaleId { index }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Locate the config file: the explicit path, else `./.phrase.yml`, else `~/.phrase.yml`.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

pub fn parse(contents: &str) -> Result<PhraseConfig, serde_yaml_ng::Error> {
    let file: ConfigFile = serde_yaml_ng::from_str(contents)?;
    Ok(file.phrase)
}

/// Load the config file if there is one. An explicit path has to exist.
pub fn load_optional(explicit: Option<&Path>) -> Result<Option<PhraseConfig>, ConfigError> {
    config_path(explicit).map(|path| read(&path)).transpose()
}

fn read(path: &Path) -> Result<PhraseConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn env_token() -> Option<String> {
    std::env::var(TOKEN_ENV).ok()
}
