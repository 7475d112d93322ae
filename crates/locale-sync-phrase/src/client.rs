use std::sync::Arc;

use locale_sync::{
    CatalogError, Diagnostics, DownloadOptions, LocaleCatalog, LocaleId, LocaleRecord, Transfer,
    TransferError, UploadRequest, UploadSummary,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};

use crate::locale::LocaleResponse;

pub const DEFAULT_HOST: &str = "https://api.phrase.com/v2";

/// Page size used when listing locales.
pub const PER_PAGE: usize = 100;

/// Connection settings for one access token.
#[derive(Clone)]
pub struct PhraseClientConfig {
    pub access_token: String,
    pub host: Option<String>,
}

impl std::fmt::Debug for PhraseClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseClientConfig")
            .field("access_token", &"[redacted]")
            .field("host", &self.host)
            .finish()
    }
}

/// HTTP client for the Phrase API v2.
///
/// Implements both the locale catalog and the file transfer seams.
pub struct PhraseClient {
    config: PhraseClientConfig,
    client: reqwest::Client,
    diagnostics: Arc<Diagnostics>,
}

impl PhraseClient {
    pub fn new(config: PhraseClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            diagnostics: Arc::new(Diagnostics::disabled()),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    fn host(&self) -> &str {
        self.config.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Build an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(self.host())
            .map_err(|e| ApiError::Config(format!("invalid host '{}': {e}", self.host())))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("host '{}' cannot be a base URL", self.host())))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.diagnostics.line(format_args!("{method} {url}"));
        tracing::debug!(%method, %url, "phrase request");

        self.client
            .request(method, url)
            .header("User-Agent", "locale-sync")
            .header("Authorization", format!("token {}", self.config.access_token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        self.diagnostics.line(format_args!("status: {status}"));

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".into());

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(body),
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            _ => ApiError::Http {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn locales_page(
        &self,
        project_id: &str,
        page: usize,
    ) -> Result<Vec<LocaleResponse>, ApiError> {
        let url = self.endpoint(&["projects", project_id, "locales"])?;
        let request = self
            .request(Method::GET, url)
            .query(&[("page", page), ("per_page", PER_PAGE)]);

        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl LocaleCatalog for PhraseClient {
    async fn locales(&self, project_id: &str) -> Result<Vec<LocaleRecord>, CatalogError> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .locales_page(project_id, page)
                .await
                .map_err(|e| match e {
                    ApiError::NotFound(_) => CatalogError::ProjectNotFound(project_id.to_owned()),
                    other => other.into(),
                })?;
            let full = batch.len() >= PER_PAGE;
            records.extend(batch.into_iter().map(LocaleRecord::from));

            if !full {
                break;
            }
            page += 1;
        }

        tracing::debug!(project_id, count = records.len(), "fetched locales");
        Ok(records)
    }
}

#[async_trait::async_trait]
impl Transfer for PhraseClient {
    async fn download(
        &self,
        project_id: &str,
        locale_id: &LocaleId,
        options: &DownloadOptions,
    ) -> Result<Vec<u8>, TransferError> {
        let url = self.endpoint(&[
            "projects",
            project_id,
            "locales",
            locale_id.as_str(),
            "download",
        ])?;
        let request = self
            .request(Method::GET, url)
            .query(&download_query(options));

        let bytes = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        project_id: &str,
        request: &UploadRequest,
    ) -> Result<UploadSummary, TransferError> {
        let url = self.endpoint(&["projects", project_id, "uploads"])?;

        let form = upload_fields(request).into_iter().fold(
            Form::new().part(
                "file",
                Part::bytes(request.content.clone()).file_name(request.file_name.clone()),
            ),
            |form, (key, value)| form.text(key, value),
        );

        self.send(self.request(Method::POST, url).multipart(form))
            .await?
            .json()
            .await
            .map_err(|e| TransferError::Parse(e.to_string()))
    }
}

/// Render download options as query parameters. Unset options are omitted.
pub fn download_query(options: &DownloadOptions) -> Vec<(String, String)> {
    let mut query = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            query.push((key.to_owned(), value));
        }
    };

    push("file_format", options.file_format.clone());
    push("tag", options.tag.clone());
    push("convert_emoji", options.convert_emoji.map(|v| v.to_string()));
    push(
        "include_empty_translations",
        options.include_empty_translations.map(|v| v.to_string()),
    );
    push(
        "keep_notranslate_tags",
        options.keep_notranslate_tags.map(|v| v.to_string()),
    );
    push("encoding", options.encoding.clone());
    push("fallback_locale_id", options.fallback_locale_id.clone());

    for (key, value) in &options.format_options {
        query.push((format!("format_options[{key}]"), value.to_string()));
    }

    query
}

/// Text fields of the upload form. Unset options are omitted.
pub fn upload_fields(request: &UploadRequest) -> Vec<(String, String)> {
    let options = &request.options;
    let mut fields = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            fields.push((key.to_owned(), value));
        }
    };

    push("locale_id", request.locale_id.as_ref().map(LocaleId::to_string));
    push("file_format", options.file_format.clone());
    push("tags", options.tags.clone().filter(|t| !t.trim().is_empty()));
    push(
        "update_translations",
        options.update_translations.map(|v| v.to_string()),
    );
    push(
        "update_descriptions",
        options.update_descriptions.map(|v| v.to_string()),
    );
    push("skip_upload_tags", options.skip_upload_tags.map(|v| v.to_string()));
    push(
        "skip_unverification",
        options.skip_unverification.map(|v| v.to_string()),
    );
    push("convert_emoji", options.convert_emoji.map(|v| v.to_string()));
    push("file_encoding", options.file_encoding.clone());

    for (key, value) in &options.format_options {
        fields.push((format!("format_options[{key}]"), value.to_string()));
    }

    fields
}

/// Transport-level failure, mapped onto the seam's error type by the caller.
#[derive(Debug)]
enum ApiError {
    Config(String),
    Network(String),
    Unauthorized(String),
    NotFound(String),
    Http { status: u16, body: String },
    Parse(String),
}

impl From<ApiError> for CatalogError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Config(msg) | ApiError::Network(msg) => Self::Network(msg),
            ApiError::Unauthorized(msg) => Self::Unauthorized(msg),
            ApiError::NotFound(msg) => Self::ProjectNotFound(msg),
            ApiError::Http { status, body } => Self::Http { status, body },
            ApiError::Parse(msg) => Self::Parse(msg),
        }
    }
}

impl From<ApiError> for TransferError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Config(msg) => Self::Other(msg),
            ApiError::Network(msg) => Self::Network(msg),
            ApiError::Unauthorized(msg) => Self::Unauthorized(msg),
            ApiError::NotFound(msg) => Self::NotFound(msg),
            ApiError::Http { status, body } => Self::Http { status, body },
            ApiError::Parse(msg) => Self::Parse(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use locale_sync::OptionValue;

    use super::*;

    fn client_for(host: &str) -> PhraseClient {
        PhraseClient::new(PhraseClientConfig {
            access_token: "token".into(),
            host: Some(host.into()),
        })
    }

    #[test]
    fn endpoint_appends_to_host_path() {
        let url = client_for("https://api.phrase.com/v2/")
            .endpoint(&["projects", "p1", "locales"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.phrase.com/v2/projects/p1/locales");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = client_for("https://api.phrase.com/v2")
            .endpoint(&["projects", "p1", "locales", "Brazilian Portuguese/x", "download"])
            .unwrap();
        assert_eq!(
            url.path(),
            "/v2/projects/p1/locales/Brazilian%20Portuguese%2Fx/download"
        );
    }

    #[test]
    fn invalid_host_is_reported() {
        assert!(client_for("not a url").endpoint(&["projects"]).is_err());
    }

    #[test]
    fn download_query_skips_unset_options() {
        assert!(download_query(&DownloadOptions::default()).is_empty());
    }

    #[test]
    fn download_query_renders_every_option() {
        let mut options = DownloadOptions {
            file_format: Some("yml".into()),
            tag: Some("web".into()),
            convert_emoji: Some(true),
            include_empty_translations: Some(false),
            ..Default::default()
        };
        options
            .format_options
            .insert("indent".into(), OptionValue::Int(2));

        let query = download_query(&options);
        assert_eq!(
            query,
            vec![
                ("file_format".to_owned(), "yml".to_owned()),
                ("tag".to_owned(), "web".to_owned()),
                ("convert_emoji".to_owned(), "true".to_owned()),
                ("include_empty_translations".to_owned(), "false".to_owned()),
                ("format_options[indent]".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[test]
    fn upload_fields_render_locale_and_options() {
        let mut request = UploadRequest {
            file_name: "de.yml".into(),
            locale_id: Some(LocaleId::new("l2")),
            ..Default::default()
        };
        request.options.file_format = Some("yml".into());
        request.options.tags = Some("web,checkout".into());
        request.options.skip_upload_tags = Some(true);
        request
            .options
            .format_options
            .insert("enclose_in_cdata".into(), OptionValue::Bool(false));

        assert_eq!(
            upload_fields(&request),
            vec![
                ("locale_id".to_owned(), "l2".to_owned()),
                ("file_format".to_owned(), "yml".to_owned()),
                ("tags".to_owned(), "web,checkout".to_owned()),
                ("skip_upload_tags".to_owned(), "true".to_owned()),
                ("format_options[enclose_in_cdata]".to_owned(), "false".to_owned()),
            ]
        );
    }

    #[test]
    fn upload_fields_skip_unset_options() {
        assert!(upload_fields(&UploadRequest::default()).is_empty());
    }

    #[test]
    fn config_debug_hides_token() {
        let config = PhraseClientConfig {
            access_token: "very-secret".into(),
            host: None,
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
