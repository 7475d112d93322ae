use locale_sync::LocaleRecord;
use serde::Deserialize;

/// One entry of `GET /projects/{project_id}/locales`.
#[derive(Debug, Deserialize)]
pub struct LocaleResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub default: bool,
}

impl From<LocaleResponse> for LocaleRecord {
    fn from(value: LocaleResponse) -> Self {
        LocaleRecord::new(value.id, value.name, value.code.unwrap_or_default())
    }
}
