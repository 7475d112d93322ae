use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote identifier for a locale. Opaque to everything but the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleId(String);

impl LocaleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A locale as known to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleRecord {
    pub id: LocaleId,
    pub name: String,
    /// Language/region code such as `en` or `pt-BR`. May be empty.
    #[serde(default)]
    pub code: String,
}

impl LocaleRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: LocaleId::new(id),
            name: name.into(),
            code: code.into(),
        }
    }

    /// True if `selector` names this locale, either by id or by name.
    pub fn matches_selector(&self, selector: &str) -> bool {
        self.id.as_str() == selector || self.name == selector
    }
}
