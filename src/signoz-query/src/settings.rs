//! Data source instance settings.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Plain settings, persisted with the data source definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSettings {
    #[serde(default)]
    pub signoz_url: Option<String>,
}

/// Secret settings. Only ever written by the UI, never read back.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecureSettings {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for SecureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Write-only secret as seen by a settings form: whether a value is stored,
/// plus a value the user typed that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecretField {
    configured: bool,
    pending: Option<String>,
}

impl SecretField {
    /// State for a secret the store reports as `configured` or not.
    pub fn new(configured: bool) -> Self {
        Self {
            configured,
            pending: None,
        }
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.pending = Some(value.into());
    }

    /// Forgets both the stored flag and any pending write.
    pub fn reset(&mut self) {
        self.configured = false;
        self.pending = Some(String::new());
    }

    pub fn is_configured(&self) -> bool {
        self.configured || self.pending.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Value to submit on save, if the user changed it.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}

/// Everything needed to reach the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ConnectionSettings {
    /// Requires both a URL and an API key. Trailing slashes are trimmed from
    /// the URL.
    pub fn validate(base_url: Option<&str>, api_key: Option<&str>) -> Result<Self, SettingsError> {
        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingUrl)?;
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::MissingApiKey)?;

        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}
