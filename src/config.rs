use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use signoz_sdk::signoz_query::ConnectionSettings;
use signoz_sdk::{
    ClientConfig, DEFAULT_API_KEY_HEADER, DEFAULT_AUTOCOMPLETE_LIMIT, DEFAULT_TIMEOUT,
};

pub static CONFIG: OnceCell<Configuration> = OnceCell::new();

const CONFIG_FILE: &str = "signoz-datasource.toml";
const ENV_PREFIX: &str = "SIGNOZ_DS__";

/// Process-wide plugin configuration, layered as defaults, then
/// `signoz-datasource.toml`, then `SIGNOZ_DS__*` environment variables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    /// Backend URL used when a data source defines none
    pub default_url: Option<String>,
    /// Query-range endpoint path relative to the backend URL
    pub query_path: String,
    /// Header carrying the API key
    pub api_key_header: String,
    /// Timeout applied to every backend request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Maximum autocomplete candidates fetched per lookup
    pub autocomplete_limit: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            default_url: None,
            query_path: signoz_sdk::signoz_api::QUERY_RANGE_PATH.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            autocomplete_limit: DEFAULT_AUTOCOMPLETE_LIMIT,
        }
    }
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Loaded configuration, falling back to defaults when loading fails.
    pub fn global() -> &'static Configuration {
        CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                tracing::warn!("Failed to load configuration, using defaults: {e}");
                Self::default()
            })
        })
    }

    pub fn client_config(&self, connection: ConnectionSettings) -> ClientConfig {
        ClientConfig {
            connection,
            query_path: self.query_path.clone(),
            api_key_header: self.api_key_header.clone(),
            timeout: self.timeout,
            autocomplete_limit: self.autocomplete_limit,
        }
    }
}
