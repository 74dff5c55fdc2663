use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use signoz_api::{ApiErrorBody, FetchEnvelope, QueryRangeRequest, QUERY_RANGE_PATH};
use signoz_query::autocomplete::{self, AutocompleteKind, Suggestion};
use signoz_query::{
    build_connectivity_request, BuilderTranslator, ConnectionSettings, QueryModel,
    QueryTranslator, Series, TimeRange,
};
use url::Url;

use crate::health::{fetch_error_message, unexpected_status_message, ConnectionStatus};
use crate::SdkError;

/// Header the backend reads the API key from.
pub const DEFAULT_API_KEY_HEADER: &str = "SIGNOZ-API-KEY";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of autocomplete candidates fetched per lookup.
pub const DEFAULT_AUTOCOMPLETE_LIMIT: u32 = 1000;

/// Window the connectivity probe and autocomplete lookups query over.
const PROBE_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Settings for a [`SignozClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connection: ConnectionSettings,
    /// Path of the query-range endpoint relative to the base URL
    pub query_path: String,
    pub api_key_header: String,
    pub timeout: Duration,
    pub autocomplete_limit: u32,
}

impl ClientConfig {
    pub fn new(connection: ConnectionSettings) -> Self {
        Self {
            connection,
            query_path: QUERY_RANGE_PATH.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            autocomplete_limit: DEFAULT_AUTOCOMPLETE_LIMIT,
        }
    }
}

/// HTTP client for the SigNoz query-range API
#[derive(Debug, Clone)]
pub struct SignozClient {
    config: ClientConfig,
    query_url: Url,
    http: reqwest::Client,
    translator: BuilderTranslator,
}

impl SignozClient {
    pub fn new(config: ClientConfig) -> Result<Self, SdkError> {
        let query_url = Url::parse(&format!(
            "{}{}",
            config.connection.base_url.trim_end_matches('/'),
            config.query_path
        ))?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            query_url,
            http,
            translator: BuilderTranslator,
        })
    }

    /// Fully resolved query-range URL.
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Runs one panel query and decodes the returned series.
    #[tracing::instrument(skip(self, query), fields(ref_id = ?query.ref_id))]
    pub async fn query_range(
        &self,
        query: &QueryModel,
        range: TimeRange,
        step: i32,
    ) -> Result<Vec<Series>, SdkError> {
        let request = self.translator.build_request(query, range, step)?;
        let resp = self.post(self.query_url.clone(), &request).await?;
        let body = handle_response(resp).await?;

        let envelope = serde_json::to_value(FetchEnvelope { data: body })?;
        let series = self.translator.decode_response(query, &envelope)?;
        tracing::debug!("Decoded {} series", series.len());
        Ok(series)
    }

    /// Attribute keys matching `input`. Lookup failures yield only the
    /// custom entry.
    pub async fn suggest_keys(&self, input: &str) -> Vec<Suggestion> {
        let request = autocomplete::build_keys_request(
            recent_window(),
            self.config.autocomplete_limit,
        );
        let candidates = self
            .fetch_candidates(AutocompleteKind::Keys, &request)
            .await;
        autocomplete::filter_suggestions(&candidates, input)
    }

    /// Values of attribute `key` matching `input`. Lookup failures yield only
    /// the custom entry.
    pub async fn suggest_values(&self, key: &str, input: &str) -> Vec<Suggestion> {
        let request = autocomplete::build_values_request(
            key,
            recent_window(),
            self.config.autocomplete_limit,
        );
        let candidates = self
            .fetch_candidates(AutocompleteKind::Values, &request)
            .await;
        autocomplete::filter_suggestions(&candidates, input)
    }

    /// Posts an empty builder query and reports whether the backend accepted it.
    #[tracing::instrument(skip(self), fields(url = %self.query_url))]
    pub async fn test_connection(&self) -> ConnectionStatus {
        let request = build_connectivity_request(recent_window());

        match self.post(self.query_url.clone(), &request).await {
            Ok(resp) if resp.status() == StatusCode::OK => {
                ConnectionStatus::success(status_text(resp.status()))
            }
            Ok(resp) if resp.status().is_success() => {
                ConnectionStatus::error(unexpected_status_message(status_text(resp.status())))
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                tracing::warn!("Connectivity check failed with status {status}");
                ConnectionStatus::error(fetch_error_message(status_text(status), &body))
            }
            Err(e) => {
                tracing::warn!("Connectivity check failed: {e}");
                let status_text = e.status().map(status_text).unwrap_or_default();
                ConnectionStatus::error(fetch_error_message(status_text, ""))
            }
        }
    }

    async fn fetch_candidates(
        &self,
        kind: AutocompleteKind,
        request: &QueryRangeRequest,
    ) -> Vec<String> {
        match self.try_fetch_candidates(kind, request).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Autocomplete lookup for {} failed: {e}", kind.as_str());
                Vec::new()
            }
        }
    }

    async fn try_fetch_candidates(
        &self,
        kind: AutocompleteKind,
        request: &QueryRangeRequest,
    ) -> Result<Vec<String>, SdkError> {
        let mut url = self.query_url.clone();
        url.query_pairs_mut()
            .append_pair("autocomplete", kind.as_str());

        let resp = self.post(url, request).await?;
        let body = handle_response(resp).await?;
        let envelope = serde_json::to_value(FetchEnvelope { data: body })?;
        Ok(autocomplete::extract_candidates(&envelope, kind))
    }

    /// Send a POST request with a JSON body
    async fn post(
        &self,
        url: Url,
        body: &QueryRangeRequest,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.http
            .post(url)
            .header(
                self.config.api_key_header.as_str(),
                self.config.connection.api_key.as_str(),
            )
            .json(body)
            .send()
            .await
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value, SdkError> {
    if resp.status().is_success() {
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .and_then(|detail| detail.message)
            .unwrap_or(text);
        Err(SdkError::Api { status, message })
    }
}

fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or_default()
}

fn recent_window() -> TimeRange {
    let now = Utc::now().timestamp_millis();
    TimeRange::new(now - PROBE_WINDOW_MS, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig::new(ConnectionSettings {
            base_url: base_url.to_string(),
            api_key: "key".to_string(),
        })
    }

    #[test]
    fn test_query_url_joins_path() {
        let client = SignozClient::new(config("https://signoz.example.com/")).unwrap();
        assert_eq!(
            client.query_url().as_str(),
            "https://signoz.example.com/api/v4/query_range"
        );
    }

    #[test]
    fn test_query_url_keeps_base_path() {
        let client = SignozClient::new(config("https://example.com/signoz")).unwrap();
        assert_eq!(
            client.query_url().as_str(),
            "https://example.com/signoz/api/v4/query_range"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = SignozClient::new(config("not a url")).unwrap_err();
        assert!(matches!(err, SdkError::Url(_)));
    }

    #[test]
    fn test_recent_window_is_ordered() {
        let window = recent_window();
        assert_eq!(window.to - window.from, PROBE_WINDOW_MS);
    }
}
