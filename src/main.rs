mod config;
mod conversion;

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use grafana_plugin_sdk::{backend, data, prelude::*};
use signoz_sdk::signoz_query::{
    ConnectionSettings, DataSourceSettings, QueryModel, SecureSettings, SettingsError, TimeRange,
};
use signoz_sdk::{ConnectionStatus, SdkError, SignozApi, SignozClient};
use thiserror::Error;

use crate::config::Configuration;

type InstanceSettings = backend::DataSourceInstanceSettings<DataSourceSettings, SecureSettings>;

/// SigNoz datasource plugin for Grafana
#[derive(Clone, Debug, Default, GrafanaPlugin)]
#[grafana_plugin(
    plugin_type = "datasource",
    json_data = "DataSourceSettings",
    secure_json_data = "SecureSettings"
)]
pub struct SignozDataSource;

/// Query error type
#[derive(Debug, Error)]
#[error("Error querying SigNoz for query {}", .ref_id)]
pub struct QueryError {
    ref_id: String,
    #[source]
    source: anyhow::Error,
}

impl backend::DataQueryError for QueryError {
    fn ref_id(self) -> String {
        self.ref_id
    }
}

/// Failure to build a backend client for a request.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request carries no data source instance settings")]
    MissingInstanceSettings,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

impl SignozDataSource {
    /// Build a client for the data source instance a request was made for.
    fn client_for(settings: Option<&InstanceSettings>) -> Result<Arc<dyn SignozApi>, ClientError> {
        let settings = settings.ok_or(ClientError::MissingInstanceSettings)?;
        let connection = connection_settings(settings, Configuration::global())?;
        let client = SignozClient::new(Configuration::global().client_config(connection))?;
        Ok(Arc::new(client))
    }
}

/// Resolve the backend URL and API key of a data source instance. The URL
/// comes from `signozUrl`, then the instance URL, then the configured default.
fn connection_settings(
    settings: &InstanceSettings,
    config: &Configuration,
) -> Result<ConnectionSettings, SettingsError> {
    let base_url = resolve_base_url(
        settings.json_data.signoz_url.as_deref(),
        &settings.url,
        config.default_url.as_deref(),
    );
    let api_key = settings.decrypted_secure_json_data.api_key.as_deref();

    ConnectionSettings::validate(base_url, api_key)
}

fn resolve_base_url<'a>(
    signoz_url: Option<&'a str>,
    instance_url: &'a str,
    default_url: Option<&'a str>,
) -> Option<&'a str> {
    [signoz_url, Some(instance_url), default_url]
        .into_iter()
        .flatten()
        .find(|url| !url.trim().is_empty())
}

#[async_trait::async_trait]
impl backend::DataService for SignozDataSource {
    type Query = QueryModel;
    type QueryError = QueryError;
    type Stream = backend::BoxDataResponseStream<Self::QueryError>;

    async fn query_data(
        &self,
        request: backend::QueryDataRequest<Self::Query, Self>,
    ) -> Self::Stream {
        tracing::debug!(
            "Received query_data request with {} queries",
            request.queries.len()
        );

        let client = Self::client_for(request.plugin_context.instance_settings.as_ref());
        let targets = request.queries.into_iter().map(Target::from).collect();

        run_targets(client, targets)
    }
}

/// One panel query of a `query_data` request.
#[derive(Debug, Clone)]
struct Target {
    ref_id: String,
    query: QueryModel,
    range: TimeRange,
    /// Seconds
    step: i32,
}

impl From<backend::DataQuery<QueryModel>> for Target {
    fn from(query: backend::DataQuery<QueryModel>) -> Self {
        Self {
            ref_id: query.ref_id,
            range: TimeRange::new(
                query.time_range.from.timestamp_millis(),
                query.time_range.to.timestamp_millis(),
            ),
            step: i32::try_from(query.interval.as_secs()).unwrap_or(i32::MAX),
            query: query.query,
        }
    }
}

/// Run every target concurrently; responses stream back as they complete.
fn run_targets(
    client: Result<Arc<dyn SignozApi>, ClientError>,
    targets: Vec<Target>,
) -> backend::BoxDataResponseStream<QueryError> {
    let client = client.map_err(Arc::new);

    Box::pin(
        targets
            .into_iter()
            .map(|target| {
                let client = client.clone();
                async move {
                    let api = client.map_err(|e| QueryError {
                        ref_id: target.ref_id.clone(),
                        source: anyhow::anyhow!("{e}"),
                    })?;
                    run_query(
                        api.as_ref(),
                        target.ref_id,
                        target.query,
                        target.range,
                        target.step,
                    )
                    .await
                }
            })
            .collect::<FuturesUnordered<_>>(),
    )
}

/// Run one panel query and convert its series into frames. Each query
/// succeeds or fails on its own.
async fn run_query(
    api: &dyn SignozApi,
    ref_id: String,
    mut query: QueryModel,
    range: TimeRange,
    step: i32,
) -> Result<backend::DataResponse, QueryError> {
    if query.ref_id.is_none() {
        query.ref_id = Some(ref_id.clone());
    }

    let series = match api.query_range(&query, range, step).await {
        Ok(series) => series,
        Err(e) => {
            tracing::error!("Query failed for ref_id {}: {:?}", ref_id, e);
            return Err(QueryError {
                ref_id,
                source: e.into(),
            });
        }
    };

    let frames = conversion::series_to_frames(&series);
    let checked = frames
        .iter()
        .map(data::Frame::check)
        .collect::<Result<Vec<_>, _>>();

    match checked {
        Ok(checked) => Ok(backend::DataResponse::new(ref_id, checked)),
        Err(check_err) => {
            tracing::error!(
                "Frame validation failed for ref_id {}: {:?}",
                ref_id,
                check_err
            );
            Err(QueryError {
                ref_id,
                source: check_err.into(),
            })
        }
    }
}

#[async_trait::async_trait]
impl backend::DiagnosticsService for SignozDataSource {
    type CheckHealthError = ClientError;

    async fn check_health(
        &self,
        request: backend::CheckHealthRequest<Self>,
    ) -> Result<backend::CheckHealthResponse, Self::CheckHealthError> {
        let settings = request
            .plugin_context
            .instance_settings
            .as_ref()
            .ok_or(ClientError::MissingInstanceSettings)?;

        let connection = match connection_settings(settings, Configuration::global()) {
            Ok(connection) => connection,
            Err(e) => return Ok(backend::CheckHealthResponse::error(e.to_string())),
        };
        let client = SignozClient::new(Configuration::global().client_config(connection))?;

        Ok(health_response(check_connection(&client).await))
    }

    type CollectMetricsError = ClientError;

    async fn collect_metrics(
        &self,
        _request: backend::CollectMetricsRequest<Self>,
    ) -> Result<backend::CollectMetricsResponse, Self::CollectMetricsError> {
        Ok(backend::CollectMetricsResponse::new(None))
    }
}

async fn check_connection(api: &dyn SignozApi) -> ConnectionStatus {
    let status = api.test_connection().await;
    if status.is_success() {
        tracing::info!("Connectivity check succeeded: {}", status.message);
    } else {
        tracing::warn!("Connectivity check failed: {}", status.message);
    }
    status
}

fn health_response(status: ConnectionStatus) -> backend::CheckHealthResponse {
    if status.is_success() {
        backend::CheckHealthResponse::ok(status.message)
    } else {
        backend::CheckHealthResponse::error(status.message)
    }
}

#[grafana_plugin_sdk::main(
    services(data, diagnostics),
    init_subscriber = true,
    shutdown_handler = "0.0.0.0:10000"
)]
async fn plugin() -> SignozDataSource {
    let config = Configuration::global();
    tracing::info!(
        "SigNoz DataSource initialized with query path: {}, timeout: {:?}",
        config.query_path,
        config.timeout
    );
    SignozDataSource
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use mockall::mock;
    use signoz_sdk::signoz_query::autocomplete::Suggestion;
    use signoz_sdk::signoz_api::AggregateOperator;
    use signoz_sdk::signoz_query::{Point, Series, TranslateError, build_request};
    use signoz_sdk::HealthStatus;

    mock! {
        pub Api {}

        #[async_trait::async_trait]
        impl SignozApi for Api {
            async fn query_range(
                &self,
                query: &QueryModel,
                range: TimeRange,
                step: i32,
            ) -> Result<Vec<Series>, SdkError>;

            async fn suggest_keys(&self, input: &str) -> Vec<Suggestion>;

            async fn suggest_values(&self, key: &str, input: &str) -> Vec<Suggestion>;

            async fn test_connection(&self) -> ConnectionStatus;
        }
    }

    fn series(name: &str) -> Series {
        Series {
            ref_id: Some("A".to_string()),
            name: name.to_string(),
            labels: Vec::new(),
            points: vec![Point::new(1000, Some(1)), Point::new(2000, None)],
        }
    }

    fn target(ref_id: &str, query: QueryModel) -> Target {
        Target {
            ref_id: ref_id.to_string(),
            query,
            range: TimeRange::new(0, 60_000),
            step: 60,
        }
    }

    /// Split streamed responses into succeeded and failed ref ids, both sorted.
    async fn outcomes(stream: backend::BoxDataResponseStream<QueryError>) -> (usize, Vec<String>) {
        let results: Vec<_> = stream.collect().await;
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let mut failed: Vec<String> = results
            .into_iter()
            .filter_map(|r| r.err().map(|e| e.ref_id))
            .collect();
        failed.sort();
        (succeeded, failed)
    }

    #[test]
    fn test_resolve_base_url_precedence() {
        assert_eq!(
            resolve_base_url(Some("http://a"), "http://b", Some("http://c")),
            Some("http://a")
        );
        assert_eq!(
            resolve_base_url(None, "http://b", Some("http://c")),
            Some("http://b")
        );
        assert_eq!(
            resolve_base_url(Some(""), "", Some("http://c")),
            Some("http://c")
        );
        assert_eq!(resolve_base_url(None, " ", None), None);
    }

    #[tokio::test]
    async fn test_run_query_builds_frames() {
        let mut api = MockApi::new();
        api.expect_query_range()
            .withf(|query, range, step| {
                query.ref_id.as_deref() == Some("B")
                    && *range == TimeRange::new(0, 60_000)
                    && *step == 30
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![series("{}"), series(r#"{"a":"b"}"#)]));

        let query = QueryModel {
            ref_id: None,
            ..QueryModel::default_query()
        };
        let response = run_query(&api, "B".to_string(), query, TimeRange::new(0, 60_000), 30).await;
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn test_run_query_reports_ref_id_on_failure() {
        let mut api = MockApi::new();
        api.expect_query_range().times(1).returning(|_, _, _| {
            Err(SdkError::Translate(TranslateError::MissingAggregateAttribute {
                operator: AggregateOperator::Avg,
            }))
        });

        let err = run_query(
            &api,
            "C".to_string(),
            QueryModel::default_query(),
            TimeRange::new(0, 1),
            60,
        )
        .await
        .unwrap_err();

        assert_eq!(err.ref_id, "C");
        assert_eq!(err.to_string(), "Error querying SigNoz for query C");
        assert!(err.source.to_string().contains("requires an aggregate attribute"));
    }

    #[tokio::test]
    async fn test_failing_target_leaves_siblings_intact() {
        let mut api = MockApi::new();
        api.expect_query_range()
            .times(3)
            .returning(|query, _, _| match query.ref_id.as_deref() {
                Some("B") => Err(SdkError::Translate(TranslateError::MissingAggregateAttribute {
                    operator: AggregateOperator::Avg,
                })),
                _ => Ok(vec![series("{}")]),
            });
        let api: Arc<dyn SignozApi> = Arc::new(api);

        let targets = ["A", "B", "C"]
            .into_iter()
            .map(|id| target(id, QueryModel::default_query()))
            .collect();

        let (succeeded, failed) = outcomes(run_targets(Ok(api), targets)).await;
        assert_eq!(succeeded, 2);
        assert_eq!(failed, vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_operator_fails_only_its_target() {
        let mut api = MockApi::new();
        api.expect_query_range()
            .times(2)
            .returning(|query, range, step| {
                build_request(query, range, step)?;
                Ok(vec![series("{}")])
            });
        let api: Arc<dyn SignozApi> = Arc::new(api);

        let saved: QueryModel = serde_json::from_value(serde_json::json!({
            "refId": "A",
            "queryType": "builder",
            "aggregateOperator": "median",
            "aggregateAttribute": {"key": "durationNano"}
        }))
        .unwrap();
        let targets = vec![
            target("A", saved),
            target("B", QueryModel::default_query()),
        ];

        let (succeeded, failed) = outcomes(run_targets(Ok(api), targets)).await;
        assert_eq!(succeeded, 1);
        assert_eq!(failed, vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_client_fails_every_target() {
        let targets = vec![
            target("A", QueryModel::default_query()),
            target("B", QueryModel::default_query()),
        ];

        let (succeeded, failed) =
            outcomes(run_targets(Err(ClientError::MissingInstanceSettings), targets)).await;
        assert_eq!(succeeded, 0);
        assert_eq!(failed, vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn test_check_connection_passes_status_through() {
        let mut api = MockApi::new();
        api.expect_test_connection()
            .times(1)
            .returning(|| ConnectionStatus::error("Fetch error: Unauthorized"));

        let status = check_connection(&api).await;
        assert_eq!(status.status, HealthStatus::Error);
        assert_eq!(status.message, "Fetch error: Unauthorized");
    }
}
