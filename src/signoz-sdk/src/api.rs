use async_trait::async_trait;
use signoz_query::autocomplete::Suggestion;
use signoz_query::{QueryModel, Series, TimeRange};

use crate::{ConnectionStatus, SdkError, SignozClient};

/// Operations a data source needs from the backend.
#[async_trait]
pub trait SignozApi: Send + Sync {
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

#[async_trait]
impl SignozApi for SignozClient {
    async fn query_range(
        &self,
        query: &QueryModel,
        range: TimeRange,
        step: i32,
    ) -> Result<Vec<Series>, SdkError> {
        SignozClient::query_range(self, query, range, step).await
    }

    async fn suggest_keys(&self, input: &str) -> Vec<Suggestion> {
        SignozClient::suggest_keys(self, input).await
    }

    async fn suggest_values(&self, key: &str, input: &str) -> Vec<Suggestion> {
        SignozClient::suggest_values(self, key, input).await
    }

    async fn test_connection(&self) -> ConnectionStatus {
        SignozClient::test_connection(self).await
    }
}
