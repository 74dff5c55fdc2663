use signoz_api::{AggregateOperator, QueryType, UnknownVariant};

/// Reasons a panel query cannot be turned into a backend request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("Aggregate operator '{operator}' requires an aggregate attribute")]
    MissingAggregateAttribute { operator: AggregateOperator },
    #[error("Filter on '{key}' has unknown operator '{operator}'")]
    InvalidFilterOperator { key: String, operator: String },
    #[error("Query type '{0}' is not supported, only builder queries can be translated")]
    UnsupportedQueryType(QueryType),
    #[error("Invalid time range [{from}, {to}]: start is after end")]
    InvalidTimeRange { from: i64, to: i64 },
    /// A query field holds a string outside its vocabulary
    #[error("Invalid query: {0}")]
    UnknownValue(#[from] UnknownVariant),
}

/// Raised only when a response is not a JSON object at all; every other
/// shape problem decodes to an empty result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Response root is not a JSON object")]
    RootNotObject,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("SigNoz URL is not configured")]
    MissingUrl,
    #[error("API key is not configured")]
    MissingApiKey,
}
