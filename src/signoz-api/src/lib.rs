//! Request and response models of the SigNoz query-range HTTP API.

pub mod operators;
pub mod request;
pub mod response;

pub use operators::{
    AggregateOperator, ComparisonOperator, DataSource, FilterOperator, PanelType, QueryType,
    SortOrder, UnknownVariant,
};
pub use request::{
    AttributeKeyRef, BuilderQuery, ClickHouseQuery, CompositeQuery, FilterItem, FilterSet,
    FilterValue, HavingClause, OrderByClause, QueryRangeRequest,
};
pub use response::{ApiErrorBody, ApiErrorDetail, FetchEnvelope, PointPayload, SeriesPayload};

/// Path of the query-range endpoint, relative to the backend base URL.
pub const QUERY_RANGE_PATH: &str = "/api/v4/query_range";

/// Name of the single builder query every panel query is translated into.
pub const DEFAULT_QUERY_NAME: &str = "A";
