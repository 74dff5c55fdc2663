//! Outbound document for `POST /api/v4/query_range`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::operators::{
    AggregateOperator, ComparisonOperator, DataSource, FilterOperator, PanelType, QueryType,
    SortOrder,
};

/// Body of a query-range call.
///
/// Example:
/// {
///   "start": 1000,
///   "end": 2000,
///   "step": 60,
///   "variables": {},
///   "compositeQuery": {
///     "queryType": "builder",
///     "panelType": "graph",
///     "fillGaps": false,
///     "builderQueries": { "A": { ... } }
///   }
/// }
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryRangeRequest {
    /// Range start, milliseconds since epoch
    pub start: i64,
    /// Range end, milliseconds since epoch
    pub end: i64,
    /// Step in seconds
    pub step: i64,
    pub variables: BTreeMap<String, serde_json::Value>,
    pub composite_query: CompositeQuery,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompositeQuery {
    pub query_type: QueryType,
    pub panel_type: PanelType,
    pub fill_gaps: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_queries: Option<BTreeMap<String, BuilderQuery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ch_queries: Option<BTreeMap<String, ClickHouseQuery>>,
}

/// One named structured query inside a composite query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuilderQuery {
    pub data_source: DataSource,
    pub query_name: String,
    pub expression: String,
    pub step_interval: i64,
    pub aggregate_operator: AggregateOperator,
    pub aggregate_attribute: AttributeKeyRef,
    pub time_aggregation: String,
    pub space_aggregation: String,
    pub functions: Vec<serde_json::Value>,
    pub filters: FilterSet,
    pub disabled: bool,
    pub having: Vec<HavingClause>,
    /// Always present on the wire, `null` when unset
    pub limit: Option<u32>,
    pub order_by: Vec<OrderByClause>,
    pub group_by: Vec<AttributeKeyRef>,
    pub legend: String,
    pub reduce_to: String,
}

/// Reference to a backend column or tag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeKeyRef {
    pub key: String,
}

impl AttributeKeyRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Conjunction of filter items. The backend also accepts `OR`, but only `AND`
/// is ever produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FilterSet {
    pub op: String,
    pub items: Vec<FilterItem>,
}

impl FilterSet {
    pub fn and(items: Vec<FilterItem>) -> Self {
        Self {
            op: "AND".to_string(),
            items,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FilterItem {
    pub key: AttributeKeyRef,
    pub op: FilterOperator,
    pub value: FilterValue,
}

/// A filter value is a plain string, or a list for set-membership operators.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

/// Post-aggregation filter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HavingClause {
    pub column_name: String,
    pub op: ComparisonOperator,
    pub value: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderByClause {
    pub column_name: String,
    pub order: SortOrder,
}

/// Raw SQL query, used for tag autocompletion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClickHouseQuery {
    pub name: String,
    pub query: String,
    pub legend: String,
    pub disabled: bool,
}
