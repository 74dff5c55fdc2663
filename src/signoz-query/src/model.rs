//! Typed description of one panel query, as saved by the query editor.

use serde::{Deserialize, Deserializer, Serialize};
use signoz_api::{AggregateOperator, DataSource, PanelType, QueryType};

/// One predicate on an attribute.
///
/// The operator is kept as typed by the user and only parsed when the query
/// is translated, so half-edited rows survive a save.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Reference to a backend column or tag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributeKey {
    #[serde(default)]
    pub key: String,
}

impl AttributeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Post-aggregation filter. `column_name` is a group-by key or the aggregate
/// result placeholder; `op` is a comparison operator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Having {
    pub column_name: String,
    #[serde(default)]
    pub op: String,
    pub value: serde_json::Value,
}

impl Having {
    pub fn new(
        column_name: impl Into<String>,
        op: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            op: op.into(),
            value,
        }
    }
}

/// Sort instruction; `order` is `asc` or `desc` in any case.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub column_name: String,
    #[serde(default)]
    pub order: String,
}

impl OrderBy {
    pub fn new(column_name: impl Into<String>, order: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            order: order.into(),
        }
    }
}

/// Full panel query. Absent fields are filled in by
/// [`resolve_defaults`](crate::defaults::resolve_defaults).
///
/// Vocabulary fields hold the saved string and are only parsed on
/// translation, so an unreadable value fails that query alone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub query_type: Option<String>,
    #[serde(default)]
    pub panel_type: Option<String>,
    #[serde(rename = "signozDataSource", alias = "dataSource", default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default, deserialize_with = "group_by_keys")]
    pub group_by: Vec<AttributeKey>,
    #[serde(default)]
    pub aggregate_operator: Option<String>,
    #[serde(default)]
    pub aggregate_attribute: Option<AttributeKey>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub having: Vec<Having>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
}

impl QueryModel {
    /// The query a freshly added panel starts from.
    pub fn default_query() -> Self {
        Self {
            ref_id: None,
            query_type: Some(QueryType::Builder.to_string()),
            panel_type: Some(PanelType::Graph.to_string()),
            data_source: Some(DataSource::Traces.to_string()),
            filters: Vec::new(),
            group_by: Vec::new(),
            aggregate_operator: Some(AggregateOperator::Count.to_string()),
            aggregate_attribute: Some(AttributeKey::default()),
            limit: Some(0),
            having: Vec::new(),
            order_by: Vec::new(),
        }
    }
}

/// Closed time range in milliseconds since epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }
}

/// Entry of one of the editor's pickers.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn query_type_options() -> Vec<SelectOption> {
    vec![SelectOption {
        value: QueryType::Builder.as_str(),
        label: "Builder",
    }]
}

pub fn panel_type_options() -> Vec<SelectOption> {
    vec![SelectOption {
        value: PanelType::Graph.as_str(),
        label: "Graph",
    }]
}

pub fn data_source_options() -> Vec<SelectOption> {
    vec![SelectOption {
        value: DataSource::Traces.as_str(),
        label: "Traces",
    }]
}

pub fn aggregate_operator_options() -> Vec<SelectOption> {
    AggregateOperator::ALL
        .iter()
        .map(|op| SelectOption {
            value: op.as_str(),
            label: op.label(),
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupByEntry {
    Key(AttributeKey),
    Name(String),
}

/// Accepts both `[{"key": "a"}]` and the older `["a"]` form.
fn group_by_keys<'de, D>(deserializer: D) -> Result<Vec<AttributeKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<GroupByEntry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            GroupByEntry::Key(key) => key,
            GroupByEntry::Name(name) => AttributeKey::new(name),
        })
        .collect())
}
