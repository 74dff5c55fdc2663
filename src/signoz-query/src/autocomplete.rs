//! Attribute key and value suggestions for the query editor.
//!
//! Candidates come from two fixed tag tables queried with raw SQL through the
//! query-range endpoint. Filtering happens here, on the client.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use signoz_api::{ClickHouseQuery, CompositeQuery, PanelType, QueryRangeRequest, QueryType};

use crate::defaults::MIN_STEP_SECS;
use crate::model::TimeRange;
use crate::response::{label_value, locate_series};

const KEYS_TABLE: &str = "signoz_traces.distributed_span_attributes_keys";
const VALUES_TABLE: &str = "signoz_traces.distributed_tag_attributes_v2";

/// Which suggestion list is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocompleteKind {
    Keys,
    Values,
}

impl AutocompleteKind {
    /// Value of the `autocomplete` query-string discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            AutocompleteKind::Keys => "keys",
            AutocompleteKind::Values => "values",
        }
    }

    /// Series label carrying the candidate.
    pub fn label(&self) -> &'static str {
        match self {
            AutocompleteKind::Keys => "tagKey",
            AutocompleteKind::Values => "string_value",
        }
    }
}

/// One entry of a suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub value: String,
    /// Synthesized from the user's input rather than returned by the backend
    pub custom: bool,
}

impl Suggestion {
    fn candidate(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
            custom: false,
        }
    }

    fn custom(input: &str) -> Self {
        Self {
            label: input.to_string(),
            value: input.to_string(),
            custom: true,
        }
    }
}

pub fn build_keys_request(range: TimeRange, limit: u32) -> QueryRangeRequest {
    let sql = format!("SELECT DISTINCT tagKey FROM {KEYS_TABLE} LIMIT {limit}");
    sql_request(range, sql)
}

pub fn build_values_request(key: &str, range: TimeRange, limit: u32) -> QueryRangeRequest {
    let sql = format!(
        "SELECT DISTINCT string_value FROM {VALUES_TABLE} WHERE tag_key = '{}' LIMIT {limit}",
        escape_sql_literal(key)
    );
    sql_request(range, sql)
}

fn sql_request(range: TimeRange, sql: String) -> QueryRangeRequest {
    QueryRangeRequest {
        start: range.from,
        end: range.to,
        step: i64::from(MIN_STEP_SECS),
        variables: BTreeMap::new(),
        composite_query: CompositeQuery {
            query_type: QueryType::ClickhouseSql,
            panel_type: PanelType::Graph,
            fill_gaps: false,
            builder_queries: None,
            ch_queries: Some(BTreeMap::from([(
                signoz_api::DEFAULT_QUERY_NAME.to_string(),
                ClickHouseQuery {
                    name: signoz_api::DEFAULT_QUERY_NAME.to_string(),
                    query: sql,
                    legend: String::new(),
                    disabled: false,
                },
            )])),
        },
    }
}

fn escape_sql_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Reads the candidate label of every returned series, first occurrence wins.
///
/// Any unexpected shape yields an empty list.
pub fn extract_candidates(body: &Value, kind: AutocompleteKind) -> Vec<String> {
    let Some(root) = body.as_object() else {
        return Vec::new();
    };
    let mut anomalies = Vec::new();
    let Some(series) = locate_series(root, &mut anomalies) else {
        tracing::debug!(kind = kind.as_str(), ?anomalies, "No autocomplete candidates");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    series
        .iter()
        .filter_map(|s| s.get("labels")?.get(kind.label()))
        .map(label_value)
        .filter(|candidate| !candidate.is_empty() && seen.insert(candidate.clone()))
        .collect()
}

/// Case-insensitive substring filter over `candidates`, followed by a custom
/// entry for `input` so free text stays selectable.
pub fn filter_suggestions(candidates: &[String], input: &str) -> Vec<Suggestion> {
    let needle = input.to_lowercase();
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .map(|candidate| Suggestion::candidate(candidate))
        .collect();

    if !input.is_empty() && !suggestions.iter().any(|s| s.value == input) {
        suggestions.push(Suggestion::custom(input));
    }
    suggestions
}
