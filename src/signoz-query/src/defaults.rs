use std::collections::HashSet;
use std::str::FromStr;

use signoz_api::{
    AggregateOperator, DataSource, HavingClause, OrderByClause, PanelType, QueryType,
    UnknownVariant,
};

use crate::error::TranslateError;
use crate::model::{AttributeKey, Filter, QueryModel};

/// Smallest step the backend is asked for, in seconds.
pub const MIN_STEP_SECS: i32 = 60;

/// A [`QueryModel`] with every default applied and every vocabulary field
/// parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub ref_id: Option<String>,
    pub query_type: QueryType,
    pub panel_type: PanelType,
    pub data_source: DataSource,
    /// Rows with an empty key are dropped
    pub filters: Vec<Filter>,
    /// Unique, non-empty keys in first-seen order
    pub group_by: Vec<AttributeKey>,
    pub aggregate_operator: AggregateOperator,
    /// `None` when unset or when the key is empty
    pub aggregate_attribute: Option<AttributeKey>,
    /// `None` when unset or zero
    pub limit: Option<u32>,
    pub having: Vec<HavingClause>,
    pub order_by: Vec<OrderByClause>,
}

/// Fills in every absent field of `query`. Unset and empty strings take the
/// default; any other string outside its vocabulary is an error.
pub fn resolve_defaults(query: &QueryModel) -> Result<ResolvedQuery, TranslateError> {
    let mut seen = HashSet::new();
    let group_by = query
        .group_by
        .iter()
        .filter(|attr| !attr.is_empty() && seen.insert(attr.key.as_str()))
        .cloned()
        .collect();

    let having = query
        .having
        .iter()
        .map(|having| {
            Ok(HavingClause {
                column_name: having.column_name.clone(),
                op: having.op.parse()?,
                value: having.value.clone(),
            })
        })
        .collect::<Result<Vec<_>, UnknownVariant>>()?;

    let order_by = query
        .order_by
        .iter()
        .map(|order_by| {
            Ok(OrderByClause {
                column_name: order_by.column_name.clone(),
                order: order_by.order.to_ascii_lowercase().parse()?,
            })
        })
        .collect::<Result<Vec<_>, UnknownVariant>>()?;

    Ok(ResolvedQuery {
        ref_id: query.ref_id.clone(),
        query_type: parse_or(query.query_type.as_deref(), QueryType::Builder)?,
        panel_type: parse_or(query.panel_type.as_deref(), PanelType::Graph)?,
        data_source: parse_or(query.data_source.as_deref(), DataSource::Traces)?,
        filters: query
            .filters
            .iter()
            .filter(|filter| !filter.key.is_empty())
            .cloned()
            .collect(),
        group_by,
        aggregate_operator: parse_or(
            query.aggregate_operator.as_deref(),
            AggregateOperator::Count,
        )?,
        aggregate_attribute: query
            .aggregate_attribute
            .clone()
            .filter(|attr| !attr.is_empty()),
        limit: query.limit.filter(|limit| *limit > 0),
        having,
        order_by,
    })
}

fn parse_or<T>(value: Option<&str>, default: T) -> Result<T, UnknownVariant>
where
    T: FromStr<Err = UnknownVariant>,
{
    match value {
        Some(value) if !value.is_empty() => value.parse(),
        _ => Ok(default),
    }
}

/// The step actually requested, never below [`MIN_STEP_SECS`].
pub fn resolve_step(step: i32) -> i32 {
    step.max(MIN_STEP_SECS)
}
