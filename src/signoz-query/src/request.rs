//! Panel query → query-range request document.

use std::collections::BTreeMap;

use signoz_api::{
    AttributeKeyRef, BuilderQuery, CompositeQuery, FilterItem, FilterOperator, FilterSet,
    FilterValue, PanelType, QueryRangeRequest, QueryType, DEFAULT_QUERY_NAME,
};

use crate::defaults::{resolve_defaults, resolve_step};
use crate::error::TranslateError;
use crate::model::{Filter, QueryModel, TimeRange};

const TIME_AGGREGATION: &str = "rate";
const SPACE_AGGREGATION: &str = "sum";
const REDUCE_TO: &str = "avg";

/// Translates `query` into a query-range request over `range`.
///
/// `step` is in seconds and is raised to at least one minute. Filters are
/// always joined with `AND`.
pub fn build_request(
    query: &QueryModel,
    range: TimeRange,
    step: i32,
) -> Result<QueryRangeRequest, TranslateError> {
    if range.from > range.to {
        return Err(TranslateError::InvalidTimeRange {
            from: range.from,
            to: range.to,
        });
    }

    let resolved = resolve_defaults(query)?;
    if resolved.query_type != QueryType::Builder {
        return Err(TranslateError::UnsupportedQueryType(resolved.query_type));
    }

    let aggregate_attribute = match resolved.aggregate_attribute {
        Some(attr) => AttributeKeyRef::new(attr.key),
        None if resolved.aggregate_operator.requires_attribute() => {
            return Err(TranslateError::MissingAggregateAttribute {
                operator: resolved.aggregate_operator,
            });
        }
        None => AttributeKeyRef::default(),
    };

    let items = resolved
        .filters
        .iter()
        .map(translate_filter)
        .collect::<Result<Vec<_>, _>>()?;

    let step = i64::from(resolve_step(step));

    let builder_query = BuilderQuery {
        data_source: resolved.data_source,
        query_name: DEFAULT_QUERY_NAME.to_string(),
        expression: DEFAULT_QUERY_NAME.to_string(),
        step_interval: step,
        aggregate_operator: resolved.aggregate_operator,
        aggregate_attribute,
        time_aggregation: TIME_AGGREGATION.to_string(),
        space_aggregation: SPACE_AGGREGATION.to_string(),
        functions: Vec::new(),
        filters: FilterSet::and(items),
        disabled: false,
        having: resolved.having,
        limit: resolved.limit,
        order_by: resolved.order_by,
        group_by: resolved
            .group_by
            .into_iter()
            .map(|attr| AttributeKeyRef::new(attr.key))
            .collect(),
        legend: String::new(),
        reduce_to: REDUCE_TO.to_string(),
    };

    tracing::debug!(
        ref_id = ?resolved.ref_id,
        data_source = %resolved.data_source,
        operator = %resolved.aggregate_operator,
        step,
        "Built query-range request"
    );

    Ok(QueryRangeRequest {
        start: range.from,
        end: range.to,
        step,
        variables: BTreeMap::new(),
        composite_query: CompositeQuery {
            query_type: QueryType::Builder,
            panel_type: resolved.panel_type,
            fill_gaps: false,
            builder_queries: Some(BTreeMap::from([(
                DEFAULT_QUERY_NAME.to_string(),
                builder_query,
            )])),
            ch_queries: None,
        },
    })
}

/// Request with no builder queries, used to probe connectivity and credentials.
pub fn build_connectivity_request(range: TimeRange) -> QueryRangeRequest {
    QueryRangeRequest {
        start: range.from,
        end: range.to,
        step: i64::from(crate::defaults::MIN_STEP_SECS),
        variables: BTreeMap::new(),
        composite_query: CompositeQuery {
            query_type: QueryType::Builder,
            panel_type: PanelType::Graph,
            fill_gaps: false,
            builder_queries: Some(BTreeMap::new()),
            ch_queries: None,
        },
    }
}

fn translate_filter(filter: &Filter) -> Result<FilterItem, TranslateError> {
    let op: FilterOperator =
        filter
            .operator
            .parse()
            .map_err(|_| TranslateError::InvalidFilterOperator {
                key: filter.key.clone(),
                operator: filter.operator.clone(),
            })?;

    let value = if op.splits_value() {
        FilterValue::List(filter.value.split(',').map(str::to_string).collect())
    } else {
        FilterValue::Scalar(filter.value.clone())
    };

    Ok(FilterItem {
        key: AttributeKeyRef::new(filter.key.clone()),
        op,
        value,
    })
}
