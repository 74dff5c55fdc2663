//! Closed vocabularies accepted by the query-range API.
//!
//! Every enum serializes to the exact spelling the backend expects and can be
//! parsed back from it with [`FromStr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a string does not name a member of one of the vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// All members in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Predicate operator of a filter item.
    FilterOperator, "filter operator" {
        Equal => "=",
        NotEqual => "!=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        In => "in",
        NotIn => "not_in",
        Contains => "contains",
        NotContains => "not_contains",
        Exists => "exists",
        NotExists => "not_exists",
        Regex => "regex",
        NotRegex => "not_regex",
    }
}

impl FilterOperator {
    /// Set-membership operators take a comma separated list of values.
    pub fn splits_value(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }
}

wire_enum! {
    /// Numeric comparison subset used by having-clauses.
    ComparisonOperator, "comparison operator" {
        Equal => "=",
        NotEqual => "!=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
    }
}

wire_enum! {
    SortOrder, "sort order" {
        Asc => "asc",
        Desc => "desc",
    }
}

wire_enum! {
    /// Aggregation applied to each step bucket.
    AggregateOperator, "aggregate operator" {
        Count => "count",
        CountDistinct => "count_distinct",
        Sum => "sum",
        Avg => "avg",
        Max => "max",
        Min => "min",
        P05 => "p05",
        P10 => "p10",
        P25 => "p25",
        P50 => "p50",
        P75 => "p75",
        P90 => "p90",
        P95 => "p95",
        P99 => "p99",
        Rate => "rate",
        RateSum => "rate_sum",
        RateAvg => "rate_avg",
        RateMin => "rate_min",
        RateMax => "rate_max",
        Noop => "noop",
    }
}

impl AggregateOperator {
    /// `count` and `noop` are the only operators that need no attribute.
    pub fn requires_attribute(&self) -> bool {
        !matches!(self, AggregateOperator::Count | AggregateOperator::Noop)
    }

    /// Label shown in the editor's operator picker.
    pub fn label(&self) -> &'static str {
        match self {
            AggregateOperator::Count => "Count",
            AggregateOperator::CountDistinct => "Count Distinct",
            AggregateOperator::Sum => "Sum",
            AggregateOperator::Avg => "Avg",
            AggregateOperator::Max => "Max",
            AggregateOperator::Min => "Min",
            AggregateOperator::P05 => "P05",
            AggregateOperator::P10 => "P10",
            AggregateOperator::P25 => "P25",
            AggregateOperator::P50 => "P50",
            AggregateOperator::P75 => "P75",
            AggregateOperator::P90 => "P90",
            AggregateOperator::P95 => "P95",
            AggregateOperator::P99 => "P99",
            AggregateOperator::Rate => "Rate",
            AggregateOperator::RateSum => "Rate Sum",
            AggregateOperator::RateAvg => "Rate Avg",
            AggregateOperator::RateMin => "Rate Min",
            AggregateOperator::RateMax => "Rate Max",
            AggregateOperator::Noop => "No Operation",
        }
    }
}

wire_enum! {
    /// Signal store a builder query reads from.
    DataSource, "data source" {
        Traces => "traces",
        Metrics => "metrics",
        Logs => "logs",
    }
}

wire_enum! {
    QueryType, "query type" {
        Builder => "builder",
        ClickhouseSql => "clickhouse_sql",
        Promql => "promql",
    }
}

wire_enum! {
    PanelType, "panel type" {
        Graph => "graph",
        Table => "table",
        Value => "value",
        List => "list",
        Trace => "trace",
    }
}
