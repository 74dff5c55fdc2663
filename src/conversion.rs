//! Conversion from decoded series to Grafana frames.

use chrono::{DateTime, Utc};
use grafana_plugin_sdk::data;
use grafana_plugin_sdk::prelude::*;
use signoz_sdk::signoz_query::Series;

/// Name of the timestamp field on every frame.
pub const TIME_FIELD: &str = "time";

/// Convert one series into a frame with a `time` field and a nullable
/// numeric field named after the series.
pub fn series_to_frame(series: &Series) -> data::Frame {
    let times: Vec<DateTime<Utc>> = series
        .points
        .iter()
        .map(|point| millis_to_datetime(point.timestamp))
        .collect();
    let values: Vec<Option<i64>> = series.points.iter().map(|point| point.value).collect();

    [
        times.into_field(TIME_FIELD),
        values.into_opt_field(series.name.as_str()),
    ]
    .into_frame(series.name.as_str())
}

/// Convert every series of one query, preserving order.
pub fn series_to_frames(series: &[Series]) -> Vec<data::Frame> {
    series.iter().map(series_to_frame).collect()
}

/// Millisecond epoch timestamp to `DateTime<Utc>`. Out-of-range values map to
/// the epoch.
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
