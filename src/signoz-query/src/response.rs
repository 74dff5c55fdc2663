//! Query-range response → named time series.
//!
//! The decoder walks `data.data.result[0].series` one optional step at a time.
//! A missing step is recorded as a [`DecodeAnomaly`] and yields no series;
//! only a non-object root is an error.

use serde_json::{Map, Value};
use signoz_api::SeriesPayload;

use crate::error::DecodeError;
use crate::model::QueryModel;

/// One decoded point. `value` is `None` when the wire value was not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub timestamp: i64,
    pub value: Option<i64>,
}

impl Point {
    pub fn new(timestamp: i64, value: Option<i64>) -> Self {
        Self { timestamp, value }
    }
}

/// One named, time-ordered sequence of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub ref_id: Option<String>,
    /// Compact JSON of the label set, keys in the order received
    pub name: String,
    pub labels: Vec<(String, String)>,
    /// Sorted ascending by timestamp
    pub points: Vec<Point>,
}

/// Unexpected response shape encountered while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAnomaly {
    /// No `data` field on the transport envelope
    MissingEnvelopeData,
    /// No `data` field inside the response body
    MissingBodyData,
    /// `result` absent or not a list
    MissingResult,
    EmptyResult,
    /// `result[0].series` absent or not a list
    MissingSeries,
    MalformedSeries { index: usize, reason: String },
    /// Point dropped because its timestamp is not a number
    InvalidTimestamp { series: usize, point: usize },
    NonNumericValue { series: usize, timestamp: i64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodeOutcome {
    pub series: Vec<Series>,
    pub anomalies: Vec<DecodeAnomaly>,
}

/// Decodes a response envelope into series for `query`.
pub fn decode_response(query: &QueryModel, body: &Value) -> Result<Vec<Series>, DecodeError> {
    let outcome = decode_response_outcome(query, body)?;
    for anomaly in &outcome.anomalies {
        match anomaly {
            DecodeAnomaly::MalformedSeries { .. } | DecodeAnomaly::InvalidTimestamp { .. } => {
                tracing::warn!(ref_id = ?query.ref_id, ?anomaly, "Dropped malformed data")
            }
            _ => tracing::debug!(ref_id = ?query.ref_id, ?anomaly, "Decode anomaly"),
        }
    }
    Ok(outcome.series)
}

/// Like [`decode_response`], but also reports every anomaly encountered.
pub fn decode_response_outcome(
    query: &QueryModel,
    body: &Value,
) -> Result<DecodeOutcome, DecodeError> {
    let root = body.as_object().ok_or(DecodeError::RootNotObject)?;

    let mut outcome = DecodeOutcome::default();
    let Some(raw_series) = locate_series(root, &mut outcome.anomalies) else {
        return Ok(outcome);
    };

    for (index, raw) in raw_series.iter().enumerate() {
        let payload = match serde_json::from_value::<SeriesPayload>(raw.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                outcome.anomalies.push(DecodeAnomaly::MalformedSeries {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        outcome
            .series
            .push(decode_series(query, index, payload, &mut outcome.anomalies));
    }

    Ok(outcome)
}

/// Walks `data.data.result[0].series`.
pub(crate) fn locate_series<'a>(
    root: &'a Map<String, Value>,
    anomalies: &mut Vec<DecodeAnomaly>,
) -> Option<&'a Vec<Value>> {
    let Some(body) = root.get("data") else {
        anomalies.push(DecodeAnomaly::MissingEnvelopeData);
        return None;
    };
    let Some(data) = body.get("data") else {
        anomalies.push(DecodeAnomaly::MissingBodyData);
        return None;
    };
    let Some(result) = data.get("result").and_then(Value::as_array) else {
        anomalies.push(DecodeAnomaly::MissingResult);
        return None;
    };
    let Some(first) = result.first() else {
        anomalies.push(DecodeAnomaly::EmptyResult);
        return None;
    };
    let Some(series) = first.get("series").and_then(Value::as_array) else {
        anomalies.push(DecodeAnomaly::MissingSeries);
        return None;
    };
    Some(series)
}

fn decode_series(
    query: &QueryModel,
    index: usize,
    payload: SeriesPayload,
    anomalies: &mut Vec<DecodeAnomaly>,
) -> Series {
    let labels = payload
        .labels
        .iter()
        .map(|(key, value)| (key.clone(), label_value(value)))
        .collect();
    // Key order is whatever the backend emitted, so equal label sets can
    // produce different names.
    let name = Value::Object(payload.labels).to_string();

    let mut points: Vec<Point> = payload
        .values
        .into_iter()
        .enumerate()
        .filter_map(|(position, point)| {
            let Some(timestamp) = parse_timestamp(&point.timestamp) else {
                anomalies.push(DecodeAnomaly::InvalidTimestamp {
                    series: index,
                    point: position,
                });
                return None;
            };
            let value = parse_value(&point.value);
            if value.is_none() {
                anomalies.push(DecodeAnomaly::NonNumericValue {
                    series: index,
                    timestamp,
                });
            }
            Some(Point::new(timestamp, value))
        })
        .collect();
    points.sort_by_key(|point| point.timestamp);

    Series {
        ref_id: query.ref_id.clone(),
        name,
        labels,
        points,
    }
}

pub(crate) fn label_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Millisecond timestamp of a wire point. Fractional numbers are truncated.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

/// Integer value of a wire point: numbers are truncated, strings parse their
/// leading base-10 integer.
pub fn parse_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Parses an optional sign followed by leading decimal digits, ignoring
/// whatever follows them.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> QueryModel {
        QueryModel {
            ref_id: Some("A".to_string()),
            ..QueryModel::default()
        }
    }

    fn envelope(series: Value) -> Value {
        json!({"data": {"data": {"result": [{"queryName": "A", "series": series}]}}})
    }

    #[test]
    fn test_decode_single_series() {
        let body = envelope(json!([{
            "labels": {"service.name": "checkout"},
            "values": [
                {"timestamp": 2, "value": "5"},
                {"timestamp": 1, "value": "3"}
            ]
        }]));

        let series = decode_response(&query(), &body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, r#"{"service.name":"checkout"}"#);
        assert_eq!(series[0].ref_id.as_deref(), Some("A"));
        assert_eq!(
            series[0].labels,
            vec![("service.name".to_string(), "checkout".to_string())]
        );
        assert_eq!(
            series[0].points,
            vec![Point::new(1, Some(3)), Point::new(2, Some(5))]
        );
    }

    #[test]
    fn test_empty_series_list() {
        let outcome = decode_response_outcome(&query(), &envelope(json!([]))).unwrap();
        assert!(outcome.series.is_empty());
        assert!(outcome.anomalies.is_empty());
    }

    #[test]
    fn test_missing_path_steps_are_anomalies() {
        let cases = [
            (json!({}), DecodeAnomaly::MissingEnvelopeData),
            (json!({"data": {}}), DecodeAnomaly::MissingBodyData),
            (json!({"data": "oops"}), DecodeAnomaly::MissingBodyData),
            (json!({"data": {"data": {}}}), DecodeAnomaly::MissingResult),
            (
                json!({"data": {"data": {"result": null}}}),
                DecodeAnomaly::MissingResult,
            ),
            (
                json!({"data": {"data": {"result": []}}}),
                DecodeAnomaly::EmptyResult,
            ),
            (
                json!({"data": {"data": {"result": [{}]}}}),
                DecodeAnomaly::MissingSeries,
            ),
            (
                json!({"data": {"data": {"result": [{"series": null}]}}}),
                DecodeAnomaly::MissingSeries,
            ),
        ];

        for (body, expected) in cases {
            let outcome = decode_response_outcome(&query(), &body).unwrap();
            assert!(outcome.series.is_empty(), "{body}");
            assert_eq!(outcome.anomalies, vec![expected], "{body}");
        }
    }

    #[test]
    fn test_non_object_root_is_error() {
        for body in [json!([]), json!("text"), json!(null), json!(42)] {
            assert_eq!(
                decode_response(&query(), &body),
                Err(DecodeError::RootNotObject)
            );
        }
    }

    #[test]
    fn test_malformed_series_skipped() {
        let body = envelope(json!([
            "not a series",
            {"labels": {"a": "1"}, "values": [{"timestamp": 5, "value": 7}]}
        ]));

        let outcome = decode_response_outcome(&query(), &body).unwrap();
        assert_eq!(outcome.series.len(), 1);
        assert_eq!(outcome.series[0].points, vec![Point::new(5, Some(7))]);
        assert!(matches!(
            outcome.anomalies.as_slice(),
            [DecodeAnomaly::MalformedSeries { index: 0, .. }]
        ));
    }

    #[test]
    fn test_non_numeric_value_keeps_series() {
        let body = envelope(json!([{
            "labels": {},
            "values": [
                {"timestamp": 3, "value": "NaN"},
                {"timestamp": 1, "value": "1"},
                {"timestamp": 2, "value": null}
            ]
        }]));

        let outcome = decode_response_outcome(&query(), &body).unwrap();
        assert_eq!(
            outcome.series[0].points,
            vec![
                Point::new(1, Some(1)),
                Point::new(2, None),
                Point::new(3, None)
            ]
        );
        assert_eq!(outcome.series[0].name, "{}");
        assert_eq!(outcome.anomalies.len(), 2);
    }

    #[test]
    fn test_points_sorted_regardless_of_input_order() {
        let orders = [[1, 2, 3, 4], [4, 3, 2, 1], [3, 1, 4, 2], [2, 4, 1, 3]];
        for order in orders {
            let values: Vec<Value> = order
                .iter()
                .map(|ts| json!({"timestamp": ts, "value": ts * 10}))
                .collect();
            let body = envelope(json!([{"labels": {}, "values": values}]));

            let series = decode_response(&query(), &body).unwrap();
            let timestamps: Vec<i64> = series[0].points.iter().map(|p| p.timestamp).collect();
            assert_eq!(timestamps, vec![1, 2, 3, 4]);
            assert!(series[0]
                .points
                .iter()
                .all(|p| p.value == Some(p.timestamp * 10)));
        }
    }

    #[test]
    fn test_timestamp_ties_keep_decode_order() {
        let body = envelope(json!([{
            "labels": {},
            "values": [
                {"timestamp": 1, "value": "9"},
                {"timestamp": 1, "value": "8"}
            ]
        }]));

        let series = decode_response(&query(), &body).unwrap();
        assert_eq!(
            series[0].points,
            vec![Point::new(1, Some(9)), Point::new(1, Some(8))]
        );
    }

    // Label names follow the order the backend serialized them in; two
    // equivalent label sets in different order are distinct series names.
    #[test]
    fn test_series_name_depends_on_label_order() {
        let body = envelope(json!([
            {"labels": {"a": "1", "b": "2"}, "values": []},
            {"labels": {"b": "2", "a": "1"}, "values": []}
        ]));

        let series = decode_response(&query(), &body).unwrap();
        assert_eq!(series[0].name, r#"{"a":"1","b":"2"}"#);
        assert_eq!(series[1].name, r#"{"b":"2","a":"1"}"#);
        assert_ne!(series[0].name, series[1].name);
    }

    #[test]
    fn test_only_first_result_is_read() {
        let body = json!({"data": {"data": {"result": [
            {"series": [{"labels": {"q": "A"}, "values": []}]},
            {"series": [{"labels": {"q": "B"}, "values": []}]}
        ]}}});

        let series = decode_response(&query(), &body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, r#"{"q":"A"}"#);
    }

    #[test]
    fn test_non_string_label_values() {
        let body = envelope(json!([{"labels": {"code": 200, "ok": true}, "values": []}]));
        let series = decode_response(&query(), &body).unwrap();
        assert_eq!(
            series[0].labels,
            vec![
                ("code".to_string(), "200".to_string()),
                ("ok".to_string(), "true".to_string())
            ]
        );
    }

    #[test]
    fn test_fractional_timestamp_keeps_series() {
        let body = envelope(json!([{
            "labels": {"service.name": "checkout"},
            "values": [
                {"timestamp": 2000.0, "value": "5"},
                {"timestamp": 1000, "value": "3"},
                {"timestamp": "soon", "value": "4"}
            ]
        }]));

        let outcome = decode_response_outcome(&query(), &body).unwrap();
        assert_eq!(outcome.series.len(), 1);
        assert_eq!(
            outcome.series[0].points,
            vec![Point::new(1000, Some(3)), Point::new(2000, Some(5))]
        );
        assert_eq!(
            outcome.anomalies,
            vec![DecodeAnomaly::InvalidTimestamp {
                series: 0,
                point: 2
            }]
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp(&json!(1700000000000_i64)), Some(1_700_000_000_000));
        assert_eq!(parse_timestamp(&json!(2000.9)), Some(2000));
        assert_eq!(parse_timestamp(&json!("2000")), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(&json!(3)), Some(3));
        assert_eq!(parse_value(&json!(3.9)), Some(3));
        assert_eq!(parse_value(&json!(-3.9)), Some(-3));
        assert_eq!(parse_value(&json!("5.7")), Some(5));
        assert_eq!(parse_value(&json!("  42")), Some(42));
        assert_eq!(parse_value(&json!("12abc")), Some(12));
        assert_eq!(parse_value(&json!("-8")), Some(-8));
        assert_eq!(parse_value(&json!("+8")), Some(8));
        assert_eq!(parse_value(&json!("abc")), None);
        assert_eq!(parse_value(&json!("")), None);
        assert_eq!(parse_value(&json!("-")), None);
        assert_eq!(parse_value(&json!(true)), None);
        assert_eq!(parse_value(&json!(null)), None);
    }
}
