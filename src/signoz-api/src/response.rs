//! Inbound shapes of query-range responses.
//!
//! A successful response body looks like:
//! {
//!   "status": "success",
//!   "data": {
//!     "resultType": "",
//!     "result": [
//!       {
//!         "queryName": "A",
//!         "series": [
//!           {
//!             "labels": { "service.name": "checkout" },
//!             "values": [ { "timestamp": 1700000000000, "value": "5" } ]
//!           }
//!         ]
//!       }
//!     ]
//!   }
//! }
//!
//! Decoders consume the body wrapped in a [`FetchEnvelope`], so the series
//! list lives at `data.data.result[0].series`.

use serde::{Deserialize, Serialize};

/// Transport envelope around an HTTP response body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FetchEnvelope<T> {
    pub data: T,
}

/// One returned series. Label keys keep the order they were received in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesPayload {
    #[serde(default)]
    pub labels: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub values: Vec<PointPayload>,
}

/// A single point. `value` arrives either as a JSON number or a numeric string;
/// `timestamp` is any JSON number, integral or not.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PointPayload {
    #[serde(default)]
    pub timestamp: serde_json::Value,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Error body returned with non-2xx responses.
///
/// Example:
/// {
///   "status": "error",
///   "error": { "code": "unauthorized", "message": "invalid API key" }
/// }
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
