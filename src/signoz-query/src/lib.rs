//! Translation between panel queries and the SigNoz query-range API.
//!
//! [`build_request`] turns a [`QueryModel`] into a request document and
//! [`decode_response`] turns the returned envelope into [`Series`]. Both are
//! pure; issuing the HTTP calls is left to the caller.

pub mod autocomplete;
pub mod defaults;
pub mod editor;
pub mod error;
pub mod model;
pub mod request;
pub mod response;
pub mod settings;

pub use autocomplete::{AutocompleteKind, Suggestion};
pub use defaults::{resolve_defaults, resolve_step, ResolvedQuery, MIN_STEP_SECS};
pub use error::{DecodeError, SettingsError, TranslateError};
pub use model::{AttributeKey, Filter, Having, OrderBy, QueryModel, TimeRange};
pub use request::{build_connectivity_request, build_request};
pub use response::{decode_response, decode_response_outcome, DecodeAnomaly, Point, Series};
pub use settings::{ConnectionSettings, DataSourceSettings, SecretField, SecureSettings};

use serde_json::Value;
use signoz_api::QueryRangeRequest;

/// Request and response translation for one backend dialect.
pub trait QueryTranslator: Send + Sync {
    fn build_request(
        &self,
        query: &QueryModel,
        range: TimeRange,
        step: i32,
    ) -> Result<QueryRangeRequest, TranslateError>;

    fn decode_response(&self, query: &QueryModel, body: &Value)
        -> Result<Vec<Series>, DecodeError>;
}

/// Translator for builder queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuilderTranslator;

impl QueryTranslator for BuilderTranslator {
    fn build_request(
        &self,
        query: &QueryModel,
        range: TimeRange,
        step: i32,
    ) -> Result<QueryRangeRequest, TranslateError> {
        request::build_request(query, range, step)
    }

    fn decode_response(
        &self,
        query: &QueryModel,
        body: &Value,
    ) -> Result<Vec<Series>, DecodeError> {
        response::decode_response(query, body)
    }
}
