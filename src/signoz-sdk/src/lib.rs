mod api;
mod client;
mod error;
mod health;

pub use api::SignozApi;
pub use client::{
    ClientConfig, SignozClient, DEFAULT_API_KEY_HEADER, DEFAULT_AUTOCOMPLETE_LIMIT,
    DEFAULT_TIMEOUT,
};
pub use error::SdkError;
pub use health::{ConnectionStatus, HealthStatus, DEFAULT_ERROR_MESSAGE};

// Re-export the translation layer for convenience
pub use signoz_api;
pub use signoz_query;
