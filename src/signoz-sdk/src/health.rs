//! Outcome of a connectivity check.

use signoz_api::ApiErrorBody;

/// Message used when a failure carries no status text of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Cannot connect to API";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub status: HealthStatus,
    pub message: String,
}

impl ConnectionStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == HealthStatus::Success
    }
}

/// Message for a response that arrived but was not `200 OK`.
pub(crate) fn unexpected_status_message(status_text: &str) -> String {
    if status_text.is_empty() {
        DEFAULT_ERROR_MESSAGE.to_string()
    } else {
        status_text.to_string()
    }
}

/// Message for a failed fetch: the status text, plus the error code and
/// message from the body when it has them.
pub(crate) fn fetch_error_message(status_text: &str, body: &str) -> String {
    let mut message = format!(
        "Fetch error: {}",
        if status_text.is_empty() {
            DEFAULT_ERROR_MESSAGE
        } else {
            status_text
        }
    );

    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.error);
    if let Some(detail) = detail {
        if let Some(code) = detail.code.filter(|code| !code.is_empty()) {
            message.push_str(&format!(
                ": {code}. {}",
                detail.message.unwrap_or_default()
            ));
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_with_code() {
        let body = r#"{"status":"error","error":{"code":"unauthorized","message":"invalid API key"}}"#;
        assert_eq!(
            fetch_error_message("Unauthorized", body),
            "Fetch error: Unauthorized: unauthorized. invalid API key"
        );
    }

    #[test]
    fn test_fetch_error_without_code() {
        assert_eq!(
            fetch_error_message("Bad Gateway", "<html>oops</html>"),
            "Fetch error: Bad Gateway"
        );
        assert_eq!(
            fetch_error_message("Bad Gateway", r#"{"error":{"message":"no code"}}"#),
            "Fetch error: Bad Gateway"
        );
    }

    #[test]
    fn test_fetch_error_without_status_text() {
        assert_eq!(
            fetch_error_message("", ""),
            "Fetch error: Cannot connect to API"
        );
    }

    #[test]
    fn test_unexpected_status_message() {
        assert_eq!(unexpected_status_message("No Content"), "No Content");
        assert_eq!(unexpected_status_message(""), DEFAULT_ERROR_MESSAGE);
    }
}
