use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug)]
pub enum ApiError {
    /// Non-2xx response. `message` is the backend's plain-string `detail`
    /// when there is one, otherwise `HTTP {status} {reason}`.
    Status { status: StatusCode, message: String },
    Transport(reqwest::Error),
    Cancelled,
    Decode(serde_json::Error),
    File(std::io::Error),
    #[cfg(test)]
    MockQueueEmpty,
}

impl ApiError {
    pub fn from_response(status: StatusCode, reason: Option<&str>, body: &[u8]) -> Self {
        ApiError::Status { status, message: error_message(status, reason, body) }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Error-extraction protocol for failed responses.
///
/// Only a top-level `detail` that is a non-blank string is surfaced, and it is
/// surfaced verbatim. Structured details (the upstream LLM error object) fall
/// through to the generic status line.
pub fn error_message(status: StatusCode, reason: Option<&str>, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(Value::String(detail)) = value.get("detail") {
            if !detail.trim().is_empty() {
                return detail.clone();
            }
        }
    }
    format!("HTTP {} {}", status.as_u16(), reason.unwrap_or_default())
        .trim()
        .to_string()
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Status { message, .. } => f.write_str(message),
            ApiError::Transport(err) => write!(f, "{err}"),
            ApiError::Cancelled => write!(f, "request was cancelled"),
            ApiError::Decode(err) => write!(f, "decode error: {err}"),
            ApiError::File(err) => write!(f, "cannot read file: {err}"),
            #[cfg(test)]
            ApiError::MockQueueEmpty => write!(f, "mock transport response queue is empty"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            ApiError::Decode(err) => Some(err),
            ApiError::File(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(status: u16, reason: Option<&str>, body: &str) -> String {
        error_message(StatusCode::from_u16(status).unwrap(), reason, body.as_bytes())
    }

    #[test]
    fn plain_string_detail_is_returned_verbatim() {
        assert_eq!(
            msg(400, Some("Bad Request"), r#"{"detail":"Only .csv is supported"}"#),
            "Only .csv is supported"
        );
        assert_eq!(
            msg(404, Some("Not Found"), r#"{"detail":"  Dataset not found "}"#),
            "  Dataset not found "
        );
    }

    #[test]
    fn structured_llm_detail_falls_back_to_status_line() {
        let body = r#"{"detail":{"error":{"code":"LLM_TIMEOUT","message":"Request timed out","retryable":true}}}"#;
        assert_eq!(msg(504, Some("Gateway Timeout"), body), "HTTP 504 Gateway Timeout");
    }

    #[test]
    fn blank_missing_or_non_json_detail_falls_back() {
        assert_eq!(msg(400, Some("Bad Request"), r#"{"detail":"   "}"#), "HTTP 400 Bad Request");
        assert_eq!(msg(500, Some("Internal Server Error"), r#"{"message":"x"}"#), "HTTP 500 Internal Server Error");
        assert_eq!(msg(502, Some("Bad Gateway"), "<html>oops</html>"), "HTTP 502 Bad Gateway");
        assert_eq!(msg(500, Some("Internal Server Error"), r#"["detail"]"#), "HTTP 500 Internal Server Error");
        assert_eq!(msg(422, Some("Unprocessable Entity"), r#"{"detail":[{"loc":["query","base"]}]}"#), "HTTP 422 Unprocessable Entity");
    }

    #[test]
    fn missing_reason_is_trimmed() {
        assert_eq!(msg(599, None, ""), "HTTP 599");
    }

    #[test]
    fn display_prints_extracted_message() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, Some("Not Found"), br#"{"detail":"Dataset not found"}"#);
        assert_eq!(err.to_string(), "Dataset not found");
        assert!(err.is_not_found());
        assert_eq!(ApiError::Cancelled.status(), None);
    }
}
