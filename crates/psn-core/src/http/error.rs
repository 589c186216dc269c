use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::AuthError;

/// Errors returned by the request engine and everything built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("request failed with status {status}: {message}")]
    Request {
        status: StatusCode,
        message: String,
        code: Option<i64>,
    },
    #[error("rate limit budget exhausted")]
    RateLimited,
    #[error("server error {status}: {body}")]
    Server { status: StatusCode, body: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("failed to deserialize response: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<i64>,
}

/// Pulls the server-provided message and code out of a PSN error body,
/// falling back to the raw text when the shape is unrecognized.
pub(crate) fn parse_error_body(body: &str) -> (String, Option<i64>) {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.message.unwrap_or_else(|| body.to_owned()),
            envelope.error.code,
        ),
        Err(_) => (body.to_owned(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_error_body_yields_message_and_code() {
        let body = r#"{"error":{"referenceId":"abc","code":2281473,"message":"Not Found"}}"#;
        let (message, code) = parse_error_body(body);
        assert_eq!(message, "Not Found");
        assert_eq!(code, Some(2281473));
    }

    #[test]
    fn unrecognized_body_falls_back_to_raw_text() {
        let (message, code) = parse_error_body("<html>gateway error</html>");
        assert_eq!(message, "<html>gateway error</html>");
        assert_eq!(code, None);
    }
}
