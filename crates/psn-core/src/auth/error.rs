use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by token acquisition and refresh.
///
/// All variants are fatal to the current call: login secrets and refresh
/// tokens are single-use, so nothing here is retried.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("token endpoint error {status}: {body}")]
    TokenEndpoint { status: StatusCode, body: String },
    #[error("npsso token has expired or is invalid; generate a new one")]
    NpssoRejected,
    #[error("authorization request denied ({0})")]
    AuthorizationDenied(String),
    #[error("authorization response missing redirect location")]
    MissingRedirect,
    #[error("authorization response missing code parameter")]
    MissingAuthorizationCode,
}
