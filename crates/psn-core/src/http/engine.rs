use std::sync::Arc;
use std::time::Duration as StdDuration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::Authenticator;
use crate::config::ClientConfig;

use super::error::parse_error_body;
use super::{ApiError, ApiResult, RateLimiter};

/// Issues authenticated JSON requests with retry, rate limiting, and a
/// uniform error taxonomy.
///
/// Clones share the authenticator and the process-wide rate limiter.
#[derive(Debug, Clone)]
pub struct RequestEngine {
    http: Client,
    authenticator: Arc<Authenticator>,
    limiter: Arc<RateLimiter>,
    max_retries: u32,
    retry_base_delay: StdDuration,
}

enum Classified {
    Success(Value),
    RateLimited,
    Retryable(ApiError),
    Fatal(ApiError),
}

impl RequestEngine {
    pub fn new(
        authenticator: Arc<Authenticator>,
        limiter: Arc<RateLimiter>,
        config: &ClientConfig,
    ) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept-Language",
            HeaderValue::from_str(&config.headers.accept_language)?,
        );
        headers.insert("Country", HeaderValue::from_str(&config.headers.country)?);

        let http = Client::builder()
            .user_agent(&config.headers.user_agent)
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            authenticator,
            limiter,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    pub async fn get(&self, url: Url, query: &[(&str, String)]) -> ApiResult<Value> {
        self.request(Method::GET, url, query, None).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let value = self.get(url, query).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post(&self, url: Url, body: &Value) -> ApiResult<Value> {
        self.request(Method::POST, url, &[], Some(body)).await
    }

    pub async fn put(&self, url: Url, body: &Value) -> ApiResult<Value> {
        self.request(Method::PUT, url, &[], Some(body)).await
    }

    pub async fn patch(&self, url: Url, body: &Value) -> ApiResult<Value> {
        self.request(Method::PATCH, url, &[], Some(body)).await
    }

    pub async fn delete(&self, url: Url) -> ApiResult<Value> {
        self.request(Method::DELETE, url, &[], None).await
    }

    /// Sends one authenticated request, classifying the response and
    /// retrying transient failures with exponential backoff.
    ///
    /// A 429 answer waits out the limiter window before the next attempt;
    /// other 4xx answers surface immediately. Every attempt consumes one
    /// rate-limiter slot.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let mut attempt: u32 = 0;
        loop {
            self.limiter.acquire().await?;
            let token = self.authenticator.access_token().await?;

            let mut builder = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&token);
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            tracing::debug!(%method, %url, attempt, "sending request");
            let outcome = match builder.send().await {
                Ok(response) => self.classify(response).await,
                Err(err) => Classified::Retryable(ApiError::Network(err)),
            };

            match outcome {
                Classified::Success(value) => return Ok(value),
                Classified::Fatal(err) => return Err(err),
                Classified::RateLimited => {
                    if attempt >= self.max_retries {
                        return Err(ApiError::RateLimited);
                    }
                    tracing::debug!("throttled upstream; waiting out the current window");
                    self.limiter.wait_window().await;
                }
                Classified::Retryable(err) => {
                    if attempt >= self.max_retries {
                        return Err(err);
                    }
                    let delay = self.backoff_delay(attempt);
                    tracing::debug!(
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            attempt += 1;
        }
    }

    async fn classify(&self, response: reqwest::Response) -> Classified {
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "received response");

        if status.is_success() {
            let bytes = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => return Classified::Retryable(ApiError::Network(err)),
            };
            if bytes.is_empty() {
                return Classified::Success(Value::Null);
            }
            return match serde_json::from_slice(&bytes) {
                Ok(value) => Classified::Success(value),
                Err(err) => Classified::Fatal(ApiError::Deserialize(err)),
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Classified::RateLimited;
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            return Classified::Retryable(ApiError::Server { status, body });
        }

        // 4xx, plus anything the redirect-following client handed back
        // unconsumed. Retrying these cannot change the answer.
        let (message, code) = parse_error_body(&body);
        Classified::Fatal(ApiError::Request {
            status,
            message,
            code,
        })
    }

    fn backoff_delay(&self, attempt: u32) -> StdDuration {
        self.retry_base_delay.saturating_mul(1 << attempt.min(10))
    }
}
