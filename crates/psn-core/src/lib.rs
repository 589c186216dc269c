//! Core client library for the PlayStation Network web API: session and
//! token lifecycle, rate-limited request dispatch, and lazy pagination over
//! list endpoints.

pub mod auth;
pub mod client;
pub mod config;
pub mod http;
pub mod pagination;
pub mod services;

pub use auth::{AuthError, Authenticator};
pub use client::Psn;
pub use config::{ClientConfig, CommonHeaders};
pub use http::{ApiError, ApiResult, RateLimit, RequestEngine};
pub use pagination::{Page, Paginator};
