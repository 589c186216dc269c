mod engine;
mod error;
mod limiter;

pub use engine::RequestEngine;
pub use error::{ApiError, ApiResult};
pub use limiter::{RateLimit, RateLimiter};
