use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{ApiError, ApiResult};

/// Request budget: `count` requests per fixed `window`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub count: u32,
    pub window: Duration,
}

impl Default for RateLimit {
    /// Sony's published guideline of 300 requests per 15 minutes.
    fn default() -> Self {
        Self {
            count: 300,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Cooperative client-side rate limiter shared across all request-engine
/// clones for the process.
///
/// Fixed-window counting: once the budget for the current window is spent,
/// callers sleep until the window rolls over. Every outbound call consumes
/// one slot regardless of how the request turns out.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    used: u32,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Takes one slot, sleeping until the window permits it.
    ///
    /// Errors only when the limiter cannot ever admit a request (zero
    /// budget), which is a configuration mistake rather than throttling.
    pub async fn acquire(&self) -> ApiResult<()> {
        if self.limit.count == 0 {
            return Err(ApiError::RateLimited);
        }
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                if now.duration_since(state.window_start) >= self.limit.window {
                    state.window_start = now;
                    state.used = 0;
                }
                if state.used < self.limit.count {
                    state.used += 1;
                    return Ok(());
                }
                self.limit.window - now.duration_since(state.window_start)
            };
            tracing::debug!(wait_ms = wait.as_millis() as u64, "request budget spent; waiting");
            tokio::time::sleep(wait).await;
        }
    }

    /// Sleeps out the remainder of the current window without consuming a
    /// slot. Used after an upstream 429 to back off before re-attempting.
    pub async fn wait_window(&self) {
        let wait = {
            let state = self.state.lock().await;
            let elapsed = Instant::now().duration_since(state.window_start);
            self.limit.window.saturating_sub(elapsed)
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
