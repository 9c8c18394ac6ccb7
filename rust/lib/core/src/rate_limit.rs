//! Sliding-window rate limiting keyed by client IP.
//!
//! Each client keeps the instants of its recent requests; a request is
//! admitted while fewer than `max_requests` fall inside the last
//! `window_secs`. Stale entries are swept every `cleanup_interval` requests,
//! and the number of tracked clients is capped at `max_tracked_ips`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::ServiceError;

/// Configuration for the rate limiter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum number of requests allowed in the window.
    pub max_requests: u32,

    /// Size of the sliding window in seconds.
    pub window_secs: u64,

    /// Run cleanup every N requests.
    pub cleanup_interval: u64,

    /// Maximum number of client addresses tracked at once.
    pub max_tracked_ips: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 15 * 60,
            cleanup_interval: 100,
            max_tracked_ips: 10_000,
        }
    }
}

/// In-memory sliding-window rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    state: RwLock<HashMap<IpAddr, Vec<Instant>>>,
    request_count: AtomicU64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: RwLock::new(HashMap::new()),
            request_count: AtomicU64::new(0),
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_secs)
    }

    /// Admit or reject one request from `ip`.
    ///
    /// Admitted requests are recorded. Returns `ServiceError::RateLimited`
    /// when `ip` has used its budget, or when the tracking table is full
    /// and `ip` is not already in it.
    pub fn check(&self, ip: IpAddr) -> Result<(), ServiceError> {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), ServiceError> {
        let cutoff = now.checked_sub(self.window()).unwrap_or(now);

        let count = self.request_count.fetch_add(1, Ordering::Relaxed);
        if count > 0 && self.config.cleanup_interval > 0 && count % self.config.cleanup_interval == 0 {
            tracing::debug!(request_count = count, "running periodic rate limiter cleanup");
            self.cleanup_at(now);
        }

        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if !state.contains_key(&ip) && state.len() >= self.config.max_tracked_ips {
            state.retain(|_, ts| ts.iter().any(|&t| t > cutoff));
            if state.len() >= self.config.max_tracked_ips {
                tracing::warn!(ip = %ip, tracked = state.len(), "rate limiter table full");
                return Err(ServiceError::RateLimited);
            }
        }

        let timestamps = state.entry(ip).or_default();
        timestamps.retain(|&t| t > cutoff);
        if timestamps.len() >= self.config.max_requests as usize {
            tracing::warn!(
                ip = %ip,
                requests = timestamps.len(),
                max = self.config.max_requests,
                "rate limit exceeded"
            );
            return Err(ServiceError::RateLimited);
        }
        timestamps.push(now);
        Ok(())
    }

    /// Drop clients with no request inside the window.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        let cutoff = now.checked_sub(self.window()).unwrap_or(now);
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.retain(|_, ts| {
            ts.retain(|&t| t > cutoff);
            !ts.is_empty()
        });
    }

    /// Number of clients currently tracked.
    pub fn tracked(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
