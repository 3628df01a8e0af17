// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter for post creation.
//!
//! Each author owns a rolling log of admission instants. A request is admitted
//! only while fewer than `max_posts` admissions fall inside the trailing
//! window, so the bound holds for any window-sized span, not just aligned
//! buckets.

use crate::config::RateLimitConfig;
use crate::models::AuthorId;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed and has been counted against the window
    Allowed {
        /// Admissions still available in the current window
        remaining: u32,
        /// Time until the oldest counted admission leaves the window
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until a slot frees up
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Admission log for one author.
#[derive(Debug, Default)]
struct AdmissionLog {
    admitted: VecDeque<Instant>,
}

impl AdmissionLog {
    /// Drop admissions that have left the window.
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.admitted.front() {
            if now.duration_since(*oldest) >= window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }

    fn time_until_slot(&self, now: Instant, window: Duration) -> Duration {
        match self.admitted.front() {
            Some(oldest) => window.saturating_sub(now.duration_since(*oldest)),
            None => window,
        }
    }
}

/// Thread-safe per-author rate limiter.
///
/// Constructed once and shared by reference; it is not a process global.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-author admission logs
    logs: Arc<RwLock<HashMap<AuthorId, AdmissionLog>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            logs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check and, if admitted, record a post by `author`.
    ///
    /// The check and the record happen under one write lock, so concurrent
    /// calls for the same author can never both take the last slot.
    pub async fn allow(&self, author: &AuthorId) -> RateLimitResult {
        let window = self.config.window_duration();
        let max = self.config.max_posts as usize;
        let mut logs = self.logs.write().await;
        // Read the clock under the lock so each log stays in admission order
        let now = Instant::now();
        let log = logs.entry(author.clone()).or_default();
        log.prune(now, window);

        if log.admitted.len() < max {
            log.admitted.push_back(now);
            let remaining = (max - log.admitted.len()) as u32;
            RateLimitResult::Allowed {
                remaining,
                reset_in: log.time_until_slot(now, window),
            }
        } else {
            let retry_after = log.time_until_slot(now, window);
            debug!(author_id = %author, ?retry_after, "Author rate limit exceeded");
            RateLimitResult::Limited { retry_after }
        }
    }

    /// Number of authors currently tracked.
    pub async fn tracked_authors(&self) -> usize {
        self.logs.read().await.len()
    }

    /// Clean up authors with no admissions left in the window (should be
    /// called periodically).
    pub async fn cleanup(&self) {
        let window = self.config.window_duration();
        let mut logs = self.logs.write().await;
        let now = Instant::now();
        logs.retain(|_, log| {
            log.prune(now, window);
            !log.admitted.is_empty()
        });
    }
}
