// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the post feed service.
//!
//! Defaults describe the canonical posting policy: ten posts per author in
//! any trailing ten second span, five posts per feed page, 280 characters
//! per post.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Configuration for the post feed service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Write admission configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Feed pagination configuration
    #[serde(default)]
    pub feed: FeedConfig,

    /// Post content validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding-window admission limits applied per author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted posts per author per window (default: 10)
    #[serde(default = "default_max_posts")]
    pub max_posts: u32,

    /// Length of the sliding window in seconds (default: 10)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Interval between sweeps of idle author logs in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Feed pagination limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Page size used when the caller does not supply one (default: 5)
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Largest page size a caller may request (default: 100)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

/// Post content validation limits, counted in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum content length (default: 1)
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// Maximum content length (default: 280)
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_posts() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    10
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_page_size() -> usize {
    5
}

fn default_max_page_size() -> usize {
    100
}

fn default_min_content_chars() -> usize {
    1
}

fn default_max_content_chars() -> usize {
    280
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            feed: FeedConfig::default(),
            validation: ValidationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_posts: default_max_posts(),
            window_secs: default_window_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_content_chars: default_min_content_chars(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the sliding window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the idle sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// Recognised variables:
    ///
    /// - `BIND_ADDR`
    /// - `RATE_LIMIT_MAX_POSTS`
    /// - `RATE_LIMIT_WINDOW_SECS`
    /// - `DEFAULT_PAGE_SIZE`
    /// - `MAX_PAGE_SIZE`
    /// - `METRICS_ENABLED`
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_posts: parsed(&lookup, "RATE_LIMIT_MAX_POSTS")
                    .unwrap_or(defaults.rate_limit.max_posts),
                window_secs: parsed(&lookup, "RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or(defaults.rate_limit.window_secs),
                ..defaults.rate_limit
            },
            feed: FeedConfig {
                default_page_size: parsed(&lookup, "DEFAULT_PAGE_SIZE")
                    .unwrap_or(defaults.feed.default_page_size),
                max_page_size: parsed(&lookup, "MAX_PAGE_SIZE")
                    .unwrap_or(defaults.feed.max_page_size),
            },
            metrics: MetricsConfig {
                enabled: parsed(&lookup, "METRICS_ENABLED").unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
            ..defaults
        }
        .sanitized()
    }

    /// Replace values the limiter or the pager cannot work with by defaults.
    ///
    /// Limits and windows must be at least one, and the default page size
    /// must fall within `1..=max_page_size`.
    pub fn sanitized(mut self) -> Self {
        if self.rate_limit.max_posts == 0 {
            warn!("RATE_LIMIT_MAX_POSTS must be at least 1, using default");
            self.rate_limit.max_posts = default_max_posts();
        }
        if self.rate_limit.window_secs == 0 {
            warn!("RATE_LIMIT_WINDOW_SECS must be at least 1, using default");
            self.rate_limit.window_secs = default_window_secs();
        }
        if self.rate_limit.cleanup_interval_secs == 0 {
            self.rate_limit.cleanup_interval_secs = default_cleanup_interval_secs();
        }
        self.feed = self.feed.sanitized();
        self
    }
}

impl FeedConfig {
    /// Keep `1 <= default_page_size <= max_page_size < usize::MAX`.
    pub fn sanitized(mut self) -> Self {
        if self.max_page_size == 0 || self.max_page_size == usize::MAX {
            warn!(
                max_page_size = self.max_page_size,
                "Invalid MAX_PAGE_SIZE, using default"
            );
            self.max_page_size = default_max_page_size();
        }
        if !(1..=self.max_page_size).contains(&self.default_page_size) {
            let fallback = default_page_size().min(self.max_page_size);
            warn!(
                default_page_size = self.default_page_size,
                max_page_size = self.max_page_size,
                fallback,
                "DEFAULT_PAGE_SIZE out of range"
            );
            self.default_page_size = fallback;
        }
        self
    }
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
