// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the feed.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Feed counters, registered on a registry owned by this value.
#[derive(Clone)]
pub struct FeedMetrics {
    registry: Registry,
    posts_created: IntCounter,
    admissions: IntCounterVec,
    pages_served: IntCounter,
    errors: IntCounterVec,
}

impl FeedMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let posts_created = IntCounter::new("posts_created_total", "Posts persisted")?;
        let admissions = IntCounterVec::new(
            Opts::new(
                "post_admissions_total",
                "Write admission decisions (allowed/denied)",
            ),
            &["decision"],
        )?;
        let pages_served = IntCounter::new("feed_pages_served_total", "Feed pages returned")?;
        let errors = IntCounterVec::new(
            Opts::new("feed_errors_total", "Failed feed requests by error kind"),
            &["kind"],
        )?;

        registry.register(Box::new(posts_created.clone()))?;
        registry.register(Box::new(admissions.clone()))?;
        registry.register(Box::new(pages_served.clone()))?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            registry,
            posts_created,
            admissions,
            pages_served,
            errors,
        })
    }

    pub fn record_admission(&self, allowed: bool) {
        let decision = if allowed { "allowed" } else { "denied" };
        self.admissions.with_label_values(&[decision]).inc();
    }

    pub fn record_post_created(&self) {
        self.posts_created.inc();
    }

    pub fn record_page_served(&self) {
        self.pages_served.inc();
    }

    pub fn record_error(&self, kind: &str) {
        self.errors.with_label_values(&[kind]).inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
