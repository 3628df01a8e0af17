// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Seeded feed fixtures.

use chrono::{Duration, TimeZone, Utc};
use post_feed::{
    config::{Config, RateLimitConfig},
    feed::FeedAssembler,
    handlers::AppState,
    identity::{IdentityProvider, IdentityResolver, InMemoryIdentityProvider, UserRecord},
    limiter::RateLimiter,
    metrics::FeedMetrics,
    models::{AuthorId, Post, PostId},
    store::{InMemoryPostStore, PostRepository, PostStore},
    validator::PostValidator,
};
use std::sync::Arc;

/// A feed wired to in-memory collaborators.
pub struct Harness {
    pub feed: Arc<FeedAssembler>,
    pub store: InMemoryPostStore,
    pub users: InMemoryIdentityProvider,
}

/// Posts with ids `1..=count`, authored round-robin by `authors`.
pub fn generate_posts(count: u64, authors: &[&str]) -> Vec<Post> {
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (1..=count)
        .map(|id| Post {
            id: PostId(id),
            author_id: AuthorId::new(authors[(id as usize - 1) % authors.len()]),
            content: format!("post number {}", id),
            created_at: epoch + Duration::minutes(id as i64),
        })
        .collect()
}

pub fn user(id: &str) -> UserRecord {
    UserRecord {
        id: AuthorId::new(id),
        username: Some(id.to_string()),
        profile_image_url: format!("https://img.example.com/{}.png", id),
    }
}

pub fn build_feed(
    config: &Config,
    store: Arc<dyn PostStore>,
    identities: Arc<dyn IdentityProvider>,
) -> FeedAssembler {
    let validator = PostValidator::new(config.validation.clone(), config.feed.clone());
    FeedAssembler::new(
        PostRepository::new(store, validator.clone()),
        IdentityResolver::new(identities),
        Arc::new(RateLimiter::new(config.rate_limit.clone())),
        validator,
        FeedMetrics::new().unwrap(),
    )
}

impl Harness {
    /// Seed `post_count` posts by `authors`, registering `known_users` with
    /// the identity provider.
    pub async fn seeded(post_count: u64, authors: &[&str], known_users: &[&str]) -> Self {
        Self::with_config(Config::default(), post_count, authors, known_users).await
    }

    pub async fn with_config(
        config: Config,
        post_count: u64,
        authors: &[&str],
        known_users: &[&str],
    ) -> Self {
        let store = InMemoryPostStore::new();
        if post_count > 0 {
            store.seed(generate_posts(post_count, authors)).await;
        }

        let users = InMemoryIdentityProvider::new();
        for id in known_users {
            users.upsert(user(id)).await;
        }

        let feed = build_feed(&config, Arc::new(store.clone()), Arc::new(users.clone()));
        Self {
            feed: Arc::new(feed),
            store,
            users,
        }
    }

    /// Harness with a custom rate limit and no posts.
    pub async fn rate_limited(max_posts: u32, window_secs: u64, known_users: &[&str]) -> Self {
        let config = Config {
            rate_limit: RateLimitConfig {
                max_posts,
                window_secs,
                ..Default::default()
            },
            ..Default::default()
        };
        Self::with_config(config, 0, &[], known_users).await
    }
}

/// Application state over in-memory collaborators, for router tests.
pub async fn app_state(post_count: u64, authors: &[&str], known_users: &[&str]) -> Arc<AppState> {
    let config = Config::default();
    let store = InMemoryPostStore::new();
    if post_count > 0 {
        store.seed(generate_posts(post_count, authors)).await;
    }
    let users = InMemoryIdentityProvider::new();
    for id in known_users {
        users.upsert(user(id)).await;
    }

    Arc::new(AppState {
        feed: build_feed(&config, Arc::new(store), Arc::new(users)),
        config,
    })
}
