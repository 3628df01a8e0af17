// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Post Feed Service
//!
//! Serves a cursor-paginated post feed and rate-limited post creation.
//!
//! ## Endpoints
//!
//! - `GET /posts?cursor=&pageSize=`: one feed page
//! - `GET /posts/all`: newest 100 posts, unpaginated
//! - `POST /posts`: create a post (requires `x-author-id`)
//! - `GET /me`: current user profile (requires `x-author-id`)
//! - `GET /metrics`: Prometheus metrics
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and `.env`):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX_POSTS`: Posts per author per window (default: 10)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length in seconds (default: 10)
//! - `DEFAULT_PAGE_SIZE`: Feed page size (default: 5)
//! - `MAX_PAGE_SIZE`: Largest requestable page size (default: 100)
//! - `METRICS_ENABLED`: Serve `/metrics` (default: true)
//! - `SEED_USERS`: `id:username` pairs, comma separated, loaded into the
//!   in-memory identity provider

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use post_feed::{
    config::Config,
    feed::FeedAssembler,
    handlers::{router, AppState},
    identity::{IdentityResolver, InMemoryIdentityProvider, UserRecord},
    limiter::RateLimiter,
    metrics::FeedMetrics,
    models::AuthorId,
    store::{InMemoryPostStore, PostRepository},
    validator::PostValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        max_posts = config.rate_limit.max_posts,
        window_secs = config.rate_limit.window_secs,
        default_page_size = config.feed.default_page_size,
        "Starting post feed"
    );

    // Collaborators
    let store = InMemoryPostStore::new();
    let users = InMemoryIdentityProvider::new();
    let seeded = seed_users(&users, std::env::var("SEED_USERS").ok().as_deref()).await;
    warn!(seeded_users = seeded, "Using in-memory post store and identity provider");

    let validator = PostValidator::new(config.validation.clone(), config.feed.clone());
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    let feed = FeedAssembler::new(
        PostRepository::new(Arc::new(store), validator.clone()),
        IdentityResolver::new(Arc::new(users)),
        limiter.clone(),
        validator,
        FeedMetrics::new()?,
    );

    let state = Arc::new(AppState {
        feed,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_interval = config.rate_limit.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load `id:username` pairs into the identity provider.
async fn seed_users(users: &InMemoryIdentityProvider, pairs: Option<&str>) -> usize {
    let mut count = 0;
    for entry in pairs.unwrap_or_default().split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (id, username) = match entry.split_once(':') {
            Some((id, name)) => (id.trim(), Some(name.trim().to_string())),
            None => (entry, None),
        };
        users
            .upsert(UserRecord {
                id: AuthorId::new(id),
                username: username.filter(|n| !n.is_empty()),
                profile_image_url: String::new(),
            })
            .await;
        count += 1;
    }
    count
}
