// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Post Feed
//!
//! A small social-post API:
//!
//! - Cursor-paginated feed, newest first, each post joined to its author
//! - Post creation behind a per-author sliding-window rate limit (10 per 10s)
//! - Current-user lookup
//!
//! Storage and identity are collaborators behind the [`store::PostStore`]
//! and [`identity::IdentityProvider`] traits; in-memory implementations of
//! both are provided.

pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod identity;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod session;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::FeedError;
pub use feed::FeedAssembler;
pub use limiter::{RateLimitResult, RateLimiter};
pub use models::{AuthorId, AuthorProfile, FeedItem, Page, Post, PostId};
pub use validator::{PostValidator, ValidationError, ValidationResult};
