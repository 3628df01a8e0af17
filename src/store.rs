// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Post storage.
//!
//! [`PostStore`] is the contract a backing store implements; [`PostRepository`]
//! adapts it for the feed, adding the one-row lookahead used for paging and
//! content validation ahead of every insert.

use crate::error::{FeedError, Result};
use crate::models::{AuthorId, Post, PostId};
use crate::validator::PostValidator;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Backing store for posts, ordered by identifier.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Return up to `limit` posts in descending identifier order, beginning
    /// with `cursor` itself when given.
    async fn list_page(&self, cursor: Option<PostId>, limit: usize) -> anyhow::Result<Vec<Post>>;

    /// Persist a post, assigning a fresh identifier and creation time.
    async fn insert(&self, author_id: AuthorId, content: String) -> anyhow::Result<Post>;
}

#[derive(Debug, Default)]
struct Posts {
    by_id: BTreeMap<PostId, Post>,
    next_id: u64,
}

/// In-memory post store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPostStore {
    posts: Arc<RwLock<Posts>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load existing posts, keeping their identifiers. Later inserts receive
    /// identifiers above every seeded one.
    pub async fn seed(&self, posts: impl IntoIterator<Item = Post>) {
        let mut state = self.posts.write().await;
        for post in posts {
            state.next_id = state.next_id.max(post.id.0 + 1);
            state.by_id.insert(post.id, post);
        }
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list_page(&self, cursor: Option<PostId>, limit: usize) -> anyhow::Result<Vec<Post>> {
        let state = self.posts.read().await;
        let posts: Vec<Post> = match cursor {
            Some(cursor) => state
                .by_id
                .range(..=cursor)
                .rev()
                .take(limit)
                .map(|(_, post)| post.clone())
                .collect(),
            None => state
                .by_id
                .values()
                .rev()
                .take(limit)
                .cloned()
                .collect(),
        };
        Ok(posts)
    }

    async fn insert(&self, author_id: AuthorId, content: String) -> anyhow::Result<Post> {
        let mut state = self.posts.write().await;
        state.next_id = state.next_id.max(1);
        let id = PostId(state.next_id);
        state.next_id += 1;

        let post = Post {
            id,
            author_id,
            content,
            created_at: Utc::now(),
        };
        state.by_id.insert(id, post.clone());
        Ok(post)
    }
}

/// Feed-facing adapter over a [`PostStore`].
#[derive(Clone)]
pub struct PostRepository {
    store: Arc<dyn PostStore>,
    validator: PostValidator,
}

impl PostRepository {
    pub fn new(store: Arc<dyn PostStore>, validator: PostValidator) -> Self {
        Self { store, validator }
    }

    /// Fetch `page_size + 1` posts from `cursor` on. The extra row, when
    /// present, tells the caller another page exists.
    pub async fn list_page(&self, cursor: Option<PostId>, page_size: usize) -> Result<Vec<Post>> {
        let limit = page_size.saturating_add(1);
        let posts = self
            .store
            .list_page(cursor, limit)
            .await
            .map_err(FeedError::Store)?;
        debug!(?cursor, limit, fetched = posts.len(), "Fetched posts");
        Ok(posts)
    }

    /// Validate content and persist a new post.
    pub async fn insert(&self, author_id: AuthorId, content: String) -> Result<Post> {
        self.validator.validate_content(&content).into_result()?;
        self.store
            .insert(author_id, content)
            .await
            .map_err(FeedError::Store)
    }
}
