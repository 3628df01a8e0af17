// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Feed assembly.
//!
//! Reads fetch one row past the requested page size to learn whether another
//! page exists, then join every post to its author. A post whose author the
//! identity provider does not know fails the whole page. Writes pass the
//! per-author rate limiter before anything is inserted.

use crate::error::{FeedError, Result};
use crate::identity::IdentityResolver;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::FeedMetrics;
use crate::models::{AuthorId, AuthorProfile, FeedItem, Page, Post, PostId};
use crate::store::PostRepository;
use crate::validator::PostValidator;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Page size of the unpaginated listing.
pub const LEGACY_PAGE_SIZE: usize = 100;

/// Orchestrates the post store, identity resolver and rate limiter.
pub struct FeedAssembler {
    posts: PostRepository,
    identities: IdentityResolver,
    limiter: Arc<RateLimiter>,
    validator: PostValidator,
    metrics: FeedMetrics,
}

impl FeedAssembler {
    pub fn new(
        posts: PostRepository,
        identities: IdentityResolver,
        limiter: Arc<RateLimiter>,
        validator: PostValidator,
        metrics: FeedMetrics,
    ) -> Self {
        Self {
            posts,
            identities,
            limiter,
            validator,
            metrics,
        }
    }

    pub fn metrics(&self) -> &FeedMetrics {
        &self.metrics
    }

    /// Fetch one page of the feed, newest first.
    ///
    /// `page_size` defaults to the configured page size. `cursor` is the
    /// `next_cursor` of the previous page.
    pub async fn get_page(&self, cursor: Option<PostId>, page_size: Option<usize>) -> Result<Page> {
        let result = match self.validator.page_size(page_size) {
            Ok(page_size) => self.assemble_page(cursor, page_size).await,
            Err(err) => Err(err.into()),
        };
        self.observe(result)
    }

    /// Fetch the newest posts without paging.
    pub async fn get_all(&self) -> Result<Vec<FeedItem>> {
        let result = self.assemble_page(None, LEGACY_PAGE_SIZE).await;
        self.observe(result).map(|page| page.items)
    }

    async fn assemble_page(&self, cursor: Option<PostId>, page_size: usize) -> Result<Page> {
        let mut posts = self.posts.list_page(cursor, page_size).await?;

        let next_cursor = posts.get(page_size).map(|post| post.id);
        posts.truncate(page_size);

        let author_ids: HashSet<AuthorId> =
            posts.iter().map(|post| post.author_id.clone()).collect();
        let authors = self.identities.resolve_batch(&author_ids).await?;

        let items = posts
            .into_iter()
            .map(|post| match authors.get(&post.author_id) {
                Some(author) => Ok(FeedItem {
                    author: author.clone(),
                    post,
                }),
                None => {
                    error!(
                        post_id = %post.id,
                        author_id = %post.author_id,
                        "Post author not found"
                    );
                    Err(FeedError::InternalInconsistency {
                        post_id: post.id,
                        author_id: post.author_id,
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(?cursor, page_size, items = items.len(), ?next_cursor, "Assembled page");
        self.metrics.record_page_served();
        Ok(Page { items, next_cursor })
    }

    /// Create a post for `author` if the author is within their rate limit.
    pub async fn create_post(&self, author: &AuthorId, content: String) -> Result<Post> {
        let result = self.admit_and_insert(author, content).await;
        self.observe(result)
    }

    async fn admit_and_insert(&self, author: &AuthorId, content: String) -> Result<Post> {
        match self.limiter.allow(author).await {
            RateLimitResult::Allowed { remaining, .. } => {
                self.metrics.record_admission(true);
                debug!(author_id = %author, remaining, "Post admitted");
            }
            RateLimitResult::Limited { retry_after } => {
                self.metrics.record_admission(false);
                info!(
                    author_id = %author,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Post rate limited"
                );
                return Err(FeedError::RateLimited { retry_after });
            }
        }

        let post = self.posts.insert(author.clone(), content).await?;
        self.metrics.record_post_created();
        info!(author_id = %author, post_id = %post.id, "Post created");
        Ok(post)
    }

    /// Profile of the signed-in user.
    pub async fn get_current_user(&self, session: Option<&AuthorId>) -> Result<AuthorProfile> {
        let result = match session {
            None => Err(FeedError::Unauthenticated),
            Some(id) => match self.identities.resolve_one(id).await {
                Ok(Some(profile)) => Ok(profile),
                Ok(None) => Err(FeedError::NotFound(id.clone())),
                Err(err) => Err(err),
            },
        };
        self.observe(result)
    }

    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|err| {
            self.metrics.record_error(err.kind());
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::identity::{InMemoryIdentityProvider, UserRecord};
    use crate::store::{InMemoryPostStore, PostStore};
    use crate::validator::ValidationError;
    use chrono::Utc;

    struct Fixture {
        feed: FeedAssembler,
        store: InMemoryPostStore,
        users: InMemoryIdentityProvider,
    }

    async fn fixture(post_authors: &[&str], known_users: &[&str]) -> Fixture {
        let store = InMemoryPostStore::new();
        store
            .seed(post_authors.iter().enumerate().map(|(i, author)| Post {
                id: PostId(i as u64 + 1),
                author_id: AuthorId::new(*author),
                content: format!("post {}", i + 1),
                created_at: Utc::now(),
            }))
            .await;

        let users = InMemoryIdentityProvider::new();
        for id in known_users {
            users
                .upsert(UserRecord {
                    id: AuthorId::new(*id),
                    username: Some(id.to_string()),
                    profile_image_url: format!("https://img.example.com/{}.png", id),
                })
                .await;
        }

        let validator = PostValidator::default();
        let feed = FeedAssembler::new(
            PostRepository::new(Arc::new(store.clone()), validator.clone()),
            IdentityResolver::new(Arc::new(users.clone())),
            Arc::new(RateLimiter::new(RateLimitConfig::default())),
            validator,
            FeedMetrics::new().unwrap(),
        );

        Fixture { feed, store, users }
    }

    fn ids(page: &Page) -> Vec<u64> {
        page.post_ids().into_iter().map(|id| id.0).collect()
    }

    #[tokio::test]
    async fn test_page_chain_over_five_posts() {
        let f = fixture(&["a"; 5], &["a"]).await;

        let first = f.feed.get_page(None, Some(2)).await.unwrap();
        assert_eq!(ids(&first), vec![5, 4]);
        assert_eq!(first.next_cursor, Some(PostId(3)));

        let second = f.feed.get_page(first.next_cursor, Some(2)).await.unwrap();
        assert_eq!(ids(&second), vec![3, 2]);
        assert_eq!(second.next_cursor, Some(PostId(1)));

        let third = f.feed.get_page(second.next_cursor, Some(2)).await.unwrap();
        assert_eq!(ids(&third), vec![1]);
        assert_eq!(third.next_cursor, None);
    }

    #[tokio::test]
    async fn test_exact_page_has_no_cursor() {
        let f = fixture(&["a"; 5], &["a"]).await;
        let page = f.feed.get_page(None, None).await.unwrap();
        assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let f = fixture(&[], &[]).await;
        let page = f.feed.get_page(None, None).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_items_carry_their_author() {
        let f = fixture(&["a", "b", "a"], &["a", "b"]).await;
        let page = f.feed.get_page(None, None).await.unwrap();
        for item in &page.items {
            assert_eq!(item.post.author_id, item.author.id);
        }
    }

    #[tokio::test]
    async fn test_unknown_author_fails_page() {
        let f = fixture(&["a", "ghost", "a"], &["a"]).await;
        let err = f.feed.get_page(None, None).await.unwrap_err();
        match err {
            FeedError::InternalInconsistency { post_id, author_id } => {
                assert_eq!(post_id, PostId(2));
                assert_eq!(author_id, AuthorId::new("ghost"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_author_outside_page_is_ignored() {
        // Post 1 is the lookahead row, its author is never resolved
        let f = fixture(&["ghost", "a", "a"], &["a"]).await;
        let page = f.feed.get_page(None, Some(2)).await.unwrap();
        assert_eq!(ids(&page), vec![3, 2]);
        assert_eq!(page.next_cursor, Some(PostId(1)));
    }

    #[tokio::test]
    async fn test_invalid_page_size() {
        let f = fixture(&["a"], &["a"]).await;
        let err = f.feed.get_page(None, Some(0)).await.unwrap_err();
        assert!(matches!(
            err,
            FeedError::Validation(ValidationError::PageSize { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_all_returns_newest_hundred() {
        let authors = vec!["a"; 120];
        let f = fixture(&authors, &["a"]).await;
        let items = f.feed.get_all().await.unwrap();
        assert_eq!(items.len(), LEGACY_PAGE_SIZE);
        assert_eq!(items[0].post.id, PostId(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_post_rate_limited_after_ten() {
        let f = fixture(&[], &["a"]).await;
        let author = AuthorId::new("a");

        for i in 0..10 {
            f.feed
                .create_post(&author, format!("post {}", i))
                .await
                .unwrap();
        }
        let err = f
            .feed
            .create_post(&author, "one too many".into())
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::RateLimited { .. }));
        assert_eq!(f.store.len().await, 10);
    }

    #[tokio::test]
    async fn test_create_post_validates_content() {
        let f = fixture(&[], &["a"]).await;
        let author = AuthorId::new("a");

        assert!(f.feed.create_post(&author, "x".into()).await.is_ok());
        assert!(f.feed.create_post(&author, "x".repeat(280)).await.is_ok());
        assert!(matches!(
            f.feed.create_post(&author, String::new()).await,
            Err(FeedError::Validation(_))
        ));
        assert!(matches!(
            f.feed.create_post(&author, "x".repeat(281)).await,
            Err(FeedError::Validation(_))
        ));
        assert_eq!(f.store.len().await, 2);
    }

    #[tokio::test]
    async fn test_created_post_appears_first() {
        let f = fixture(&["a", "a"], &["a"]).await;
        let created = f
            .feed
            .create_post(&AuthorId::new("a"), "fresh".into())
            .await
            .unwrap();

        let page = f.feed.get_page(None, Some(1)).await.unwrap();
        assert_eq!(page.items[0].post, created);
        assert!(f.store.list_page(None, 10).await.unwrap().len() == 3);
    }

    #[tokio::test]
    async fn test_get_current_user() {
        let f = fixture(&[], &["a"]).await;

        assert!(matches!(
            f.feed.get_current_user(None).await,
            Err(FeedError::Unauthenticated)
        ));

        let me = f
            .feed
            .get_current_user(Some(&AuthorId::new("a")))
            .await
            .unwrap();
        assert_eq!(me.username, "a");

        f.users.remove(&AuthorId::new("a")).await;
        assert!(matches!(
            f.feed.get_current_user(Some(&AuthorId::new("a"))).await,
            Err(FeedError::NotFound(_))
        ));
    }
}
