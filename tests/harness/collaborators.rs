// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Instrumented and failing collaborators.

use async_trait::async_trait;
use post_feed::{
    identity::{IdentityProvider, UserRecord},
    models::{AuthorId, Post, PostId},
    store::PostStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Post store whose every call fails.
pub struct UnavailableStore;

#[async_trait]
impl PostStore for UnavailableStore {
    async fn list_page(&self, _cursor: Option<PostId>, _limit: usize) -> anyhow::Result<Vec<Post>> {
        anyhow::bail!("connection refused")
    }

    async fn insert(&self, _author_id: AuthorId, _content: String) -> anyhow::Result<Post> {
        anyhow::bail!("connection refused")
    }
}

/// Identity provider that records the batches it is asked for.
pub struct RecordingIdentityProvider<P> {
    inner: P,
    batches: Mutex<Vec<Vec<AuthorId>>>,
    single_lookups: AtomicUsize,
}

impl<P> RecordingIdentityProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            batches: Mutex::new(Vec::new()),
            single_lookups: AtomicUsize::new(0),
        }
    }

    pub fn batches(&self) -> Vec<Vec<AuthorId>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn single_lookups(&self) -> usize {
        self.single_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: IdentityProvider> IdentityProvider for RecordingIdentityProvider<P> {
    async fn get_users_by_ids(
        &self,
        ids: &[AuthorId],
        limit: usize,
    ) -> anyhow::Result<Vec<UserRecord>> {
        self.batches.lock().unwrap().push(ids.to_vec());
        self.inner.get_users_by_ids(ids, limit).await
    }

    async fn get_user_by_id(&self, id: &AuthorId) -> anyhow::Result<Option<UserRecord>> {
        self.single_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_user_by_id(id).await
    }
}

/// Identity provider that is always down.
pub struct UnavailableIdentityProvider;

#[async_trait]
impl IdentityProvider for UnavailableIdentityProvider {
    async fn get_users_by_ids(
        &self,
        _ids: &[AuthorId],
        _limit: usize,
    ) -> anyhow::Result<Vec<UserRecord>> {
        anyhow::bail!("identity provider timeout")
    }

    async fn get_user_by_id(&self, _id: &AuthorId) -> anyhow::Result<Option<UserRecord>> {
        anyhow::bail!("identity provider timeout")
    }
}
