// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Author identity lookup.

use crate::error::{FeedError, Result};
use crate::models::{AuthorId, AuthorProfile, USERNAME_FALLBACK};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A user as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: AuthorId,
    pub username: Option<String>,
    pub profile_image_url: String,
}

impl UserRecord {
    /// Project into the public profile, masking a missing username.
    pub fn into_profile(self) -> AuthorProfile {
        AuthorProfile {
            id: self.id,
            username: self
                .username
                .unwrap_or_else(|| USERNAME_FALLBACK.to_string()),
            profile_image_url: self.profile_image_url,
        }
    }
}

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Return at most `limit` users among `ids`. Unknown ids are skipped.
    async fn get_users_by_ids(
        &self,
        ids: &[AuthorId],
        limit: usize,
    ) -> anyhow::Result<Vec<UserRecord>>;

    async fn get_user_by_id(&self, id: &AuthorId) -> anyhow::Result<Option<UserRecord>>;
}

/// In-memory identity provider.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityProvider {
    users: Arc<RwLock<HashMap<AuthorId, UserRecord>>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn remove(&self, id: &AuthorId) -> Option<UserRecord> {
        self.users.write().await.remove(id)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn get_users_by_ids(
        &self,
        ids: &[AuthorId],
        limit: usize,
    ) -> anyhow::Result<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .take(limit)
            .collect())
    }

    async fn get_user_by_id(&self, id: &AuthorId) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

/// Resolves author ids into profiles through an [`IdentityProvider`].
#[derive(Clone)]
pub struct IdentityResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a set of author ids in one provider call.
    ///
    /// Ids the provider does not know are absent from the returned map.
    pub async fn resolve_batch(
        &self,
        ids: &HashSet<AuthorId>,
    ) -> Result<HashMap<AuthorId, AuthorProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<AuthorId> = ids.iter().cloned().collect();
        let users = self
            .provider
            .get_users_by_ids(&ids, ids.len())
            .await
            .map_err(FeedError::Identity)?;
        debug!(requested = ids.len(), resolved = users.len(), "Resolved authors");

        Ok(users
            .into_iter()
            .map(|user| (user.id.clone(), user.into_profile()))
            .collect())
    }

    /// Resolve a single author id.
    pub async fn resolve_one(&self, id: &AuthorId) -> Result<Option<AuthorProfile>> {
        let user = self
            .provider
            .get_user_by_id(id)
            .await
            .map_err(FeedError::Identity)?;
        Ok(user.map(UserRecord::into_profile))
    }
}
