// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Session identity.
//!
//! Authentication happens upstream; the authenticating proxy forwards the
//! signed-in user's id in the `x-author-id` header.

use crate::error::{FeedError, Result};
use crate::models::AuthorId;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// Header carrying the authenticated author id.
pub const AUTHOR_HEADER: &str = "x-author-id";

/// Identity of the caller, if signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session(pub Option<AuthorId>);

impl Session {
    pub fn author(&self) -> Option<&AuthorId> {
        self.0.as_ref()
    }

    /// The signed-in author, or `Unauthenticated`.
    pub fn require(&self) -> Result<&AuthorId> {
        self.author().ok_or(FeedError::Unauthenticated)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let author = parts
            .headers
            .get(AUTHOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(AuthorId::new);

        Ok(Session(author))
    }
}
