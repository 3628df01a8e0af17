// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the post feed.

use crate::models::{AuthorId, PostId};
use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors terminating a feed request.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Too many posts, retry in {}s", retry_after_secs(.retry_after))]
    RateLimited { retry_after: Duration },

    #[error("Post {post_id} references unknown author {author_id}")]
    InternalInconsistency { post_id: PostId, author_id: AuthorId },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("User not found: {0}")]
    NotFound(AuthorId),

    #[error("Post store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("Identity provider error: {0}")]
    Identity(#[source] anyhow::Error),
}

impl FeedError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Validation(_) => "validation",
            FeedError::RateLimited { .. } => "rate_limited",
            FeedError::InternalInconsistency { .. } => "internal_inconsistency",
            FeedError::Unauthenticated => "unauthenticated",
            FeedError::NotFound(_) => "not_found",
            FeedError::Store(_) => "store",
            FeedError::Identity(_) => "identity",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FeedError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Whole seconds to wait, rounded up so clients never retry too early.
fn retry_after_secs(retry_after: &Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            FeedError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            FeedError::RateLimited { retry_after } => {
                let secs = retry_after_secs(retry_after);
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, secs.to_string())],
                    Json(ErrorResponse {
                        error: self.to_string(),
                        code: "RATE_LIMITED",
                        retry_after_secs: Some(secs),
                    }),
                )
                    .into_response();
            }
            FeedError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", self.to_string())
            }
            FeedError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            FeedError::InternalInconsistency { .. }
            | FeedError::Store(_)
            | FeedError::Identity(_) => {
                tracing::error!(error = %self, kind = self.kind(), "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code,
                retry_after_secs: None,
            }),
        )
            .into_response()
    }
}
