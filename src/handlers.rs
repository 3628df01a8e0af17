// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the post feed service.

use crate::config::Config;
use crate::error::Result;
use crate::feed::FeedAssembler;
use crate::models::{AuthorProfile, FeedItem, Page, Post, PostId};
use crate::session::Session;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Shared application state.
pub struct AppState {
    pub feed: FeedAssembler,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Feed page query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub cursor: Option<PostId>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// New post request.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct HelloQuery {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub greeting: String,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/hello", get(hello))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/all", get(list_all_posts))
        .route("/me", get(me));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "post-feed",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn hello(Query(query): Query<HelloQuery>) -> Json<HelloResponse> {
    Json(HelloResponse {
        greeting: format!("Hello {}", query.text),
    })
}

/// One page of the feed.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page>> {
    debug!(cursor = ?query.cursor, page_size = ?query.page_size, "Listing posts");
    let page = state.feed.get_page(query.cursor, query.page_size).await?;
    Ok(Json(page))
}

/// Newest posts, unpaginated.
pub async fn list_all_posts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<FeedItem>>> {
    Ok(Json(state.feed.get_all().await?))
}

/// Create a post as the signed-in author.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let author = session.require().map_err(|err| {
        state.feed.metrics().record_error(err.kind());
        err
    })?;
    let post = state.feed.create_post(author, req.content).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Profile of the signed-in user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<AuthorProfile>> {
    let profile = state.feed.get_current_user(session.author()).await?;
    Ok(Json(profile))
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.feed.metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
