// ABOUTME: Route handlers for the follow graph REST API
// ABOUTME: Subscription listing with nested recipes, follow and unfollow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Follow routes
//!
//! Each subscription entry is enriched with an `is_subscribed` flag
//! computed as "does the viewer follow this entry's author". On a user's
//! own subscription list that is vacuously true; clients depend on the
//! current output, so the computation is kept as is.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{FollowEntry, User},
    routes::recipes::RecipeSummaryResponse,
    routes::require_user,
    server::ServerResources,
};

/// One entry of the subscription list: the followed author plus their recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct FollowEntryResponse {
    /// Author email
    pub email: String,
    /// Author identifier
    pub id: String,
    /// Author username
    pub username: String,
    /// Author given name
    pub first_name: String,
    /// Author family name
    pub last_name: String,
    /// Whether the viewer follows this entry's author
    pub is_subscribed: bool,
    /// The author's recipes in compact form, newest first
    pub recipes: Vec<RecipeSummaryResponse>,
    /// Total number of recipes by this author
    pub recipes_count: i64,
}

impl From<FollowEntry> for FollowEntryResponse {
    fn from(entry: FollowEntry) -> Self {
        Self {
            email: entry.author.email.clone(),
            id: entry.author.id.to_string(),
            username: entry.author.username.clone(),
            first_name: entry.author.first_name.clone(),
            last_name: entry.author.last_name.clone(),
            is_subscribed: entry.is_subscribed,
            recipes: entry.recipes.iter().map(Into::into).collect(),
            recipes_count: entry.recipes_count,
        }
    }
}

/// Query parameters for subscription listings
#[derive(Debug, Deserialize, Default)]
pub struct SubscriptionsQuery {
    /// Cap for the nested recipe list of each entry
    pub recipe_limit: Option<u32>,
}

/// Follow route handlers
pub struct FollowsRoutes;

impl FollowsRoutes {
    /// Build the follows router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/subscriptions", get(Self::handle_list))
            .route("/api/users/:id/subscribe", post(Self::handle_subscribe))
            .route("/api/users/:id/subscribe", delete(Self::handle_unsubscribe))
            .with_state(resources)
    }

    /// Assemble one subscription entry for a viewer
    async fn build_entry(
        resources: &Arc<ServerResources>,
        viewer_id: Uuid,
        author: User,
        recipe_limit: Option<u32>,
    ) -> Result<FollowEntry, AppError> {
        let is_subscribed = resources
            .database
            .follows()
            .exists(viewer_id, author.id)
            .await?;
        let recipes = resources
            .database
            .recipes()
            .list_by_author(author.id, recipe_limit)
            .await?;
        let recipes_count = resources
            .database
            .recipes()
            .count_by_author(author.id)
            .await?;

        Ok(FollowEntry {
            author,
            is_subscribed,
            recipes,
            recipes_count,
        })
    }

    /// Handle GET /api/users/subscriptions - the caller's follow list
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<SubscriptionsQuery>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;

        let authors = resources
            .database
            .follows()
            .list_authors(auth.user_id)
            .await?;

        let mut entries = Vec::with_capacity(authors.len());
        for author in authors {
            let entry =
                Self::build_entry(&resources, auth.user_id, author, query.recipe_limit).await?;
            entries.push(FollowEntryResponse::from(entry));
        }

        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle POST /api/users/:id/subscribe - follow an author
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Query(query): Query<SubscriptionsQuery>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;

        let author = resources
            .database
            .users()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id}")))?;

        resources
            .database
            .follows()
            .create(auth.user_id, author.id)
            .await?;
        tracing::info!(user.id = %auth.user_id, author.id = %author.id, "follow created");

        let entry =
            Self::build_entry(&resources, auth.user_id, author, query.recipe_limit).await?;
        Ok((StatusCode::CREATED, Json(FollowEntryResponse::from(entry))).into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe - unfollow an author
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;

        let author = resources
            .database
            .users()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id}")))?;

        resources
            .database
            .follows()
            .delete(auth.user_id, author.id)
            .await?;
        tracing::info!(user.id = %auth.user_id, author.id = %author.id, "follow deleted");

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
