// ABOUTME: Route handlers for the read-only tags REST API
// ABOUTME: Listing and retrieval of admin-managed tag reference data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Tag routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{errors::AppError, models::Tag, server::ServerResources};

/// Response for a tag
#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Hex color code
    pub color: String,
    /// URL slug
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

/// Tag route handlers
pub struct TagsRoutes;

impl TagsRoutes {
    /// Build the tags router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tags", get(Self::handle_list))
            .route("/api/tags/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/tags - list all tags
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let tags = resources.database.tags().list().await?;
        let response: Vec<TagResponse> = tags.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/tags/:id - retrieve one tag
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let tag = resources
            .database
            .tags()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tag {id}")))?;

        Ok((StatusCode::OK, Json(TagResponse::from(tag))).into_response())
    }
}
