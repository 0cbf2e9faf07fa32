// ABOUTME: Route module organization for the Potluck HTTP endpoints
// ABOUTME: Per-resource route definitions plus shared authentication helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Route module for the Potluck server
//!
//! This module organizes all HTTP routes by resource. Each module contains
//! route definitions and thin handler functions that authenticate the
//! caller, check permissions and delegate to the database managers.

use axum::http::HeaderMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::server::ServerResources;

/// Login and token issuing routes
pub mod auth;
/// Follow graph routes (subscriptions)
pub mod follows;
/// Health check routes
pub mod health;
/// Ingredient reference data routes
pub mod ingredients;
/// Recipe routes: CRUD, favorite/cart toggles and the shopping list export
pub mod recipes;
/// Tag reference data routes
pub mod tags;
/// User registration, profile and password routes
pub mod users;

pub use auth::AuthRoutes;
pub use follows::FollowsRoutes;
pub use health::HealthRoutes;
pub use ingredients::IngredientsRoutes;
pub use recipes::RecipesRoutes;
pub use tags::TagsRoutes;
pub use users::UsersRoutes;

/// Extract the `Authorization` header value, if present
fn bearer_header(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization").and_then(|h| h.to_str().ok())
}

/// Authenticate the caller, requiring a valid token for an existing user
///
/// # Errors
///
/// Returns an auth error when the header is missing or invalid, or when
/// the token's user no longer exists
pub(crate) async fn require_user(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<AuthResult> {
    let auth = resources
        .auth_manager
        .authenticate(bearer_header(headers))?;

    // A token can outlive its account; treat that as an invalid credential
    resources
        .database
        .users()
        .get(auth.user_id)
        .await?
        .ok_or_else(|| AppError::auth_invalid("Unknown user"))?;

    Ok(auth)
}

/// Resolve the viewer for anonymous-tolerant endpoints
///
/// Absent credentials yield `None`; present but invalid credentials are
/// still an error.
pub(crate) fn optional_user(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<Option<Uuid>> {
    match bearer_header(headers) {
        None => Ok(None),
        Some(header) => resources
            .auth_manager
            .authenticate(Some(header))
            .map(|auth| Some(auth.user_id)),
    }
}
