// ABOUTME: Route handlers for the users REST API
// ABOUTME: Registration, listing, profile retrieval and password changes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! User routes
//!
//! Registration and the user read surface. The read shape carries a
//! viewer-relative `is_subscribed` flag which is always `false` for
//! anonymous callers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password},
    errors::AppError,
    models::User,
    routes::{optional_user, require_user},
    server::ServerResources,
};

/// User read shape with the viewer-relative subscription flag
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// Email address
    pub email: String,
    /// Unique identifier
    pub id: String,
    /// Public username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the viewer follows this user
    pub is_subscribed: bool,
}

impl UserResponse {
    /// Map a user row for a given viewer
    #[must_use]
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id.to_string(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// Registration request payload
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address (must be unique)
    pub email: String,
    /// Public username (must be unique)
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

/// Registration response; the write shape has no viewer-relative fields
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Email address
    pub email: String,
    /// Unique identifier
    pub id: String,
    /// Public username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

/// Password change request payload
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    /// The replacement password
    pub new_password: String,
    /// The current password, verified before the change
    pub current_password: String,
}

/// Password change confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct SetPasswordResponse {
    /// Confirmation message
    pub result: String,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, Default)]
pub struct ListUsersQuery {
    /// Maximum results to return
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

/// User route handlers
pub struct UsersRoutes;

impl UsersRoutes {
    /// Build the users router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users", get(Self::handle_list))
            .route("/api/users", post(Self::handle_register))
            .route("/api/users/me", get(Self::handle_me))
            .route("/api/users/set_password", post(Self::handle_set_password))
            .route("/api/users/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/users - list users, anonymous-tolerant
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        axum::extract::Query(query): axum::extract::Query<ListUsersQuery>,
    ) -> Result<Response, AppError> {
        let viewer = optional_user(&headers, &resources)?;

        let users = resources
            .database
            .users()
            .list(query.limit, query.offset)
            .await?;

        let follows = resources.database.follows();
        let mut responses = Vec::with_capacity(users.len());
        for user in &users {
            let is_subscribed = match viewer {
                Some(viewer_id) => follows.exists(viewer_id, user.id).await?,
                None => false,
            };
            responses.push(UserResponse::from_user(user, is_subscribed));
        }

        Ok((StatusCode::OK, Json(responses)).into_response())
    }

    /// Handle POST /api/users - register a new user
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        if body.password.is_empty() {
            return Err(AppError::missing_field("password"));
        }

        let password_hash = hash_password(body.password).await?;
        let user = User::new(
            body.email,
            body.username,
            body.first_name,
            body.last_name,
            password_hash,
        );

        resources.database.users().create(&user).await?;
        tracing::info!(user.id = %user.id, "user registered");

        let response = RegisterResponse {
            email: user.email,
            id: user.id.to_string(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/users/me - the caller's own profile
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;

        let user = resources
            .database
            .users()
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", auth.user_id)))?;

        // One's own profile is never "subscribed to"
        let response = UserResponse::from_user(&user, false);
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/users/set_password - change the caller's password
    async fn handle_set_password(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;

        let user = resources
            .database
            .users()
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {}", auth.user_id)))?;

        let valid = verify_password(body.current_password, user.password_hash.clone()).await?;
        if !valid {
            return Err(AppError::invalid_input("Current password is incorrect"));
        }

        let new_hash = hash_password(body.new_password).await?;
        resources
            .database
            .users()
            .update_password(auth.user_id, &new_hash)
            .await?;
        tracing::info!(user.id = %auth.user_id, "password changed");

        let response = SetPasswordResponse {
            result: "Done!".to_owned(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/users/:id - retrieve a user, anonymous-tolerant
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let viewer = optional_user(&headers, &resources)?;

        let user = resources
            .database
            .users()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id}")))?;

        let is_subscribed = match viewer {
            Some(viewer_id) => resources.database.follows().exists(viewer_id, user.id).await?,
            None => false,
        };

        let response = UserResponse::from_user(&user, is_subscribed);
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
