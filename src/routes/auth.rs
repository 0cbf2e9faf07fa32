// ABOUTME: Route handlers for login and JWT token issuing
// ABOUTME: Verifies credentials against stored bcrypt hashes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Authentication routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{auth::verify_password, errors::AppError, server::ServerResources};

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User info for login response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub username: String,
}

/// User login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub jwt_token: String,
    pub expires_at: String,
    pub user: UserInfo,
}

/// Authentication route handlers
pub struct AuthRoutes;

impl AuthRoutes {
    /// Build the auth router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/login", post(Self::handle_login))
            .with_state(resources)
    }

    /// Handle POST /api/auth/login - verify credentials and issue a token
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .users()
            .get_by_email(&body.email)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        let valid = verify_password(body.password, user.password_hash.clone()).await?;
        if !valid {
            tracing::warn!(user.id = %user.id, "login failed: bad password");
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let jwt_token = resources.auth_manager.generate_token(&user)?;
        let expires_at =
            (Utc::now() + Duration::hours(resources.config.auth.jwt_expiry_hours)).to_rfc3339();
        tracing::info!(user.id = %user.id, "login succeeded");

        let response = LoginResponse {
            jwt_token,
            expires_at,
            user: UserInfo {
                user_id: user.id.to_string(),
                email: user.email,
                username: user.username,
            },
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
