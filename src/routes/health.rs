// ABOUTME: Health check route for deployment probes
// ABOUTME: Reports service status and database reachability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Health check routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::server::ServerResources;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: `healthy` or `unhealthy`
    pub status: String,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Whether the database answered a probe query
    pub database: bool,
    /// Response timestamp
    pub timestamp: String,
}

/// Health check route handlers
pub struct HealthRoutes;

impl HealthRoutes {
    /// Build the health router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    /// Handle GET /health - service and database status
    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Response {
        let database = sqlx::query("SELECT 1")
            .execute(resources.database.pool())
            .await
            .is_ok();

        let status_code = if database {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        let response = HealthResponse {
            status: if database { "healthy" } else { "unhealthy" }.to_owned(),
            service: env!("CARGO_PKG_NAME").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            database,
            timestamp: Utc::now().to_rfc3339(),
        };

        (status_code, Json(response)).into_response()
    }
}
