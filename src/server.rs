// ABOUTME: Server assembly: shared resource container and router construction
// ABOUTME: Merges per-resource routers and applies HTTP middleware layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! # Server Resources Module
//!
//! Centralized resource container for dependency injection. Expensive
//! shared resources (database pool, auth manager) are created once and
//! shared across all route handlers via `Arc`.

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::routes::{
    AuthRoutes, FollowsRoutes, HealthRoutes, IngredientsRoutes, RecipesRoutes, TagsRoutes,
    UsersRoutes,
};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper `Arc` sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            config,
        }
    }
}

/// Build the full application router
#[must_use]
pub fn router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(UsersRoutes::routes(resources.clone()))
        .merge(FollowsRoutes::routes(resources.clone()))
        .merge(TagsRoutes::routes(resources.clone()))
        .merge(IngredientsRoutes::routes(resources.clone()))
        .merge(RecipesRoutes::routes(resources.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind the HTTP listener and serve requests until shutdown
///
/// # Errors
///
/// Returns an error if binding or serving fails
pub async fn run_http_server(resources: Arc<ServerResources>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {addr}");

    axum::serve(listener, router(&resources)).await?;
    Ok(())
}
