// ABOUTME: Main server binary for the Potluck recipe sharing backend
// ABOUTME: Loads configuration, initializes the database and serves the REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! # Potluck Server Binary
//!
//! Starts the recipe sharing REST API with JWT authentication and a
//! `SQLite`-backed store.

use anyhow::Result;
use clap::Parser;
use potluck_server::{
    auth::AuthManager, config::environment::ServerConfig, database::Database, logging,
    server::{run_http_server, ServerResources},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "potluck-server")]
#[command(about = "Potluck - recipe sharing backend API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;

    // Override port if specified
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting Potluck Server");
    info!("{}", config.summary());

    // Initialize database and run migrations
    let database = Database::new(&config.database.url).await?;
    info!("Database initialized successfully: {}", config.database.url);

    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.clone().into_bytes(),
        config.auth.jwt_expiry_hours,
    );

    let resources = Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ));

    run_http_server(resources).await
}
