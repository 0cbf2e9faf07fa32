// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, auth, and fixture creation helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck
#![allow(dead_code, clippy::unwrap_used)]

//! Shared test utilities for `potluck_server`
//!
//! Common test setup functions to reduce duplication across integration
//! tests.

use potluck_server::{
    auth::{generate_jwt_secret, AuthManager},
    config::environment::{AuthConfig, DatabaseConfig, Environment, LogLevel, ServerConfig},
    database::{Database, IngredientAmount, NewRecipe},
    models::{Ingredient, Tag, User},
    server::ServerResources,
};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// A small decodable base64 image payload
pub const TEST_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:").await.unwrap()
}

/// Create test authentication manager
pub fn create_test_auth_manager() -> AuthManager {
    AuthManager::new(generate_jwt_secret().to_vec(), 24)
}

/// Create a standard test user
pub async fn create_test_user(database: &Database) -> User {
    create_test_user_with_email(database, "test@example.com", "testcook").await
}

/// Create a test user with custom email and username
pub async fn create_test_user_with_email(
    database: &Database,
    email: &str,
    username: &str,
) -> User {
    let user = User::new(
        email.to_owned(),
        username.to_owned(),
        "Test".to_owned(),
        "User".to_owned(),
        "test_hash".to_owned(),
    );
    database.users().create(&user).await.unwrap();
    user
}

/// Seed a standard set of tags and ingredients
///
/// Tags: breakfast, vegan, dinner. Ingredients: flour (g), sugar (g),
/// milk (ml).
pub async fn seed_reference_data(database: &Database) -> (Vec<Tag>, Vec<Ingredient>) {
    let tags = database.tags();
    let breakfast = tags.create("breakfast", "#E26C2D", "breakfast").await.unwrap();
    let vegan = tags.create("vegan", "#49B64E", "vegan").await.unwrap();
    let dinner = tags.create("dinner", "#8775D2", "dinner").await.unwrap();

    let ingredients = database.ingredients();
    let flour = ingredients.create("flour", "g").await.unwrap();
    let sugar = ingredients.create("sugar", "g").await.unwrap();
    let milk = ingredients.create("milk", "ml").await.unwrap();

    (
        vec![breakfast, vegan, dinner],
        vec![flour, sugar, milk],
    )
}

/// Build a recipe write payload with the given ingredient (id, amount)
/// lines and tag ids
pub fn recipe_payload(name: &str, ingredients: &[(i64, i64)], tags: &[i64]) -> NewRecipe {
    NewRecipe {
        name: name.to_owned(),
        text: "Mix everything and cook.".to_owned(),
        cooking_time: 15,
        image: Some(TEST_IMAGE.to_owned()),
        tags: tags.to_vec(),
        ingredients: ingredients
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect(),
    }
}

/// Complete test environment setup for route-level tests
///
/// Returns the shared resources; build a router with
/// `potluck_server::server::router(&resources)`.
pub async fn setup_test_environment() -> Arc<ServerResources> {
    let database = create_test_database().await;
    let auth_manager = create_test_auth_manager();
    let config = ServerConfig {
        http_port: 0,
        log_level: LogLevel::Warn,
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_owned(),
            jwt_expiry_hours: 24,
        },
    };

    Arc::new(ServerResources::new(
        database,
        auth_manager,
        Arc::new(config),
    ))
}
