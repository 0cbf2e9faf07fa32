// ABOUTME: SQLite data store for users, recipes, reference data and edges
// ABOUTME: Owns the connection pool, schema migration and per-resource managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! # Database Management
//!
//! This module provides database functionality for the Potluck server. The
//! [`Database`] struct owns the `SQLite` pool and creates the schema; the
//! per-resource managers wrap the same pool and carry the actual queries.

mod favorites;
mod follows;
mod ingredients;
mod recipes;
mod shopping_list;
mod tags;
pub mod transactions;
mod users;

pub use favorites::FavoritesManager;
pub use follows::FollowsManager;
pub use ingredients::IngredientsManager;
pub use recipes::{IngredientAmount, NewRecipe, RecipeFilter, RecipesManager};
pub use shopping_list::ShoppingListManager;
pub use tags::TagsManager;
pub use users::UsersManager;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager owning the connection pool and schema
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema creation fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains("memory")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get the underlying connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Users manager
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Follows manager
    #[must_use]
    pub fn follows(&self) -> FollowsManager {
        FollowsManager::new(self.pool.clone())
    }

    /// Tags manager
    #[must_use]
    pub fn tags(&self) -> TagsManager {
        TagsManager::new(self.pool.clone())
    }

    /// Ingredients manager
    #[must_use]
    pub fn ingredients(&self) -> IngredientsManager {
        IngredientsManager::new(self.pool.clone())
    }

    /// Recipes manager
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone())
    }

    /// Favorites manager
    #[must_use]
    pub fn favorites(&self) -> FavoritesManager {
        FavoritesManager::new(self.pool.clone())
    }

    /// Shopping list manager
    #[must_use]
    pub fn shopping_list(&self) -> ShoppingListManager {
        ShoppingListManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> Result<()> {
        // Create users table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                username TEXT UNIQUE NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create index on email for fast login lookups
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        // Create follows table: user follows author
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS follows (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, author_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create tags table (admin-managed reference data)
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                color TEXT UNIQUE NOT NULL,
                slug TEXT UNIQUE NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create ingredients table (bulk-loaded reference data)
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ingredients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                measurement_unit TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create index on name for prefix search
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name)")
            .execute(&self.pool)
            .await?;

        // Create recipes table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                image TEXT NOT NULL,
                text TEXT NOT NULL,
                cooking_time INTEGER NOT NULL,
                pub_date TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)")
            .execute(&self.pool)
            .await?;

        // Create recipe/tag join table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_tags (
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (recipe_id, tag_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create recipe ingredient quantity rows; at most one row per
        // (recipe, ingredient) pair
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_ingredients (
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                amount INTEGER NOT NULL,
                PRIMARY KEY (recipe_id, ingredient_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create favorites edge table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS favorites (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, recipe_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create shopping cart edge table
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS shopping_list (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, recipe_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
