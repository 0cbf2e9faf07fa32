// ABOUTME: Favorite edge database operations
// ABOUTME: Unique (user, recipe) edges created and deleted by the owning user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Favorite edge database operations manager
pub struct FavoritesManager {
    pool: SqlitePool,
}

impl FavoritesManager {
    /// Create a new favorites manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Favorite a recipe for a user
    ///
    /// # Errors
    ///
    /// Returns a validation error when the edge already exists, or a
    /// database error if the query fails
    pub async fn create(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        if self.exists(user_id, recipe_id).await? {
            return Err(AppError::invalid_input("Recipe is already favorited"));
        }

        sqlx::query(
            r"
            INSERT INTO favorites (user_id, recipe_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create favorite: {e}")))?;

        Ok(())
    }

    /// Check whether a user has favorited a recipe
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exists(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            r"
            SELECT 1 AS present FROM favorites
            WHERE user_id = $1 AND recipe_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check favorite: {e}")))?;

        Ok(row.is_some())
    }

    /// Remove a favorite edge
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the edge is absent
    pub async fn delete(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM favorites
            WHERE user_id = $1 AND recipe_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete favorite: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Favorite"));
        }

        Ok(())
    }
}
