// ABOUTME: Follow graph database operations
// ABOUTME: Edge creation with self-follow and duplicate checks, deletion and listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::users::UsersManager;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// Follow graph database operations manager
pub struct FollowsManager {
    pool: SqlitePool,
}

impl FollowsManager {
    /// Create a new follows manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a follow edge from `user_id` to `author_id`
    ///
    /// # Errors
    ///
    /// Returns a validation error on self-follow or when the edge already
    /// exists, or a database error if the query fails
    pub async fn create(&self, user_id: Uuid, author_id: Uuid) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::invalid_input("Users cannot follow themselves"));
        }

        if self.exists(user_id, author_id).await? {
            return Err(AppError::invalid_input("You already follow this author"));
        }

        sqlx::query(
            r"
            INSERT INTO follows (user_id, author_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.to_string())
        .bind(author_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create follow: {e}")))?;

        Ok(())
    }

    /// Check whether `user_id` follows `author_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exists(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            r"
            SELECT 1 AS present FROM follows
            WHERE user_id = $1 AND author_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(author_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check follow: {e}")))?;

        Ok(row.is_some())
    }

    /// Delete the follow edge from `user_id` to `author_id`
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the edge is absent
    pub async fn delete(&self, user_id: Uuid, author_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM follows
            WHERE user_id = $1 AND author_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(author_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete follow: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Follow"));
        }

        Ok(())
    }

    /// List the authors followed by `user_id`, oldest follow first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_authors(&self, user_id: Uuid) -> AppResult<Vec<User>> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   u.password_hash, u.created_at
            FROM follows f
            JOIN users u ON u.id = f.author_id
            WHERE f.user_id = $1
            ORDER BY f.created_at ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list follows: {e}")))?;

        rows.iter().map(UsersManager::row_to_user).collect()
    }
}
