// ABOUTME: Shopping cart edge database operations and the export aggregation
// ABOUTME: Unique (user, recipe) edges plus the grouped ingredient sum query
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::AggregatedIngredient;

/// Shopping cart database operations manager
pub struct ShoppingListManager {
    pool: SqlitePool,
}

impl ShoppingListManager {
    /// Create a new shopping list manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a recipe to a user's shopping cart
    ///
    /// # Errors
    ///
    /// Returns a validation error when the edge already exists, or a
    /// database error if the query fails
    pub async fn create(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        if self.exists(user_id, recipe_id).await? {
            return Err(AppError::invalid_input(
                "Recipe is already in the shopping cart",
            ));
        }

        sqlx::query(
            r"
            INSERT INTO shopping_list (user_id, recipe_id, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create cart entry: {e}")))?;

        Ok(())
    }

    /// Check whether a recipe is in a user's shopping cart
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exists(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            r"
            SELECT 1 AS present FROM shopping_list
            WHERE user_id = $1 AND recipe_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check cart entry: {e}")))?;

        Ok(row.is_some())
    }

    /// Remove a recipe from a user's shopping cart
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the edge is absent
    pub async fn delete(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM shopping_list
            WHERE user_id = $1 AND recipe_id = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(recipe_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete cart entry: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Shopping cart entry"));
        }

        Ok(())
    }

    /// Aggregate every quantity row of the user's cart recipes
    ///
    /// Groups by (ingredient name, measurement unit), sums the amounts and
    /// orders by name. Computed fresh per request; no caching.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn aggregate(&self, user_id: Uuid) -> AppResult<Vec<AggregatedIngredient>> {
        let rows = sqlx::query(
            r"
            SELECT i.name, i.measurement_unit, SUM(ri.amount) AS amount
            FROM shopping_list sl
            JOIN recipe_ingredients ri ON ri.recipe_id = sl.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sl.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate shopping list: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| AggregatedIngredient {
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                amount: row.get("amount"),
            })
            .collect())
    }
}
