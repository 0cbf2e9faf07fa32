// ABOUTME: Ingredient database operations for the bulk-loaded reference data
// ABOUTME: Lookup, listing and case-insensitive name prefix search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::errors::{AppError, AppResult};
use crate::models::Ingredient;

/// Ingredient database operations manager
pub struct IngredientsManager {
    pool: SqlitePool,
}

impl IngredientsManager {
    /// Create a new ingredients manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an ingredient; only the reference-data seeder writes ingredients
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create(&self, name: &str, measurement_unit: &str) -> AppResult<Ingredient> {
        let result = sqlx::query(
            r"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ",
        )
        .bind(name)
        .bind(measurement_unit)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredient: {e}")))?;

        Ok(Ingredient {
            id: result.last_insert_rowid(),
            name: name.to_owned(),
            measurement_unit: measurement_unit.to_owned(),
        })
    }

    /// Get an ingredient by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, ingredient_id: i64) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(ingredient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        Ok(row.map(|r| Self::row_to_ingredient(&r)))
    }

    /// List ingredients ordered by name, optionally restricted to a
    /// case-insensitive name prefix
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self, name_prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let rows = match name_prefix {
            Some(prefix) => {
                let pattern = format!("{}%", escape_like(prefix));
                sqlx::query(
                    r"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE name LIKE $1 ESCAPE '\'
                    ORDER BY name ASC
                    ",
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    ORDER BY name ASC
                    ",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list ingredients: {e}")))?;

        Ok(rows.iter().map(Self::row_to_ingredient).collect())
    }

    fn row_to_ingredient(row: &SqliteRow) -> Ingredient {
        Ingredient {
            id: row.get("id"),
            name: row.get("name"),
            measurement_unit: row.get("measurement_unit"),
        }
    }
}

/// Escape `LIKE` wildcards so user input only matches literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("flour"), "flour");
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like("a_b"), r"a\_b");
    }
}
