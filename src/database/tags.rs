// ABOUTME: Tag database operations for the read-only tag reference data
// ABOUTME: Creation is reserved for the seeder; colors must be valid hex codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

use regex::Regex;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::OnceLock;

use crate::errors::{AppError, AppResult};
use crate::models::Tag;

static HEX_COLOR: OnceLock<Regex> = OnceLock::new();

fn hex_color_regex() -> &'static Regex {
    HEX_COLOR.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").expect("hex color pattern is valid")
    })
}

/// Tag database operations manager
pub struct TagsManager {
    pool: SqlitePool,
}

impl TagsManager {
    /// Create a new tags manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a tag; only the reference-data seeder writes tags
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid hex color or duplicate
    /// name/color/slug, or a database error if the query fails
    pub async fn create(&self, name: &str, color: &str, slug: &str) -> AppResult<Tag> {
        if !hex_color_regex().is_match(color) {
            return Err(AppError::invalid_format(format!(
                "Tag color must be a hex code like #49B64E, got {color}"
            )));
        }

        let result = sqlx::query(
            r"
            INSERT INTO tags (name, color, slug)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(name)
        .bind(color)
        .bind(slug)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                AppError::invalid_input("A tag with this name, color or slug already exists")
            } else {
                AppError::database(format!("Failed to create tag: {e}"))
            }
        })?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: name.to_owned(),
            color: color.to_owned(),
            slug: slug.to_owned(),
        })
    }

    /// Get a tag by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, tag_id: i64) -> AppResult<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get tag: {e}")))?;

        Ok(row.map(|r| Self::row_to_tag(&r)))
    }

    /// List all tags ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, color, slug FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list tags: {e}")))?;

        Ok(rows.iter().map(Self::row_to_tag).collect())
    }

    pub(crate) fn row_to_tag(row: &SqliteRow) -> Tag {
        Tag {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
            slug: row.get("slug"),
        }
    }
}
