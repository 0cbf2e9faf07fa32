// ABOUTME: Recipe database operations: the transactional write pipeline and reads
// ABOUTME: Bulk quantity-row replacement, filter composition and viewer-relative flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::tags::TagsManager;
use super::transactions::TransactionGuard;
use super::users::UsersManager;
use crate::errors::{AppError, AppResult};
use crate::models::{Recipe, RecipeDetail, RecipeIngredient, Tag, User};

/// One submitted ingredient line: reference id plus amount
#[derive(Debug, Clone)]
pub struct IngredientAmount {
    /// Ingredient reference id
    pub id: i64,
    /// Amount of the ingredient
    pub amount: i64,
}

/// Write payload for creating or updating a recipe
///
/// The author is never part of the payload; it is supplied by the caller
/// context. On update a missing image means "keep the stored one".
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: u32,
    pub image: Option<String>,
    pub tags: Vec<i64>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Filter for recipe listing
///
/// `tags` is set-membership: a recipe matches when it carries at least one
/// of the given slugs. The boolean flags are no-ops without a viewer.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author: Option<Uuid>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Recipe database operations manager
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a new recipes manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Write pipeline
    // ========================================================================

    /// Create a recipe owned by `author_id`
    ///
    /// The header insert, the bulk quantity-row insert and the tag
    /// associations commit or roll back as one unit.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad cooking time, missing or
    /// undecodable image, or duplicate ingredient; a not-found error for an
    /// unknown ingredient or tag id; a database error if a query fails
    pub async fn create(&self, author_id: Uuid, new: &NewRecipe) -> AppResult<Recipe> {
        Self::validate_cooking_time(new.cooking_time)?;
        let image = new
            .image
            .clone()
            .ok_or_else(|| AppError::missing_field("image"))?;
        validate_image(&image)?;
        self.ensure_ingredients_exist(&new.ingredients).await?;
        self.ensure_tags_exist(&new.tags).await?;

        let recipe = Recipe {
            id: Uuid::new_v4(),
            author_id,
            name: new.name.clone(),
            image,
            text: new.text.clone(),
            cooking_time: new.cooking_time,
            pub_date: Utc::now(),
        };

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        sqlx::query(
            r"
            INSERT INTO recipes (id, author_id, name, image, text, cooking_time, pub_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(recipe.id.to_string())
        .bind(recipe.author_id.to_string())
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(i64::from(recipe.cooking_time))
        .bind(recipe.pub_date.to_rfc3339())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert recipe: {e}")))?;

        Self::bulk_insert_ingredients(guard.executor()?, recipe.id, &new.ingredients).await?;
        Self::insert_tags(guard.executor()?, recipe.id, &new.tags).await?;

        guard.commit().await?;

        tracing::info!(recipe.id = %recipe.id, user.id = %author_id, "recipe created");
        Ok(recipe)
    }

    /// Update an existing recipe
    ///
    /// Replaces the entire quantity-row set (delete then bulk insert, not a
    /// diff) and overwrites all scalar fields; the image is only updated
    /// when a new one is supplied. The caller performs the ownership check
    /// before invoking this pipeline.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create`]; any failure leaves the
    /// previously stored recipe untouched
    pub async fn update(&self, existing: &Recipe, new: &NewRecipe) -> AppResult<Recipe> {
        Self::validate_cooking_time(new.cooking_time)?;
        let image = match &new.image {
            Some(image) => {
                validate_image(image)?;
                image.clone()
            }
            None => existing.image.clone(),
        };
        self.ensure_ingredients_exist(&new.ingredients).await?;
        self.ensure_tags_exist(&new.tags).await?;

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);

        sqlx::query(
            r"
            UPDATE recipes
            SET name = $1, image = $2, text = $3, cooking_time = $4
            WHERE id = $5
            ",
        )
        .bind(&new.name)
        .bind(&image)
        .bind(&new.text)
        .bind(i64::from(new.cooking_time))
        .bind(existing.id.to_string())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(existing.id.to_string())
            .execute(guard.executor()?)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipe ingredients: {e}")))?;
        Self::bulk_insert_ingredients(guard.executor()?, existing.id, &new.ingredients).await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(existing.id.to_string())
            .execute(guard.executor()?)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear recipe tags: {e}")))?;
        Self::insert_tags(guard.executor()?, existing.id, &new.tags).await?;

        guard.commit().await?;

        tracing::info!(recipe.id = %existing.id, "recipe updated");
        Ok(Recipe {
            id: existing.id,
            author_id: existing.author_id,
            name: new.name.clone(),
            image,
            text: new.text.clone(),
            cooking_time: new.cooking_time,
            pub_date: existing.pub_date,
        })
    }

    /// Delete a recipe; cascades remove quantity rows, tag links and edges
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the recipe does not exist
    pub async fn delete(&self, recipe_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Recipe {recipe_id}")));
        }

        tracing::info!(recipe.id = %recipe_id, "recipe deleted");
        Ok(())
    }

    fn validate_cooking_time(cooking_time: u32) -> AppResult<()> {
        if cooking_time < 1 {
            return Err(AppError::value_out_of_range(
                "cooking_time must be at least 1",
            ));
        }
        Ok(())
    }

    /// Verify every submitted ingredient id resolves to a reference record
    async fn ensure_ingredients_exist(&self, lines: &[IngredientAmount]) -> AppResult<()> {
        let ids: Vec<i64> = lines.iter().map(|line| line.id).collect();
        let known = self.fetch_known_ids("ingredients", &ids).await?;
        for id in &ids {
            if !known.contains(id) {
                return Err(AppError::not_found(format!("Ingredient {id}")));
            }
        }
        Ok(())
    }

    /// Verify every submitted tag id resolves to a reference record
    async fn ensure_tags_exist(&self, ids: &[i64]) -> AppResult<()> {
        let known = self.fetch_known_ids("tags", ids).await?;
        for id in ids {
            if !known.contains(id) {
                return Err(AppError::not_found(format!("Tag {id}")));
            }
        }
        Ok(())
    }

    async fn fetch_known_ids(&self, table: &str, ids: &[i64]) -> AppResult<HashSet<i64>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT id FROM {table} WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to resolve {table} ids: {e}")))?;

        Ok(rows.iter().map(|row| row.get::<i64, _>("id")).collect())
    }

    /// Insert all quantity rows for a recipe in one statement
    ///
    /// A single linear pass builds the seen-set; a repeated ingredient id
    /// fails the write before anything is inserted, and the surrounding
    /// transaction rolls the whole write back.
    async fn bulk_insert_ingredients(
        conn: &mut SqliteConnection,
        recipe_id: Uuid,
        lines: &[IngredientAmount],
    ) -> AppResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        for line in lines {
            if !seen.insert(line.id) {
                return Err(AppError::invalid_input(format!(
                    "Duplicate ingredient {} in recipe: no duplicates allowed",
                    line.id
                )));
            }
        }

        let mut sql = String::from(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ",
        );
        sql.push_str(&vec!["(?, ?, ?)"; lines.len()].join(", "));

        let mut query = sqlx::query(&sql);
        for line in lines {
            query = query
                .bind(recipe_id.to_string())
                .bind(line.id)
                .bind(line.amount);
        }

        query
            .execute(conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert recipe ingredients: {e}")))?;

        Ok(())
    }

    /// Associate a recipe with its tag set
    async fn insert_tags(
        conn: &mut SqliteConnection,
        recipe_id: Uuid,
        tag_ids: &[i64],
    ) -> AppResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        let mut sql = String::from("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ");
        sql.push_str(&vec!["(?, ?)"; tag_ids.len()].join(", "));

        let mut query = sqlx::query(&sql);
        for tag_id in tag_ids {
            query = query.bind(recipe_id.to_string()).bind(tag_id);
        }

        query
            .execute(conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert recipe tags: {e}")))?;

        Ok(())
    }

    // ========================================================================
    // Read side
    // ========================================================================

    /// Get a recipe row by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, recipe_id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(
            r"
            SELECT id, author_id, name, image, text, cooking_time, pub_date
            FROM recipes
            WHERE id = $1
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.map(|r| Self::row_to_recipe(&r)).transpose()
    }

    /// Get a fully assembled recipe with viewer-relative flags
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn get_detail(
        &self,
        recipe_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<Option<RecipeDetail>> {
        let Some(recipe) = self.get(recipe_id).await? else {
            return Ok(None);
        };
        Ok(Some(self.assemble_detail(recipe, viewer).await?))
    }

    /// List recipes matching `filter`, newest first, with viewer-relative flags
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
    ) -> AppResult<Vec<RecipeDetail>> {
        let mut sql = String::from(
            "SELECT id, author_id, name, image, text, cooking_time, pub_date FROM recipes",
        );
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(author) = filter.author {
            clauses.push("author_id = ?".into());
            binds.push(author.to_string());
        }

        if !filter.tags.is_empty() {
            let placeholders = vec!["?"; filter.tags.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = recipes.id AND t.slug IN ({placeholders}))"
            ));
            binds.extend(filter.tags.iter().cloned());
        }

        // Viewer-relative filters are no-ops for anonymous callers
        if let Some(viewer_id) = viewer {
            if filter.is_favorited {
                clauses.push(
                    "EXISTS (SELECT 1 FROM favorites \
                     WHERE favorites.recipe_id = recipes.id AND favorites.user_id = ?)"
                        .into(),
                );
                binds.push(viewer_id.to_string());
            }
            if filter.is_in_shopping_cart {
                clauses.push(
                    "EXISTS (SELECT 1 FROM shopping_list \
                     WHERE shopping_list.recipe_id = recipes.id AND shopping_list.user_id = ?)"
                        .into(),
                );
                binds.push(viewer_id.to_string());
            }
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY pub_date DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
            if let Some(offset) = filter.offset {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let mut details = Vec::with_capacity(rows.len());
        for row in &rows {
            let recipe = Self::row_to_recipe(row)?;
            details.push(self.assemble_detail(recipe, viewer).await?);
        }
        Ok(details)
    }

    /// List an author's recipes, newest first, optionally capped
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: Option<u32>,
    ) -> AppResult<Vec<Recipe>> {
        let mut sql = String::from(
            "SELECT id, author_id, name, image, text, cooking_time, pub_date \
             FROM recipes WHERE author_id = $1 ORDER BY pub_date DESC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = sqlx::query(&sql)
            .bind(author_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list author recipes: {e}")))?;

        rows.iter().map(Self::row_to_recipe).collect()
    }

    /// Count an author's recipes
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_by_author(&self, author_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM recipes WHERE author_id = $1")
            .bind(author_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count author recipes: {e}")))?;

        Ok(row.get("count"))
    }

    async fn assemble_detail(
        &self,
        recipe: Recipe,
        viewer: Option<Uuid>,
    ) -> AppResult<RecipeDetail> {
        let author = self.fetch_author(recipe.author_id).await?;
        let tags = self.fetch_tags(recipe.id).await?;
        let ingredients = self.fetch_ingredients(recipe.id).await?;
        let (is_favorited, is_in_shopping_cart) = self.viewer_flags(recipe.id, viewer).await?;
        let author_is_subscribed = self.viewer_follows(recipe.author_id, viewer).await?;

        Ok(RecipeDetail {
            recipe,
            author,
            author_is_subscribed,
            tags,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
        })
    }

    async fn fetch_author(&self, author_id: Uuid) -> AppResult<User> {
        let row = sqlx::query(
            r"
            SELECT id, email, username, first_name, last_name, password_hash, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(author_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe author: {e}")))?;

        // A cascade removes recipes with their author, so this is a store fault
        row.map_or_else(
            || Err(AppError::database(format!("Recipe author {author_id} missing"))),
            |r| UsersManager::row_to_user(&r),
        )
    }

    async fn fetch_tags(&self, recipe_id: Uuid) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query(
            r"
            SELECT t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = $1
            ORDER BY t.name ASC
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe tags: {e}")))?;

        Ok(rows.iter().map(TagsManager::row_to_tag).collect())
    }

    async fn fetch_ingredients(&self, recipe_id: Uuid) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query(
            r"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.rowid ASC
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe ingredients: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| RecipeIngredient {
                id: row.get("id"),
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                amount: row.get("amount"),
            })
            .collect())
    }

    async fn viewer_flags(
        &self,
        recipe_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<(bool, bool)> {
        let Some(viewer_id) = viewer else {
            return Ok((false, false));
        };

        let row = sqlx::query(
            r"
            SELECT
                EXISTS (SELECT 1 FROM favorites
                        WHERE user_id = $1 AND recipe_id = $2) AS is_favorited,
                EXISTS (SELECT 1 FROM shopping_list
                        WHERE user_id = $1 AND recipe_id = $2) AS is_in_shopping_cart
            ",
        )
        .bind(viewer_id.to_string())
        .bind(recipe_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get viewer flags: {e}")))?;

        Ok((row.get("is_favorited"), row.get("is_in_shopping_cart")))
    }

    async fn viewer_follows(&self, author_id: Uuid, viewer: Option<Uuid>) -> AppResult<bool> {
        let Some(viewer_id) = viewer else {
            return Ok(false);
        };

        let row = sqlx::query(
            r"
            SELECT EXISTS (SELECT 1 FROM follows
                           WHERE user_id = $1 AND author_id = $2) AS is_subscribed
            ",
        )
        .bind(viewer_id.to_string())
        .bind(author_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get follow flag: {e}")))?;

        Ok(row.get("is_subscribed"))
    }

    fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
        let id_str: String = row.get("id");
        let author_id_str: String = row.get("author_id");
        let cooking_time: i64 = row.get("cooking_time");
        let pub_date_str: String = row.get("pub_date");

        Ok(Recipe {
            id: Uuid::parse_str(&id_str)
                .map_err(|e| AppError::database(format!("Invalid UUID: {e}")))?,
            author_id: Uuid::parse_str(&author_id_str)
                .map_err(|e| AppError::database(format!("Invalid UUID: {e}")))?,
            name: row.get("name"),
            image: row.get("image"),
            text: row.get("text"),
            cooking_time: u32::try_from(cooking_time)
                .map_err(|e| AppError::database(format!("Invalid cooking time: {e}")))?,
            pub_date: DateTime::parse_from_rfc3339(&pub_date_str)
                .map_err(|e| AppError::database(format!("Invalid date: {e}")))?
                .with_timezone(&Utc),
        })
    }
}

/// Check that a submitted image is decodable base64
///
/// Accepts both a bare base64 payload and a `data:<mime>;base64,` URL.
fn validate_image(image: &str) -> AppResult<()> {
    let payload = image
        .find("base64,")
        .map_or(image, |idx| &image[idx + "base64,".len()..]);

    BASE64
        .decode(payload.trim())
        .map_err(|e| AppError::invalid_format(format!("Image must be valid base64 data: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_accepts_data_url() {
        assert!(validate_image("data:image/png;base64,aGVsbG8=").is_ok());
        assert!(validate_image("aGVsbG8=").is_ok());
        assert!(validate_image("not base64!!").is_err());
    }
}
