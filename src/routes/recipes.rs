// ABOUTME: Route handlers for the recipes REST API
// ABOUTME: CRUD with ownership checks, favorite/cart toggles and the list export
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Recipe routes
//!
//! Reads are anonymous-tolerant; every mutation requires authentication
//! and updates/deletes are permitted only to the recipe's author. The
//! ownership check runs here, before the write pipeline.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    database::{IngredientAmount, NewRecipe, RecipeFilter},
    errors::AppError,
    models::{Recipe, RecipeDetail, RecipeIngredient},
    routes::tags::TagResponse,
    routes::users::UserResponse,
    routes::{optional_user, require_user},
    server::ServerResources,
};

/// Compact recipe representation used by toggles and nested lists
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeSummaryResponse {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Base64-encoded image
    pub image: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
}

impl From<&Recipe> for RecipeSummaryResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.to_string(),
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One ingredient line of the full recipe read shape
#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientLineResponse {
    /// Ingredient identifier
    pub id: i64,
    /// Resolved ingredient name
    pub name: String,
    /// Resolved measurement unit
    pub measurement_unit: String,
    /// Amount in this recipe
    pub amount: i64,
}

impl From<RecipeIngredient> for IngredientLineResponse {
    fn from(line: RecipeIngredient) -> Self {
        Self {
            id: line.id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe read shape with nested author, tags and ingredients
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Unique identifier
    pub id: String,
    /// Nested tag objects
    pub tags: Vec<TagResponse>,
    /// The resolved author, with the viewer's subscription flag
    pub author: UserResponse,
    /// Ingredient lines with resolved name and unit
    pub ingredients: Vec<IngredientLineResponse>,
    /// Display name
    pub name: String,
    /// Base64-encoded image
    pub image: String,
    /// Description text
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
    /// Whether the viewer has favorited this recipe
    pub is_favorited: bool,
    /// Whether this recipe is in the viewer's shopping cart
    pub is_in_shopping_cart: bool,
}

impl From<RecipeDetail> for RecipeResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.recipe.id.to_string(),
            tags: detail.tags.into_iter().map(Into::into).collect(),
            author: UserResponse::from_user(&detail.author, detail.author_is_subscribed),
            ingredients: detail.ingredients.into_iter().map(Into::into).collect(),
            name: detail.recipe.name,
            image: detail.recipe.image,
            text: detail.recipe.text,
            cooking_time: detail.recipe.cooking_time,
            is_favorited: detail.is_favorited,
            is_in_shopping_cart: detail.is_in_shopping_cart,
        }
    }
}

/// One submitted ingredient line
#[derive(Debug, Deserialize)]
pub struct IngredientLineBody {
    /// Ingredient reference id
    pub id: i64,
    /// Amount of the ingredient
    pub amount: i64,
}

/// Write payload for creating or updating a recipe
#[derive(Debug, Deserialize)]
pub struct RecipeWriteBody {
    /// Display name
    pub name: String,
    /// Description text
    pub text: String,
    /// Cooking time in minutes, must be >= 1
    pub cooking_time: u32,
    /// Base64-encoded image; optional on update
    pub image: Option<String>,
    /// Tag ids to associate
    #[serde(default)]
    pub tags: Vec<i64>,
    /// Ordered ingredient lines
    #[serde(default)]
    pub ingredients: Vec<IngredientLineBody>,
}

impl From<RecipeWriteBody> for NewRecipe {
    fn from(body: RecipeWriteBody) -> Self {
        Self {
            name: body.name,
            text: body.text,
            cooking_time: body.cooking_time,
            image: body.image,
            tags: body.tags,
            ingredients: body
                .ingredients
                .into_iter()
                .map(|line| IngredientAmount {
                    id: line.id,
                    amount: line.amount,
                })
                .collect(),
        }
    }
}

/// Query parameters for listing recipes
#[derive(Debug, Deserialize, Default)]
pub struct ListRecipesQuery {
    /// Filter by author id
    pub author: Option<Uuid>,
    /// Filter by tag slugs; a recipe matches when it has at least one
    #[serde(default)]
    pub tags: Vec<String>,
    /// Restrict to the caller's favorites
    pub is_favorited: Option<bool>,
    /// Restrict to the caller's shopping cart
    pub is_in_shopping_cart: Option<bool>,
    /// Maximum results to return
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

/// Recipe route handlers
pub struct RecipesRoutes;

impl RecipesRoutes {
    /// Build the recipes router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/recipes", get(Self::handle_list))
            .route("/api/recipes", post(Self::handle_create))
            .route(
                "/api/recipes/download_shopping_cart",
                get(Self::handle_download_shopping_cart),
            )
            .route("/api/recipes/:id", get(Self::handle_get))
            .route("/api/recipes/:id", patch(Self::handle_update))
            .route("/api/recipes/:id", delete(Self::handle_delete))
            .route("/api/recipes/:id/favorite", post(Self::handle_favorite))
            .route("/api/recipes/:id/favorite", delete(Self::handle_unfavorite))
            .route(
                "/api/recipes/:id/shopping_cart",
                post(Self::handle_add_to_cart),
            )
            .route(
                "/api/recipes/:id/shopping_cart",
                delete(Self::handle_remove_from_cart),
            )
            .with_state(resources)
    }

    /// Fetch a recipe row or fail with 404
    async fn get_recipe_or_404(
        resources: &Arc<ServerResources>,
        recipe_id: Uuid,
    ) -> Result<Recipe, AppError> {
        resources
            .database
            .recipes()
            .get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {recipe_id}")))
    }

    /// Handle GET /api/recipes - filtered listing, anonymous-tolerant
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListRecipesQuery>,
    ) -> Result<Response, AppError> {
        let viewer = optional_user(&headers, &resources)?;

        let filter = RecipeFilter {
            author: query.author,
            tags: query.tags,
            is_favorited: query.is_favorited.unwrap_or(false),
            is_in_shopping_cart: query.is_in_shopping_cart.unwrap_or(false),
            limit: query.limit,
            offset: query.offset,
        };

        let details = resources.database.recipes().list(&filter, viewer).await?;
        let response: Vec<RecipeResponse> = details.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipes - create a recipe owned by the caller
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<RecipeWriteBody>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;

        // Authorship always comes from the caller, never from the payload
        let new: NewRecipe = body.into();
        let recipes = resources.database.recipes();
        let recipe = recipes.create(auth.user_id, &new).await?;

        let detail = recipes
            .get_detail(recipe.id, Some(auth.user_id))
            .await?
            .ok_or_else(|| AppError::internal("Recipe vanished after create"))?;

        Ok((StatusCode::CREATED, Json(RecipeResponse::from(detail))).into_response())
    }

    /// Handle GET /api/recipes/:id - full read shape, anonymous-tolerant
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let viewer = optional_user(&headers, &resources)?;

        let detail = resources
            .database
            .recipes()
            .get_detail(id, viewer)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {id}")))?;

        Ok((StatusCode::OK, Json(RecipeResponse::from(detail))).into_response())
    }

    /// Handle PATCH /api/recipes/:id - author-only full update
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<RecipeWriteBody>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;
        let existing = Self::get_recipe_or_404(&resources, id).await?;

        if existing.author_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the author can modify this recipe",
            ));
        }

        let new: NewRecipe = body.into();
        let recipes = resources.database.recipes();
        recipes.update(&existing, &new).await?;

        let detail = recipes
            .get_detail(id, Some(auth.user_id))
            .await?
            .ok_or_else(|| AppError::internal("Recipe vanished after update"))?;

        Ok((StatusCode::OK, Json(RecipeResponse::from(detail))).into_response())
    }

    /// Handle DELETE /api/recipes/:id - author-only delete
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;
        let existing = Self::get_recipe_or_404(&resources, id).await?;

        if existing.author_id != auth.user_id {
            return Err(AppError::permission_denied(
                "Only the author can delete this recipe",
            ));
        }

        resources.database.recipes().delete(id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/recipes/:id/favorite - favorite a recipe
    async fn handle_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;
        let recipe = Self::get_recipe_or_404(&resources, id).await?;

        resources
            .database
            .favorites()
            .create(auth.user_id, recipe.id)
            .await?;

        let response = RecipeSummaryResponse::from(&recipe);
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle DELETE /api/recipes/:id/favorite - remove a favorite
    async fn handle_unfavorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;
        let recipe = Self::get_recipe_or_404(&resources, id).await?;

        resources
            .database
            .favorites()
            .delete(auth.user_id, recipe.id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/recipes/:id/shopping_cart - add to the cart
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;
        let recipe = Self::get_recipe_or_404(&resources, id).await?;

        resources
            .database
            .shopping_list()
            .create(auth.user_id, recipe.id)
            .await?;

        let response = RecipeSummaryResponse::from(&recipe);
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle DELETE /api/recipes/:id/shopping_cart - remove from the cart
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;
        let recipe = Self::get_recipe_or_404(&resources, id).await?;

        resources
            .database
            .shopping_list()
            .delete(auth.user_id, recipe.id)
            .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/recipes/download_shopping_cart - aggregated export
    ///
    /// Renders one line per ingredient, grouped and summed across every
    /// recipe in the caller's cart, ordered by ingredient name.
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = require_user(&headers, &resources).await?;

        let lines = resources
            .database
            .shopping_list()
            .aggregate(auth.user_id)
            .await?;

        let mut document = String::new();
        for line in &lines {
            document.push_str(&format!(
                "{} ({}) - {}\n",
                line.name, line.measurement_unit, line.amount
            ));
        }

        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"shopping_list.txt\"",
                ),
            ],
            document,
        )
            .into_response())
    }
}
