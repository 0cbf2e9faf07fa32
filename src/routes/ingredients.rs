// ABOUTME: Route handlers for the read-only ingredients REST API
// ABOUTME: Listing with name prefix search and retrieval of reference data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Ingredient routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{errors::AppError, models::Ingredient, server::ServerResources};

/// Response for an ingredient
#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientResponse {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Query parameters for listing ingredients
#[derive(Debug, Deserialize, Default)]
pub struct ListIngredientsQuery {
    /// Case-insensitive name prefix search
    pub name: Option<String>,
}

/// Ingredient route handlers
pub struct IngredientsRoutes;

impl IngredientsRoutes {
    /// Build the ingredients router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/ingredients", get(Self::handle_list))
            .route("/api/ingredients/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/ingredients - list, optionally by name prefix
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListIngredientsQuery>,
    ) -> Result<Response, AppError> {
        let ingredients = resources
            .database
            .ingredients()
            .list(query.name.as_deref())
            .await?;

        let response: Vec<IngredientResponse> =
            ingredients.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/ingredients/:id - retrieve one ingredient
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let ingredient = resources
            .database
            .ingredients()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;

        Ok((StatusCode::OK, Json(IngredientResponse::from(ingredient))).into_response())
    }
}
