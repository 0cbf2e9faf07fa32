// ABOUTME: Core data models for users, recipes, reference data and edges
// ABOUTME: Row-level structs plus the assembled read shapes built by the store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! # Data Models
//!
//! Core data structures used throughout the Potluck server. Row-level
//! structs map one-to-one onto store tables; the assembled shapes
//! ([`RecipeDetail`], [`FollowEntry`], [`AggregatedIngredient`]) are built
//! by the database managers for the read side of the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address (unique, used for login)
    pub email: String,
    /// Public username (unique)
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Hashed password for authentication
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated ID
    #[must_use]
    pub fn new(
        email: String,
        username: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            first_name,
            last_name,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// A recipe tag (admin-managed reference data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag identifier
    pub id: i64,
    /// Display name (unique)
    pub name: String,
    /// Hex color code, e.g. `#49B64E` (unique)
    pub color: String,
    /// URL slug (unique)
    pub slug: String,
}

/// An ingredient (bulk-loaded reference data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique ingredient identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Measurement unit, e.g. `g` or `ml`
    pub measurement_unit: String,
}

/// A published recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier
    pub id: Uuid,
    /// Owning author; only the author may mutate the recipe
    pub author_id: Uuid,
    /// Display name
    pub name: String,
    /// Base64-encoded image, stored inline
    pub image: String,
    /// Description text
    pub text: String,
    /// Cooking time in minutes, always >= 1
    pub cooking_time: u32,
    /// Publish timestamp; recipe lists order by this, newest first
    pub pub_date: DateTime<Utc>,
}

/// One ingredient line of a recipe, with the reference record resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient identifier
    pub id: i64,
    /// Resolved ingredient name
    pub name: String,
    /// Resolved measurement unit
    pub measurement_unit: String,
    /// Amount of the ingredient in this recipe
    pub amount: i64,
}

/// Fully assembled recipe read shape with viewer-relative flags
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    /// The recipe row
    pub recipe: Recipe,
    /// The resolved author
    pub author: User,
    /// Whether the viewer follows the author (false for anonymous viewers)
    pub author_is_subscribed: bool,
    /// Nested tag objects
    pub tags: Vec<Tag>,
    /// Ingredient lines with resolved name and unit
    pub ingredients: Vec<RecipeIngredient>,
    /// Whether the viewer has favorited this recipe
    pub is_favorited: bool,
    /// Whether this recipe is in the viewer's shopping cart
    pub is_in_shopping_cart: bool,
}

/// One entry of a user's subscription list
#[derive(Debug, Clone)]
pub struct FollowEntry {
    /// The followed author
    pub author: User,
    /// Whether the viewer follows this entry's author
    pub is_subscribed: bool,
    /// The author's recipes, newest first, optionally capped
    pub recipes: Vec<Recipe>,
    /// Total number of recipes by this author
    pub recipes_count: i64,
}

/// One aggregated line of a shopping list export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedIngredient {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Summed amount across all cart recipes
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_generates_unique_ids() {
        let a = User::new(
            "a@example.com".into(),
            "a".into(),
            "A".into(),
            "One".into(),
            "hash".into(),
        );
        let b = User::new(
            "b@example.com".into(),
            "b".into(),
            "B".into(),
            "Two".into(),
            "hash".into(),
        );
        assert_ne!(a.id, b.id);
    }
}
