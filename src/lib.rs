// ABOUTME: Main library entry point for the Potluck recipe sharing backend
// ABOUTME: Exposes the REST API surface, data store and supporting infrastructure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

#![deny(unsafe_code)]

//! # Potluck Server
//!
//! A recipe sharing backend. Users publish recipes with tagged ingredients
//! and quantities, follow other authors, favorite recipes, and maintain a
//! shopping cart that can be exported as an aggregated ingredient list.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: Row-level data structures for users, recipes and edges
//! - **Database**: `SQLite`-backed store with per-resource managers
//! - **Routes**: Axum route handlers organized by resource
//! - **Auth**: JWT-based authentication and password management
//! - **Config**: Environment-based configuration management
//!
//! ## Quick Start
//!
//! 1. Export `JWT_SECRET` and optionally `DATABASE_URL` / `HTTP_PORT`
//! 2. Load reference data with the `seed-reference-data` binary
//! 3. Start the API with `potluck-server`

/// JWT authentication and password hashing
pub mod auth;
/// Environment-based configuration management
pub mod config;
/// SQLite data store and per-resource managers
pub mod database;
/// Unified error handling with `AppError` and `ErrorCode`
pub mod errors;
/// Structured logging initialization
pub mod logging;
/// Core data models
pub mod models;
/// HTTP route handlers organized by resource
pub mod routes;
/// Server assembly: shared resources and router construction
pub mod server;
