// ABOUTME: Configuration module for the Potluck server
// ABOUTME: Environment-based configuration with typed log level and environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Potluck

//! Configuration management
//!
//! All runtime configuration comes from environment variables; there is no
//! configuration file. See [`environment::ServerConfig::from_env`].

pub mod environment;
