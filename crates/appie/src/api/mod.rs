// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the Albert Heijn mobile API.
//!
//! REST endpoints are passed through as raw JSON; GraphQL queries are decoded
//! into typed schemas at this boundary (see [`graphql`]).

pub mod client;
pub mod error;
pub mod graphql;
pub mod models;

pub use client::ApiClient;
pub use error::ApiError;
