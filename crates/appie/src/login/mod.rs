// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser login capture.
//!
//! The remote login flow redirects to `appie://login-exit?code=…`, which no
//! browser can open. A loopback HTTP server serves a page where the user
//! pastes that URL; the page forwards the code to `/callback`, which hands it
//! to the waiting command exactly once.

pub mod code;
pub mod pages;
pub mod server;

pub use code::extract_code;
pub use server::{LoginServer, ServerState};
