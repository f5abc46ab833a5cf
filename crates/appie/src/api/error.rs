// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Maximum length for error response bodies in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Failures reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-success HTTP status.
    Status { status: u16, body: String },
    /// The GraphQL error envelope was non-empty.
    GraphQl(Vec<String>),
    /// A GraphQL response carried neither data nor errors.
    MissingData(&'static str),
}

impl ApiError {
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::Status { status, body: truncate_body(body) }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } if body.is_empty() => write!(f, "API error: {status}"),
            Self::Status { status, body } => write!(f, "API error: {status} {body}"),
            Self::GraphQl(messages) => write!(f, "GraphQL errors: {}", messages.join("; ")),
            Self::MissingData(field) => write!(f, "GraphQL response has no data for {field}"),
        }
    }
}

impl std::error::Error for ApiError {}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_owned();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
