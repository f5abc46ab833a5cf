// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use axum::http::StatusCode;

/// Failure classes surfaced by the login flow, client selection and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No loopback port could be bound for the login server.
    Bind,
    /// No authorization code arrived before the login deadline.
    Timeout,
    /// A callback or `exchange-code` input carried no usable code.
    MissingCode,
    /// The API rejected the authorization code.
    Exchange,
    /// Credentials could not be written after a successful exchange.
    Persistence,
    /// An auth-required command ran without valid credentials.
    AuthRequired,
    /// The API refused to hand out an anonymous token.
    AnonymousToken,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bind => "BIND",
            Self::Timeout => "TIMEOUT",
            Self::MissingCode => "MISSING_CODE",
            Self::Exchange => "EXCHANGE",
            Self::Persistence => "PERSISTENCE",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AnonymousToken => "ANONYMOUS_TOKEN",
        }
    }

    /// HTTP status used when this error is answered on the login server.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingCode => 400,
            _ => 500,
        }
    }

    pub fn error(self, message: impl Into<String>) -> AppError {
        AppError { kind: self, message: message.into() }
    }

    /// Build an error whose message is `"{prefix}: {source:#}"`.
    pub fn with_source(self, prefix: &str, source: impl fmt::Display) -> AppError {
        self.error(format!("{prefix}: {source:#}"))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified error carried through `anyhow` up to `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Plain-text HTTP response for errors answered on the login server.
    pub fn to_http_response(&self) -> (StatusCode, String) {
        let status =
            StatusCode::from_u16(self.kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.message.clone())
    }
}

/// Find the [`ErrorKind`] of the first [`AppError`] in an `anyhow` chain.
pub fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain().find_map(|e| e.downcast_ref::<AppError>()).map(AppError::kind)
}

/// Render a fatal error as the single-line JSON object written to stderr.
pub fn error_json(err: &anyhow::Error) -> String {
    let message = format!("{err:#}").replace(['\r', '\n'], " ");
    serde_json::json!({ "error": message }).to_string()
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
