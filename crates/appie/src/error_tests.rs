// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Context;

use super::*;

#[yare::parameterized(
    bind            = { ErrorKind::Bind, "BIND", 500 },
    timeout         = { ErrorKind::Timeout, "TIMEOUT", 500 },
    missing_code    = { ErrorKind::MissingCode, "MISSING_CODE", 400 },
    exchange        = { ErrorKind::Exchange, "EXCHANGE", 500 },
    persistence     = { ErrorKind::Persistence, "PERSISTENCE", 500 },
    auth_required   = { ErrorKind::AuthRequired, "AUTH_REQUIRED", 500 },
    anonymous_token = { ErrorKind::AnonymousToken, "ANONYMOUS_TOKEN", 500 },
)]
fn kind_codes(kind: ErrorKind, name: &str, status: u16) {
    assert_eq!(kind.as_str(), name);
    assert_eq!(kind.to_string(), name);
    assert_eq!(kind.http_status(), status);
}

#[test]
fn with_source_prefixes_message() -> anyhow::Result<()> {
    let err = ErrorKind::Exchange.with_source("Exchange failed", "invalid_grant");
    assert_eq!(err.kind(), ErrorKind::Exchange);
    assert_eq!(err.message(), "Exchange failed: invalid_grant");
    Ok(())
}

#[test]
fn kind_of_finds_app_error_behind_context() -> anyhow::Result<()> {
    let result: anyhow::Result<()> =
        Err(ErrorKind::AuthRequired.error("Not authenticated")).context("running member");
    let err = result.err().ok_or_else(|| anyhow::anyhow!("expected error"))?;
    assert_eq!(kind_of(&err), Some(ErrorKind::AuthRequired));
    Ok(())
}

#[test]
fn kind_of_plain_error_is_none() -> anyhow::Result<()> {
    let err = anyhow::anyhow!("boom");
    assert_eq!(kind_of(&err), None);
    Ok(())
}

#[test]
fn error_json_is_single_line() -> anyhow::Result<()> {
    let err = anyhow::anyhow!("first line\nsecond line");
    let line = error_json(&err);
    assert!(!line.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(&line)?;
    assert_eq!(parsed["error"], "first line second line");
    Ok(())
}

#[test]
fn error_json_joins_context_chain() -> anyhow::Result<()> {
    let err = anyhow::Error::from(ErrorKind::Timeout.error("Login timed out after 5 minutes"))
        .context("login");
    let parsed: serde_json::Value = serde_json::from_str(&error_json(&err))?;
    assert_eq!(parsed["error"], "login: Login timed out after 5 minutes");
    Ok(())
}

#[test]
fn missing_code_answers_bad_request() {
    let (status, body) = ErrorKind::MissingCode.error("Missing code").to_http_response();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing code");
}
