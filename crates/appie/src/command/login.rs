// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `appie login`, `exchange-code` and `logout`.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use super::Output;
use crate::api::ApiClient;
use crate::credential::{CredentialStore, Credentials};
use crate::error::ErrorKind;
use crate::login::{extract_code, LoginServer};

/// First stdout line of `appie login`, printed once the server listens.
#[derive(Debug, Serialize)]
struct Waiting<'a> {
    login_url: &'a str,
    status: &'static str,
}

/// Serve the capture page, wait for the code, then exchange and persist it.
pub async fn run_login(
    api: &ApiClient,
    store: &CredentialStore,
    timeout: Duration,
) -> anyhow::Result<Output> {
    let mut server = LoginServer::start(api.login_url()).await?;
    let local = server.local_url();

    eprintln!("Login server running on {local}");
    eprintln!("Open this URL in a browser: {local}");
    eprintln!("Waiting for login...");
    {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string(&Waiting { login_url: &local, status: "waiting" })?)?;
        out.flush()?;
    }

    complete_login(&mut server, api, store, timeout).await?;
    Ok(Output::success("Login successful"))
}

/// Wait on a running capture session and turn its code into stored
/// credentials. The server is always shut down before the exchange.
pub async fn complete_login(
    server: &mut LoginServer,
    api: &ApiClient,
    store: &CredentialStore,
    timeout: Duration,
) -> anyhow::Result<Credentials> {
    let code = server.wait_for_code(timeout).await?;
    exchange_and_save(api, store, &code).await
}

/// `exchange-code`: accepts a bare code or a pasted redirect URL.
pub async fn exchange_code(
    api: &ApiClient,
    store: &CredentialStore,
    input: &str,
) -> anyhow::Result<Output> {
    let code = extract_code(input);
    if code.is_empty() {
        return Err(ErrorKind::MissingCode.error("Missing code").into());
    }
    exchange_and_save(api, store, &code).await?;
    Ok(Output::success("Login successful"))
}

pub fn logout(store: &CredentialStore) -> anyhow::Result<Output> {
    if store.clear()? {
        info!(path = %store.path().display(), "removed credentials");
    }
    Ok(Output::success("Logged out"))
}

async fn exchange_and_save(
    api: &ApiClient,
    store: &CredentialStore,
    code: &str,
) -> anyhow::Result<Credentials> {
    let creds = api
        .exchange_code(code)
        .await
        .map_err(|e| ErrorKind::Exchange.with_source("Exchange failed", e))?;
    store.save(&creds).map_err(|e| ErrorKind::Persistence.with_source("Save config failed", e))?;
    info!(path = %store.path().display(), "credentials saved");
    Ok(creds)
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
