// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Choosing between member credentials and an anonymous token per command.

use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::credential::{epoch_secs, CredentialStore, Credentials};
use crate::error::{AppError, ErrorKind};

/// What kind of token a command needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Runs without a token (login flow, logout).
    NotNeeded,
    /// Member credentials are mandatory.
    Required,
    /// Member credentials when available, otherwise an anonymous token.
    Optional,
}

/// Outcome of inspecting persisted credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Use this access token as-is.
    Authenticated(String),
    /// Expired, but this refresh token may renew it.
    Refresh(String),
    /// Nothing usable.
    Anonymous,
}

pub fn select(creds: Option<&Credentials>, now: u64) -> Selection {
    match creds {
        Some(c) if c.is_valid_at(now) => Selection::Authenticated(c.access_token.clone()),
        Some(c) if c.can_refresh() => {
            c.refresh_token.clone().map_or(Selection::Anonymous, Selection::Refresh)
        }
        _ => Selection::Anonymous,
    }
}

fn not_authenticated() -> AppError {
    ErrorKind::AuthRequired.error("Not authenticated. Run: appie login")
}

/// Load credentials, treating an unreadable file like a missing one.
fn load_lenient(store: &CredentialStore) -> Option<Credentials> {
    match store.load() {
        Ok(creds) => creds,
        Err(e) => {
            warn!("ignoring unreadable credentials: {e:#}");
            None
        }
    }
}

/// Client carrying member credentials, refreshing them once if expired.
///
/// Fails with [`ErrorKind::AuthRequired`] before any network call when no
/// credentials are stored.
pub async fn require_auth(api: &ApiClient, store: &CredentialStore) -> anyhow::Result<ApiClient> {
    let creds = load_lenient(store);
    match select(creds.as_ref(), epoch_secs()) {
        Selection::Authenticated(token) => Ok(api.with_token(token)),
        Selection::Refresh(refresh_token) => {
            let renewed = match api.refresh_token(&refresh_token).await {
                Ok(c) => c,
                Err(e) => {
                    warn!("token refresh failed: {e:#}");
                    return Err(not_authenticated().into());
                }
            };
            if let Err(e) = store.save(&renewed) {
                warn!("could not persist refreshed credentials: {e:#}");
            } else {
                info!("refreshed credentials");
            }
            Ok(api.with_token(renewed.access_token))
        }
        Selection::Anonymous => Err(not_authenticated().into()),
    }
}

/// Client carrying valid member credentials, or an anonymous token.
///
/// Expired credentials are not refreshed here.
pub async fn optional_auth(api: &ApiClient, store: &CredentialStore) -> anyhow::Result<ApiClient> {
    if let Some(creds) = load_lenient(store).filter(|c| c.is_valid_at(epoch_secs())) {
        return Ok(api.with_token(creds.access_token));
    }
    debug!("no valid credentials, requesting anonymous token");
    let anon = api
        .anonymous_token()
        .await
        .map_err(|e| ErrorKind::AnonymousToken.with_source("Get anonymous token failed", e))?;
    Ok(api.with_token(anon.access_token))
}

pub async fn client_for(
    policy: AuthPolicy,
    api: &ApiClient,
    store: &CredentialStore,
) -> anyhow::Result<ApiClient> {
    match policy {
        AuthPolicy::NotNeeded => Ok(api.clone()),
        AuthPolicy::Required => require_auth(api, store).await,
        AuthPolicy::Optional => optional_auth(api, store).await,
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
