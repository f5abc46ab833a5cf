// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::ApiClient;
use crate::command::Command;
use crate::credential::CredentialStore;

/// Command-line client for the Albert Heijn API.
#[derive(Debug, Parser)]
#[command(name = "appie", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

/// Global settings shared by every command.
///
/// Threaded explicitly into [`CredentialStore`] and [`ApiClient`].
#[derive(Debug, Clone, clap::Args)]
pub struct Settings {
    /// Path of the credential file.
    #[arg(
        long = "config",
        global = true,
        env = "APPIE_CONFIG",
        default_value = ".appie.json"
    )]
    pub config_path: PathBuf,

    /// Base URL of the retailer API.
    #[arg(long, global = true, env = "APPIE_API_URL", default_value = "https://api.ah.nl")]
    pub api_url: String,

    /// Base URL of the retailer's login pages.
    #[arg(
        long,
        global = true,
        env = "APPIE_LOGIN_URL",
        default_value = "https://login.ah.nl"
    )]
    pub login_base_url: String,

    /// Seconds to wait for the browser login before giving up.
    #[arg(long, global = true, env = "APPIE_LOGIN_TIMEOUT_SECS", default_value_t = 300)]
    pub login_timeout_secs: u64,

    /// Per-request timeout for API calls, in seconds.
    #[arg(long, global = true, env = "APPIE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log filter (tracing `EnvFilter` syntax). Logs go to stderr.
    #[arg(long, global = true, env = "APPIE_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (text or json).
    #[arg(long, global = true, env = "APPIE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

impl Settings {
    /// Validate settings after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.login_timeout_secs == 0 {
            anyhow::bail!("--login-timeout-secs must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("--request-timeout-secs must be greater than zero");
        }
        match self.log_format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("invalid log format: {other} (expected text or json)"),
        }
        for (flag, url) in [("--api-url", &self.api_url), ("--login-base-url", &self.login_base_url)]
        {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{flag} must be an http(s) URL, got: {url}");
            }
        }
        Ok(())
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(&self.config_path)
    }

    /// Build an unauthenticated API client from these settings.
    pub fn api_client(&self) -> anyhow::Result<ApiClient> {
        ApiClient::new(&self.api_url, &self.login_base_url, self.request_timeout())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
