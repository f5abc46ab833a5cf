// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands and their dispatch.

pub mod list;
pub mod login;

use std::io::Write;

use anyhow::Context;
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::api::models::OrderItem;
use crate::api::ApiClient;
use crate::auth::{self, AuthPolicy};
use crate::config::{Cli, Settings};
use crate::credential::CredentialStore;

use self::list::AddToListArgs;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in through a local web page (easiest).
    Login,
    /// Print the remote login URL for a manual login.
    LoginUrl,
    /// Exchange an authorization code or `appie://` redirect URL for tokens.
    ExchangeCode {
        /// Bare code or the full `appie://login-exit?code=…` URL.
        code: String,
    },
    /// Remove stored credentials.
    Logout,
    /// Show the member profile.
    Member,
    /// Search products.
    Search {
        query: String,
        #[arg(default_value_t = 10)]
        limit: u32,
    },
    /// Show product details.
    Product { id: u64 },
    /// Show spotlight bonus products.
    Bonus,
    /// List receipts.
    Receipts,
    /// Show one receipt.
    Receipt { transaction_id: String },
    /// Show the shopping list.
    ShoppingList,
    /// List all shopping lists.
    ShoppingLists,
    /// Add a product or free-text item to the shopping list.
    AddToList(AddToListArgs),
    /// Add items from a JSON array on stdin: `[{"id": 1, "qty": 2}, {"text": "brood"}]`.
    BatchAdd,
    /// Clear the shopping list.
    ClearList,
    /// Show the active order.
    Order,
    /// Add a product to the active order.
    AddToOrder {
        id: u64,
        #[arg(default_value_t = 1)]
        qty: u32,
    },
    /// Show the items of one shopping list.
    ListItems { list_id: String },
    /// Show previously bought products.
    PreviouslyBought {
        #[arg(default_value_t = 100)]
        size: u32,
        #[arg(default_value_t = 0)]
        page: u32,
    },
    /// Show products currently in the bonus.
    BonusProducts {
        #[arg(default_value_t = 50)]
        size: u32,
    },
    /// Search recipes.
    SearchRecipes {
        #[arg(default_value = "")]
        query: String,
        #[arg(default_value_t = 10)]
        size: u32,
    },
    /// Show a recipe with ingredients.
    Recipe { id: u64 },
}

impl Command {
    pub fn auth_policy(&self) -> AuthPolicy {
        match self {
            Self::Login | Self::LoginUrl | Self::ExchangeCode { .. } | Self::Logout => {
                AuthPolicy::NotNeeded
            }
            Self::Search { .. }
            | Self::Product { .. }
            | Self::Bonus
            | Self::SearchRecipes { .. }
            | Self::Recipe { .. } => AuthPolicy::Optional,
            Self::Member
            | Self::Receipts
            | Self::Receipt { .. }
            | Self::ShoppingList
            | Self::ShoppingLists
            | Self::AddToList(_)
            | Self::BatchAdd
            | Self::ClearList
            | Self::Order
            | Self::AddToOrder { .. }
            | Self::ListItems { .. }
            | Self::PreviouslyBought { .. }
            | Self::BonusProducts { .. } => AuthPolicy::Required,
        }
    }
}

/// Acknowledgement printed by commands that change state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<usize>,
}

/// What a command writes to stdout on success.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Pretty-printed JSON document.
    Pretty(Value),
    /// One compact JSON object.
    Ack(Ack),
    /// One plain line.
    Line(String),
}

impl Output {
    pub fn pretty(value: impl Serialize) -> anyhow::Result<Self> {
        Ok(Self::Pretty(serde_json::to_value(value)?))
    }

    pub fn ok() -> Self {
        Self::Ack(Ack { ok: true, message: None, added: None })
    }

    pub fn success(message: &str) -> Self {
        Self::Ack(Ack { ok: true, message: Some(message.to_owned()), added: None })
    }

    pub fn added(n: usize) -> Self {
        Self::Ack(Ack { ok: true, message: None, added: Some(n) })
    }

    pub fn render(&self) -> anyhow::Result<String> {
        Ok(match self {
            Self::Pretty(v) => serde_json::to_string_pretty(v)?,
            Self::Ack(ack) => serde_json::to_string(ack)?,
            Self::Line(s) => s.clone(),
        })
    }

    pub fn print(&self) -> anyhow::Result<()> {
        let rendered = self.render()?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{rendered}")?;
        out.flush()?;
        Ok(())
    }
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<Output> {
    let Cli { settings, command } = cli;
    let store = settings.credential_store();
    let api = settings.api_client()?;
    let policy = command.auth_policy();
    debug!(?policy, config = %store.path().display(), "dispatching command");

    let client = auth::client_for(policy, &api, &store).await?;
    execute(command, &settings, &client, &store).await
}

async fn execute(
    command: Command,
    settings: &Settings,
    client: &ApiClient,
    store: &CredentialStore,
) -> anyhow::Result<Output> {
    match command {
        Command::Login => login::run_login(client, store, settings.login_timeout()).await,
        Command::LoginUrl => Ok(Output::Line(client.login_url())),
        Command::ExchangeCode { code } => login::exchange_code(client, store, &code).await,
        Command::Logout => login::logout(store),
        Command::Member => Output::pretty(client.member().await.context("Get member failed")?),
        Command::Search { query, limit } => Output::pretty(
            client.search_products(&query, limit).await.context("Search failed")?,
        ),
        Command::Product { id } => {
            Output::pretty(client.product(id).await.context("Get product failed")?)
        }
        Command::Bonus => {
            Output::pretty(client.spotlight_bonus().await.context("Get bonus failed")?)
        }
        Command::Receipts => {
            Output::pretty(client.receipts().await.context("Get receipts failed")?)
        }
        Command::Receipt { transaction_id } => Output::pretty(
            client.receipt(&transaction_id).await.context("Get receipt failed")?,
        ),
        Command::ShoppingList => {
            Output::pretty(client.shopping_list().await.context("Get shopping list failed")?)
        }
        Command::ShoppingLists => {
            Output::pretty(client.shopping_lists().await.context("Get shopping lists failed")?)
        }
        Command::AddToList(args) => {
            let item = args.to_item()?;
            client.add_to_shopping_list(&[item]).await.context("Add to list failed")?;
            Ok(Output::ok())
        }
        Command::BatchAdd => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await.context("reading stdin")?;
            list::batch_add(client, &input).await
        }
        Command::ClearList => {
            client.clear_shopping_list().await.context("Clear list failed")?;
            Ok(Output::ok())
        }
        Command::Order => Output::pretty(client.order().await.context("Get order failed")?),
        Command::AddToOrder { id, qty } => {
            let items = [OrderItem { product_id: id, quantity: qty }];
            client.add_to_order(&items).await.context("Add to order failed")?;
            Ok(Output::ok())
        }
        Command::ListItems { list_id } => {
            Output::pretty(client.list_items(&list_id).await.context("Get list items failed")?)
        }
        Command::PreviouslyBought { size, page } => Output::pretty(
            client.previously_bought(size, page).await.context("Get previously bought failed")?,
        ),
        Command::BonusProducts { size } => Output::pretty(
            client.bonus_products(size).await.context("Get bonus products failed")?,
        ),
        Command::SearchRecipes { query, size } => Output::pretty(
            client.search_recipes(&query, size).await.context("Search recipes failed")?,
        ),
        Command::Recipe { id } => {
            let recipe = client.recipe(id).await.context("Get recipe failed")?;
            match recipe {
                Some(recipe) => Output::pretty(recipe),
                None => anyhow::bail!("Get recipe failed: recipe {id} not found"),
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
