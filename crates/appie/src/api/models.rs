// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request and response bodies for the REST endpoints.

use serde::{Deserialize, Serialize};

use crate::credential::Credentials;

/// Token endpoint response (code exchange, refresh and anonymous grants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
}

impl TokenResponse {
    pub fn into_credentials(self, now: u64) -> Credentials {
        Credentials {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expires_at: now.saturating_add(self.expires_in),
        }
    }
}

/// Body for the authorization-code grant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodeGrant<'a> {
    pub client_id: &'a str,
    pub code: &'a str,
}

/// Body for the refresh-token grant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshGrant<'a> {
    pub client_id: &'a str,
    pub refresh_token: &'a str,
}

/// Body for the anonymous grant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnonymousGrant<'a> {
    pub client_id: &'a str,
}

/// An entry to add to the shopping list: either a product or free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Product { product_id: u64, quantity: u32 },
    Text { description: String, quantity: u32 },
}

/// Wire form of a shopping list entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListItemBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub quantity: u32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub origin_code: &'static str,
}

impl<'a> From<&'a ListItem> for ListItemBody<'a> {
    fn from(item: &'a ListItem) -> Self {
        match item {
            ListItem::Product { product_id, quantity } => Self {
                product_id: Some(*product_id),
                description: None,
                quantity: *quantity,
                kind: "SHOPPABLE",
                origin_code: "PRD",
            },
            ListItem::Text { description, quantity } => Self {
                product_id: None,
                description: Some(description),
                quantity: *quantity,
                kind: "UNSHOPPABLE",
                origin_code: "TXT",
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListItemsBody<'a> {
    pub items: Vec<ListItemBody<'a>>,
}

/// An entry to add to the active order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderItemsBody<'a> {
    pub items: &'a [OrderItem],
}
