// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shopping list input: `add-to-list` arguments and `batch-add` documents.

use anyhow::Context;
use serde::Deserialize;

use super::Output;
use crate::api::models::ListItem;
use crate::api::ApiClient;

/// `add-to-list <id> [qty]` or `add-to-list --text <item> [qty]`.
#[derive(Debug, Clone, clap::Args)]
pub struct AddToListArgs {
    /// Add a free-text item instead of a product.
    #[arg(long)]
    pub text: Option<String>,
    /// Product id, or the quantity when `--text` is given.
    pub first: Option<u64>,
    /// Quantity (default 1).
    pub qty: Option<u32>,
}

impl AddToListArgs {
    pub fn to_item(&self) -> anyhow::Result<ListItem> {
        match &self.text {
            Some(text) => {
                let description = text.trim();
                if description.is_empty() {
                    anyhow::bail!("Missing text");
                }
                if self.qty.is_some() {
                    anyhow::bail!("unexpected argument after quantity");
                }
                let quantity = match self.first {
                    Some(q) => u32::try_from(q).context("quantity out of range")?,
                    None => 1,
                };
                Ok(ListItem::Text { description: description.to_owned(), quantity })
            }
            None => {
                let product_id = self.first.context("Missing product id")?;
                Ok(ListItem::Product { product_id, quantity: self.qty.unwrap_or(1) })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    qty: i64,
}

impl BatchEntry {
    fn into_item(self) -> Option<ListItem> {
        let quantity = u32::try_from(self.qty.max(1)).unwrap_or(u32::MAX);
        if !self.text.is_empty() {
            Some(ListItem::Text { description: self.text, quantity })
        } else if self.id > 0 {
            Some(ListItem::Product { product_id: self.id.unsigned_abs(), quantity })
        } else {
            None
        }
    }
}

/// Parse a `batch-add` document: a JSON array of `{"id", "qty"}` or
/// `{"text", "qty"}` objects. Entries with neither are skipped.
pub fn parse_batch(input: &str) -> anyhow::Result<Vec<ListItem>> {
    let entries: Vec<BatchEntry> = serde_json::from_str(input).context("Invalid JSON input")?;
    let items: Vec<ListItem> = entries.into_iter().filter_map(BatchEntry::into_item).collect();
    if items.is_empty() {
        anyhow::bail!("No valid items in input");
    }
    Ok(items)
}

pub async fn batch_add(client: &ApiClient, input: &str) -> anyhow::Result<Output> {
    let items = parse_batch(input)?;
    client.add_to_shopping_list(&items).await.context("Batch add failed")?;
    Ok(Output::added(items.len()))
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
