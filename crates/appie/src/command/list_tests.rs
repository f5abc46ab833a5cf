// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use super::*;
use crate::config::Cli;
use crate::command::Command;

/// Test-only accessor for the quantity of a `ListItem`.
trait QuantityOf {
    fn quantity(&self) -> u32;
}

impl QuantityOf for ListItem {
    fn quantity(&self) -> u32 {
        match self {
            ListItem::Product { quantity, .. } | ListItem::Text { quantity, .. } => *quantity,
        }
    }
}

fn add_args(args: &[&str]) -> anyhow::Result<AddToListArgs> {
    let cli = Cli::try_parse_from(["appie", "add-to-list"].iter().chain(args))?;
    match cli.command {
        Command::AddToList(args) => Ok(args),
        other => anyhow::bail!("unexpected command: {other:?}"),
    }
}

#[test]
fn product_with_default_quantity() -> anyhow::Result<()> {
    let item = add_args(&["12"])?.to_item()?;
    assert_eq!(item, ListItem::Product { product_id: 12, quantity: 1 });
    Ok(())
}

#[test]
fn product_with_quantity() -> anyhow::Result<()> {
    let item = add_args(&["12", "3"])?.to_item()?;
    assert_eq!(item, ListItem::Product { product_id: 12, quantity: 3 });
    Ok(())
}

#[test]
fn text_takes_first_positional_as_quantity() -> anyhow::Result<()> {
    let item = add_args(&["--text", "verse basilicum", "2"])?.to_item()?;
    assert_eq!(item, ListItem::Text { description: "verse basilicum".to_owned(), quantity: 2 });
    Ok(())
}

#[test]
fn text_defaults_to_one() -> anyhow::Result<()> {
    let item = add_args(&["--text", "brood"])?.to_item()?;
    assert_eq!(item, ListItem::Text { description: "brood".to_owned(), quantity: 1 });
    Ok(())
}

#[test]
fn blank_text_is_rejected() -> anyhow::Result<()> {
    crate::assert_err_contains!(add_args(&["--text", "  "])?.to_item(), "Missing text");
    Ok(())
}

#[test]
fn missing_product_id_is_rejected() -> anyhow::Result<()> {
    crate::assert_err_contains!(add_args(&[])?.to_item(), "Missing product id");
    Ok(())
}

#[test]
fn non_numeric_product_id_is_a_usage_error() {
    assert!(add_args(&["melk"]).is_err());
}

#[test]
fn batch_mixes_products_and_text() -> anyhow::Result<()> {
    let items = parse_batch(r#"[{"id": 123, "qty": 2}, {"text": "brood", "qty": 1}]"#)?;
    assert_eq!(
        items,
        vec![
            ListItem::Product { product_id: 123, quantity: 2 },
            ListItem::Text { description: "brood".to_owned(), quantity: 1 },
        ]
    );
    Ok(())
}

#[yare::parameterized(
    missing_qty = { r#"[{"id": 5}]"#, 1 },
    zero_qty = { r#"[{"id": 5, "qty": 0}]"#, 1 },
    negative_qty = { r#"[{"id": 5, "qty": -4}]"#, 1 },
    positive_qty = { r#"[{"id": 5, "qty": 7}]"#, 7 },
)]
fn batch_quantity_is_at_least_one(input: &str, expected: u32) {
    let items = parse_batch(input).unwrap_or_default();
    assert_eq!(items.iter().map(ListItem::quantity).collect::<Vec<_>>(), vec![expected]);
}

#[test]
fn batch_text_wins_over_id() -> anyhow::Result<()> {
    let items = parse_batch(r#"[{"id": 9, "text": "kaas"}]"#)?;
    assert_eq!(items, vec![ListItem::Text { description: "kaas".to_owned(), quantity: 1 }]);
    Ok(())
}

#[test]
fn batch_skips_invalid_entries() -> anyhow::Result<()> {
    let items = parse_batch(r#"[{"id": 0}, {"text": ""}, {"qty": 3}, {"id": -1}, {"id": 4}]"#)?;
    assert_eq!(items, vec![ListItem::Product { product_id: 4, quantity: 1 }]);
    Ok(())
}

#[yare::parameterized(
    empty_array = { "[]", "No valid items in input" },
    only_invalid = { r#"[{"id": 0}]"#, "No valid items in input" },
    not_json = { "brood", "Invalid JSON input" },
    not_array = { r#"{"id": 1}"#, "Invalid JSON input" },
)]
fn batch_rejects(input: &str, expected: &str) {
    crate::assert_err_contains!(parse_batch(input), expected);
}
