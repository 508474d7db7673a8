//! Cart accumulator - the customer's pending selection before checkout.
//!
//! Lines keep insertion order and are keyed by menu item id. Unit prices are parsed
//! into cents when a line is added so every total is computed in integer cents.

use crate::{
    core::money::{cents_to_amount, format_cents, line_total_cents, parse_price_cents},
    entities::{MenuItemModel, order::OrderLine},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The fields of a menu item a cart line needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl From<&MenuItemModel> for CartItem {
    fn from(item: &MenuItemModel) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price.clone(),
            image: item.image.clone(),
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    line: OrderLine,
    unit_cents: i64,
}

/// One `(menu item id, quantity)` pair submitted at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub id: String,
    pub quantity: u32,
}

/// In-memory cart; never persisted.
#[derive(Clone, Debug, Default)]
pub struct Cart {
    entries: Vec<Entry>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item`, creating the line at quantity 1 if needed.
    ///
    /// # Errors
    /// Returns `Error::InvalidPrice` when the item's price cannot be parsed.
    pub fn add(&mut self, item: CartItem) -> Result<()> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.line.id == item.id) {
            entry.line.quantity = entry.line.quantity.saturating_add(1);
            return Ok(());
        }

        let unit_cents = parse_price_cents(&item.price)?;
        self.entries.push(Entry {
            line: OrderLine {
                id: item.id,
                name: item.name,
                price: item.price,
                quantity: 1,
                image: item.image,
            },
            unit_cents,
        });
        Ok(())
    }

    /// Applies a signed quantity change; the line disappears once it reaches zero.
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &str, delta: i64) {
        let Some(index) = self.entries.iter().position(|e| e.line.id == id) else {
            return;
        };
        let updated = i64::from(self.entries[index].line.quantity).saturating_add(delta);
        if updated <= 0 {
            self.entries.remove(index);
        } else {
            self.entries[index].line.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
        }
    }

    #[must_use]
    pub fn total_cents(&self) -> i64 {
        self.entries
            .iter()
            .map(|e| line_total_cents(e.unit_cents, e.line.quantity))
            .sum()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        cents_to_amount(self.total_cents())
    }

    /// Total as a two-decimal string such as `"12.50"`.
    #[must_use]
    pub fn formatted_total(&self) -> String {
        format_cents(self.total_cents())
    }

    /// Sum of quantities, shown as the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|e| e.line.quantity).sum()
    }

    #[must_use]
    pub fn quantity_of(&self, id: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.line.id == id)
            .map(|e| e.line.quantity)
    }

    pub fn lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.entries.iter().map(|e| &e.line)
    }

    /// Consumes the cart into the snapshot stored on an order.
    #[must_use]
    pub fn into_lines(self) -> Vec<OrderLine> {
        self.entries.into_iter().map(|e| e.line).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rebuilds a cart from checkout selections against the current menu.
    ///
    /// Prices and names always come from `menu`. Unknown or unavailable items and
    /// zero quantities are rejected; repeated ids are merged.
    pub fn from_selections(menu: &[MenuItemModel], selections: &[Selection]) -> Result<Self> {
        let by_id: HashMap<&str, &MenuItemModel> =
            menu.iter().map(|item| (item.id.as_str(), item)).collect();

        let mut cart = Self::new();
        for selection in selections {
            if selection.quantity == 0 {
                return Err(Error::validation(format!(
                    "Quantity for item {} must be at least 1",
                    selection.id
                )));
            }
            let item = by_id
                .get(selection.id.as_str())
                .ok_or_else(|| Error::MenuItemNotFound {
                    id: selection.id.clone(),
                })?;
            if !item.available {
                return Err(Error::validation(format!(
                    "{} is not available right now",
                    item.name
                )));
            }

            cart.add(CartItem::from(*item))?;
            cart.update_quantity(&item.id, i64::from(selection.quantity) - 1);
        }
        Ok(cart)
    }
}
