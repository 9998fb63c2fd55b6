//! Session-scoped cart state
//!
//! A cart lives and dies with its session: no durability, no cross-session
//! sharing. The snapshots it carries (price, stock) are display hints only;
//! checkout re-validates everything against the live catalog.

use chrono::NaiveDateTime;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
  pub game_id: i32,
  pub title: String,
  /// Price at add time. Checkout ignores this and re-prices.
  pub price: Decimal,
  pub quantity: i32,
  /// Stock at last touch, for display.
  pub stock: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
  pub lines: Vec<CartLine>,
}

impl Cart {
  pub fn count(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn line_mut(&mut self, game_id: i32) -> Option<&mut CartLine> {
    self.lines.iter_mut().find(|line| line.game_id == game_id)
  }

  pub fn remove(&mut self, game_id: i32) {
    self.lines.retain(|line| line.game_id != game_id);
  }

  pub fn clear(&mut self) {
    self.lines.clear();
  }
}

#[derive(Debug)]
pub struct CartEntry {
  pub cart: Cart,
  pub last_touched: NaiveDateTime,
}

/// All live carts, keyed by opaque session id.
pub type Carts = DashMap<String, CartEntry>;
