//! Application state: database handle, session carts, image store

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use crate::cart::{Cart, CartEntry, Carts};
use crate::images::ImageStore;
use crate::migration::Migrator;
use crate::prelude::*;
use crate::services::OrderService;
use crate::services::orders::CheckoutLine;

#[derive(Debug, Clone)]
pub struct Config {
  /// Idle carts older than this are evicted by the GC task.
  pub cart_lifetime_minutes: i64,
}

impl Default for Config {
  fn default() -> Self {
    Self { cart_lifetime_minutes: 120 }
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub carts: Carts,
  pub images: Arc<dyn ImageStore>,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str, images: Arc<dyn ImageStore>) -> Self {
    Self::with_config(db_url, images, Config::default()).await
  }

  pub async fn with_config(db_url: &str, images: Arc<dyn ImageStore>, config: Config) -> Self {
    info!("Connecting to database...");
    let db = Database::connect(db_url).await.expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, carts: DashMap::new(), images, config }
  }

  /// Run `f` against the session's cart, creating it on first touch.
  pub fn with_cart<T>(&self, session_id: &str, f: impl FnOnce(&mut Cart) -> T) -> T {
    let mut entry = self
      .carts
      .entry(session_id.to_string())
      .or_insert_with(|| CartEntry { cart: Cart::default(), last_touched: Utc::now().naive_utc() });
    entry.last_touched = Utc::now().naive_utc();
    f(&mut entry.cart)
  }

  pub fn cart_count(&self, session_id: &str) -> usize {
    self.carts.get(session_id).map(|entry| entry.cart.count()).unwrap_or(0)
  }

  /// Check out the session's cart. The cart is cleared only after the order
  /// was committed; any failure leaves it intact for the buyer to fix.
  pub async fn checkout_cart(
    &self,
    session_id: &str,
    user_id: i32,
    payment_method_id: Option<i32>,
    proof: Option<Vec<u8>>,
  ) -> Result<crate::entities::prelude::OrderModel> {
    let lines: Vec<CheckoutLine> = self
      .carts
      .get(session_id)
      .map(|entry| {
        entry
          .cart
          .lines
          .iter()
          .map(|line| CheckoutLine { game_id: line.game_id, quantity: line.quantity })
          .collect()
      })
      .unwrap_or_default();

    let order = OrderService::checkout(
      &self.db,
      self.images.as_ref(),
      user_id,
      &lines,
      payment_method_id,
      proof,
    )
    .await?;

    self.with_cart(session_id, |cart| cart.clear());
    Ok(order)
  }

  pub fn gc_carts(&self) {
    let now = Utc::now().naive_utc();
    let lifetime = self.config.cart_lifetime_minutes;

    self
      .carts
      .retain(|_session, entry| (now - entry.last_touched).num_minutes() < lifetime);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::images::mock::MockImageStore;
  use crate::services::catalog::tests::draft;
  use crate::services::{CartService, CatalogService, UserService};

  // Boots through the real migrations rather than the entity-derived schema.
  async fn test_state() -> AppState {
    AppState::new("sqlite::memory:", Arc::new(MockImageStore::default())).await
  }

  #[tokio::test]
  async fn test_checkout_cart_clears_on_success_only() {
    let state = test_state().await;
    let db = &state.db;

    let buyer = UserService::register(db, "b", "b@example.com", None).await.unwrap();
    let game =
      CatalogService::create_game(db, state.images.as_ref(), draft("Game A", 100, 2), None)
        .await
        .unwrap();

    let mut cart = Cart::default();
    CartService::add(db, &mut cart, buyer.id, game.id).await.unwrap();
    state.with_cart("sess", |c| *c = cart);
    assert_eq!(state.cart_count("sess"), 1);

    let order = state.checkout_cart("sess", buyer.id, None, None).await.unwrap();
    assert_eq!(order.user_id, buyer.id);
    assert_eq!(state.cart_count("sess"), 0);

    // Empty cart now: a second checkout fails and the cart stays empty.
    let result = state.checkout_cart("sess", buyer.id, None, None).await;
    assert!(matches!(result, Err(Error::EmptyCart)));
  }

  #[tokio::test]
  async fn test_gc_evicts_idle_carts() {
    let state = test_state().await;

    state.with_cart("sess", |_| ());
    state
      .carts
      .get_mut("sess")
      .unwrap()
      .last_touched = Utc::now().naive_utc() - chrono::Duration::minutes(500);

    state.gc_carts();
    assert!(state.carts.get("sess").is_none());
  }
}
