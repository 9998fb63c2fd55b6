//! Cart service - mutates a session's cart against live catalog state
//!
//! The cart itself is a session-scoped value (see `crate::cart`); these
//! operations take it by `&mut` and consult the database only for the
//! checks. Nothing here reserves stock: the snapshots are advisory and the
//! order engine re-validates everything at checkout.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::cart::{Cart, CartLine};
use crate::entities::prelude::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
  Increase,
  Decrease,
  Remove,
}

pub struct CartService;

impl CartService {
  async fn owns(db: &DatabaseConnection, user_id: i32, game_id: i32) -> Result<bool> {
    let row = Library::find()
      .filter(crate::entities::library::Column::UserId.eq(user_id))
      .filter(crate::entities::library::Column::GameId.eq(game_id))
      .one(db)
      .await?;
    Ok(row.is_some())
  }

  /// Add one unit of a game, or bump an existing line by one. Rejects games
  /// the user already owns and quantities past the current stock snapshot.
  pub async fn add(
    db: &DatabaseConnection,
    cart: &mut Cart,
    user_id: i32,
    game_id: i32,
  ) -> Result<()> {
    let game = Game::find_by_id(game_id)
      .one(db)
      .await?
      .ok_or(Error::GameNotFound)?;

    if Self::owns(db, user_id, game_id).await? {
      return Err(Error::AlreadyOwned);
    }
    if game.stock <= 0 {
      return Err(Error::InsufficientStock { available: 0 });
    }

    if let Some(line) = cart.line_mut(game_id) {
      if line.quantity + 1 > game.stock {
        return Err(Error::InsufficientStock { available: game.stock });
      }
      line.quantity += 1;
      line.stock = game.stock;
      return Ok(());
    }

    cart.lines.push(CartLine {
      game_id,
      title: game.title,
      price: game.price,
      quantity: 1,
      stock: game.stock,
    });
    Ok(())
  }

  pub async fn update(
    db: &DatabaseConnection,
    cart: &mut Cart,
    game_id: i32,
    action: CartAction,
  ) -> Result<()> {
    let game = Game::find_by_id(game_id)
      .one(db)
      .await?
      .ok_or(Error::GameNotFound)?;

    let Some(line) = cart.line_mut(game_id) else {
      return Ok(());
    };

    match action {
      CartAction::Increase => {
        if line.quantity + 1 > game.stock {
          return Err(Error::InsufficientStock { available: game.stock });
        }
        line.quantity += 1;
        line.stock = game.stock;
      }
      CartAction::Decrease => {
        // No-op below quantity 1; use Remove to drop the line.
        if line.quantity > 1 {
          line.quantity -= 1;
        }
      }
      CartAction::Remove => cart.remove(game_id),
    }
    Ok(())
  }

  /// Re-price the cart from the live catalog. Lines whose game has vanished
  /// contribute nothing.
  pub async fn total(db: &DatabaseConnection, cart: &Cart) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for line in &cart.lines {
      if let Some(game) = Game::find_by_id(line.game_id).one(db).await? {
        total += game.price * Decimal::from(line.quantity);
      }
    }
    Ok(total)
  }

  /// Refresh stock hints and drop lines whose game no longer exists, the
  /// way the cart page re-syncs before display.
  pub async fn refresh(db: &DatabaseConnection, cart: &mut Cart) -> Result<()> {
    let mut kept = Vec::with_capacity(cart.lines.len());
    for mut line in cart.lines.drain(..) {
      if let Some(game) = Game::find_by_id(line.game_id).one(db).await? {
        line.stock = game.stock;
        line.price = game.price;
        kept.push(line);
      }
    }
    cart.lines = kept;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::images::mock::MockImageStore;
  use crate::services::catalog::tests::draft;
  use crate::services::{CatalogService, UserService};

  async fn buyer(db: &DatabaseConnection) -> i32 {
    UserService::register(db, "buyer", "buyer@example.com", None)
      .await
      .unwrap()
      .id
  }

  #[tokio::test]
  async fn test_add_and_bump() {
    let db = crate::services::test_db().await;
    let images = MockImageStore::default();
    let user = buyer(&db).await;
    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 2), None)
      .await
      .unwrap();

    let mut cart = Cart::default();
    CartService::add(&db, &mut cart, user, game.id).await.unwrap();
    CartService::add(&db, &mut cart, user, game.id).await.unwrap();
    assert_eq!(cart.count(), 1);
    assert_eq!(cart.lines[0].quantity, 2);

    // A third unit exceeds stock.
    let result = CartService::add(&db, &mut cart, user, game.id).await;
    assert!(matches!(result, Err(Error::InsufficientStock { available: 2 })));
  }

  #[tokio::test]
  async fn test_add_rejects_owned_game() {
    let db = crate::services::test_db().await;
    let images = MockImageStore::default();
    let user = buyer(&db).await;
    let admin = UserService::register(&db, "admin", "admin@example.com", None)
      .await
      .unwrap();
    UserService::set_admin(&db, admin.id, true).await.unwrap();
    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    let order = crate::services::OrderService::buy_now(&db, &images, user, game.id, None, None)
      .await
      .unwrap();
    crate::services::OrderService::approve(&db, admin.id, &order.id)
      .await
      .unwrap();

    let mut cart = Cart::default();
    let result = CartService::add(&db, &mut cart, user, game.id).await;
    assert!(matches!(result, Err(Error::AlreadyOwned)));
    assert!(cart.is_empty());
  }

  #[tokio::test]
  async fn test_add_rejects_out_of_stock() {
    let db = crate::services::test_db().await;
    let images = MockImageStore::default();
    let user = buyer(&db).await;
    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 0), None)
      .await
      .unwrap();

    let mut cart = Cart::default();
    let result = CartService::add(&db, &mut cart, user, game.id).await;
    assert!(matches!(result, Err(Error::InsufficientStock { available: 0 })));
    assert!(cart.is_empty());
  }

  #[tokio::test]
  async fn test_decrease_floors_at_one() {
    let db = crate::services::test_db().await;
    let images = MockImageStore::default();
    let user = buyer(&db).await;
    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    let mut cart = Cart::default();
    CartService::add(&db, &mut cart, user, game.id).await.unwrap();
    CartService::update(&db, &mut cart, game.id, CartAction::Decrease)
      .await
      .unwrap();
    assert_eq!(cart.lines[0].quantity, 1);

    CartService::update(&db, &mut cart, game.id, CartAction::Remove)
      .await
      .unwrap();
    assert!(cart.is_empty());
  }

  #[tokio::test]
  async fn test_total_uses_live_prices() {
    let db = crate::services::test_db().await;
    let images = MockImageStore::default();
    let user = buyer(&db).await;
    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    let mut cart = Cart::default();
    CartService::add(&db, &mut cart, user, game.id).await.unwrap();
    CartService::add(&db, &mut cart, user, game.id).await.unwrap();

    // Price change after add is reflected in the total.
    CatalogService::update_game(&db, &images, game.id, draft("Game A", 150, 5), None)
      .await
      .unwrap();

    let total = CartService::total(&db, &cart).await.unwrap();
    assert_eq!(total, rust_decimal::Decimal::new(300, 0));
  }
}
