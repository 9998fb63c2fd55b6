//! Order engine - checkout/buy-now, stock reservation, admin verification
//!
//! Stock is reserved when the order is created (decremented inside the
//! checkout transaction), not when the admin approves it; a review backlog
//! can therefore never oversubscribe the same units. The price paid is
//! snapshotted into the order items at creation and the rejection path
//! restores exactly what the order reserved.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
  ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
  TransactionTrait,
};
use uuid::Uuid;

use crate::entities::prelude::*;
use crate::error::{Error, LineIssue, Result};
use crate::images::ImageStore;
use crate::services::library::Access;
use crate::services::{LibraryService, UserService};

/// One requested line of a checkout batch.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutLine {
  pub game_id: i32,
  pub quantity: i32,
}

pub struct OrderService;

impl OrderService {
  /// Validate every line against the live catalog and the buyer's library,
  /// reporting all violations at once. Returns the games in line order on
  /// success, so checkout prices from the same snapshot it validated.
  async fn validate_lines(
    db: &DatabaseConnection,
    user_id: i32,
    lines: &[CheckoutLine],
  ) -> Result<Vec<GameModel>> {
    let mut issues = Vec::new();
    let mut games = Vec::with_capacity(lines.len());
    let mut seen = std::collections::HashSet::new();

    for line in lines {
      if line.quantity < 1 {
        return Err(Error::InvalidInput("quantity must be at least 1".into()));
      }
      // One line per game; callers merge quantities instead.
      if !seen.insert(line.game_id) {
        return Err(Error::InvalidInput("duplicate game in checkout batch".into()));
      }

      let Some(game) = Game::find_by_id(line.game_id).one(db).await? else {
        issues.push(LineIssue::Missing { game_id: line.game_id });
        continue;
      };

      if !game.is_active {
        issues.push(LineIssue::Inactive { game_id: game.id, title: game.title.clone() });
      } else if game.stock < line.quantity {
        issues.push(LineIssue::OutOfStock {
          game_id: game.id,
          title: game.title.clone(),
          available: game.stock,
          requested: line.quantity,
        });
      } else if LibraryService::find_entry(db, user_id, game.id).await?.is_some() {
        issues.push(LineIssue::AlreadyOwned { game_id: game.id, title: game.title.clone() });
      }

      games.push(game);
    }

    if !issues.is_empty() {
      return Err(Error::CheckoutRejected(issues));
    }
    Ok(games)
  }

  /// Create a pending order from a batch of lines, all-or-nothing.
  ///
  /// The payment proof (if any) is uploaded before the first database
  /// write, so an upload failure leaves no trace. Inside the transaction
  /// each stock decrement is conditional on `stock >= quantity`; a
  /// concurrent buyer winning the race rolls the whole order back.
  pub async fn checkout(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    user_id: i32,
    lines: &[CheckoutLine],
    payment_method_id: Option<i32>,
    proof: Option<Vec<u8>>,
  ) -> Result<OrderModel> {
    if lines.is_empty() {
      return Err(Error::EmptyCart);
    }

    UserService::get(db, user_id).await?;

    if let Some(method_id) = payment_method_id {
      let method = PaymentMethod::find_by_id(method_id).one(db).await?;
      if !method.map(|m| m.is_active).unwrap_or(false) {
        return Err(Error::PaymentMethodNotFound);
      }
    }

    let games = Self::validate_lines(db, user_id, lines).await?;

    let uploaded = match proof {
      Some(bytes) => Some(images.upload(bytes, "game_store/payment_proofs").await?),
      None => None,
    };

    let total: Decimal = games
      .iter()
      .zip(lines)
      .map(|(game, line)| game.price * Decimal::from(line.quantity))
      .sum();

    let now = Utc::now().naive_utc();
    let order_id = Uuid::new_v4().to_string();

    let txn = db.begin().await?;

    let order = OrderActiveModel {
      id: Set(order_id.clone()),
      user_id: Set(user_id),
      total_amount: Set(total),
      status: Set(OrderStatus::Pending),
      payment_method_id: Set(payment_method_id),
      payment_proof_url: Set(uploaded.as_ref().map(|img| img.url.clone())),
      payment_proof_public_id: Set(uploaded.as_ref().map(|img| img.public_id.clone())),
      created_at: Set(now),
      updated_at: Set(now),
    };
    let order = order.insert(&txn).await?;

    for (game, line) in games.iter().zip(lines) {
      let item = OrderItemActiveModel {
        order_id: Set(order_id.clone()),
        game_id: Set(game.id),
        quantity: Set(line.quantity),
        price: Set(game.price),
        ..Default::default()
      };
      item.insert(&txn).await?;

      // The reservation. Guarded against a concurrent checkout that passed
      // validation on the same units: zero rows affected means we lost.
      let updated = Game::update_many()
        .col_expr(
          crate::entities::game::Column::Stock,
          Expr::col(crate::entities::game::Column::Stock).sub(line.quantity),
        )
        .filter(crate::entities::game::Column::Id.eq(game.id))
        .filter(crate::entities::game::Column::Stock.gte(line.quantity))
        .exec(&txn)
        .await?;

      if updated.rows_affected == 0 {
        txn.rollback().await?;
        let available = Game::find_by_id(game.id)
          .one(db)
          .await?
          .map(|g| g.stock)
          .unwrap_or(0);
        return Err(Error::CheckoutRejected(vec![LineIssue::OutOfStock {
          game_id: game.id,
          title: game.title.clone(),
          available,
          requested: line.quantity,
        }]));
      }
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, user_id, total = %order.total_amount, "order created");
    Ok(order)
  }

  /// Single-line checkout that bypasses the cart.
  pub async fn buy_now(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    user_id: i32,
    game_id: i32,
    payment_method_id: Option<i32>,
    proof: Option<Vec<u8>>,
  ) -> Result<OrderModel> {
    let line = CheckoutLine { game_id, quantity: 1 };
    Self::checkout(db, images, user_id, &[line], payment_method_id, proof).await
  }

  /// Approve a pending order: grant each item into the buyer's library and
  /// mark the order paid. Stock stays as reserved at creation.
  ///
  /// Idempotency guards: a non-pending order is rejected outright, and an
  /// item whose game the buyer already owns is skipped, so re-running an
  /// approval can never double-grant. Items whose game has since vanished
  /// are skipped rather than failing the whole approval.
  pub async fn approve(
    db: &DatabaseConnection,
    acting_user_id: i32,
    order_id: &str,
  ) -> Result<OrderModel> {
    UserService::require_admin(db, acting_user_id).await?;

    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
      .one(&txn)
      .await?
      .ok_or(Error::OrderNotFound)?;
    if order.status != OrderStatus::Pending {
      txn.rollback().await?;
      return Err(Error::OrderNotPending);
    }

    let items = OrderItem::find()
      .filter(crate::entities::order_item::Column::OrderId.eq(order_id))
      .all(&txn)
      .await?;

    let now = Utc::now().naive_utc();
    for item in &items {
      let Some(game) = Game::find_by_id(item.game_id).one(&txn).await? else {
        tracing::warn!(order_id, game_id = item.game_id, "game vanished, skipping grant");
        continue;
      };

      if LibraryService::find_entry(&txn, order.user_id, game.id).await?.is_some() {
        continue;
      }

      let access = Access::provision(&game);
      let entry = LibraryActiveModel {
        user_id: Set(order.user_id),
        game_id: Set(game.id),
        purchased_at: Set(now),
        download_count: Set(0),
        access_code: Set(access.access_code),
        account_email: Set(access.account_email),
        account_password: Set(access.account_password),
        ..Default::default()
      };
      entry.insert(&txn).await?;
    }

    let mut order: OrderActiveModel = order.into();
    order.status = Set(OrderStatus::Paid);
    order.updated_at = Set(now);
    let order = order.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id, "order approved, library granted");
    Ok(order)
  }

  /// Reject a pending order: restore exactly the reserved quantities and
  /// mark the order cancelled. The payment proof is deleted from the image
  /// store afterwards, best-effort.
  pub async fn reject(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    acting_user_id: i32,
    order_id: &str,
  ) -> Result<OrderModel> {
    UserService::require_admin(db, acting_user_id).await?;

    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
      .one(&txn)
      .await?
      .ok_or(Error::OrderNotFound)?;
    if order.status != OrderStatus::Pending {
      txn.rollback().await?;
      return Err(Error::OrderNotPending);
    }

    let items = OrderItem::find()
      .filter(crate::entities::order_item::Column::OrderId.eq(order_id))
      .all(&txn)
      .await?;

    for item in &items {
      // Additive restoration; a vanished game simply matches no row.
      Game::update_many()
        .col_expr(
          crate::entities::game::Column::Stock,
          Expr::col(crate::entities::game::Column::Stock).add(item.quantity),
        )
        .filter(crate::entities::game::Column::Id.eq(item.game_id))
        .exec(&txn)
        .await?;
    }

    let mut order: OrderActiveModel = order.into();
    order.status = Set(OrderStatus::Cancelled);
    order.updated_at = Set(Utc::now().naive_utc());
    let order = order.update(&txn).await?;

    txn.commit().await?;

    if let Some(public_id) = &order.payment_proof_public_id {
      if let Err(err) = images.delete(public_id).await {
        tracing::warn!(order_id, "failed to delete payment proof {public_id}: {err}");
      }
    }

    tracing::info!(order_id, "order rejected, stock restored");
    Ok(order)
  }

  pub async fn get(db: &DatabaseConnection, order_id: &str) -> Result<OrderModel> {
    Order::find_by_id(order_id)
      .one(db)
      .await?
      .ok_or(Error::OrderNotFound)
  }

  pub async fn items(db: &DatabaseConnection, order_id: &str) -> Result<Vec<OrderItemModel>> {
    let items = OrderItem::find()
      .filter(crate::entities::order_item::Column::OrderId.eq(order_id))
      .all(db)
      .await?;
    Ok(items)
  }

  pub async fn list_for_user(db: &DatabaseConnection, user_id: i32) -> Result<Vec<OrderModel>> {
    let orders = Order::find()
      .filter(crate::entities::order::Column::UserId.eq(user_id))
      .order_by_desc(crate::entities::order::Column::CreatedAt)
      .all(db)
      .await?;
    Ok(orders)
  }

  /// All orders, optionally filtered by status, newest first.
  pub async fn list(
    db: &DatabaseConnection,
    status: Option<OrderStatus>,
  ) -> Result<Vec<OrderModel>> {
    let mut find = Order::find();
    if let Some(status) = status {
      find = find.filter(crate::entities::order::Column::Status.eq(status));
    }
    let orders = find
      .order_by_desc(crate::entities::order::Column::CreatedAt)
      .all(db)
      .await?;
    Ok(orders)
  }
}
