//! Report service - dashboard figures and sales aggregates for the admin
//! screens

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::entities::order::OrderStatus;
use crate::entities::prelude::*;
use crate::error::Result;

const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
  pub total_orders: u64,
  pub pending_orders: u64,
  pub total_games: u64,
  pub total_users: u64,
  pub total_revenue: Decimal,
  pub low_stock_games: u64,
  pub out_of_stock_games: u64,
}

#[derive(Debug, Serialize)]
pub struct TopSeller {
  pub game_id: i32,
  pub title: String,
  pub total_sold: i64,
  pub revenue: Decimal,
}

pub struct ReportService;

impl ReportService {
  pub async fn dashboard(db: &DatabaseConnection) -> Result<DashboardStats> {
    let total_orders = Order::find().count(db).await?;
    let pending_orders = Order::find()
      .filter(crate::entities::order::Column::Status.eq(OrderStatus::Pending))
      .count(db)
      .await?;
    let total_games = Game::find().count(db).await?;
    let total_users = User::find().count(db).await?;

    let total_revenue = Order::find()
      .filter(crate::entities::order::Column::Status.eq(OrderStatus::Paid))
      .all(db)
      .await?
      .iter()
      .map(|order| order.total_amount)
      .sum();

    let low_stock_games = Game::find()
      .filter(crate::entities::game::Column::Stock.gt(0))
      .filter(crate::entities::game::Column::Stock.lte(LOW_STOCK_THRESHOLD))
      .count(db)
      .await?;
    let out_of_stock_games = Game::find()
      .filter(crate::entities::game::Column::Stock.lte(0))
      .count(db)
      .await?;

    Ok(DashboardStats {
      total_orders,
      pending_orders,
      total_games,
      total_users,
      total_revenue,
      low_stock_games,
      out_of_stock_games,
    })
  }

  /// Paid games ranked by units sold. Revenue uses the snapshotted item
  /// prices, not the current catalog price.
  pub async fn top_sellers(db: &DatabaseConnection, limit: usize) -> Result<Vec<TopSeller>> {
    let paid_orders = Order::find()
      .filter(crate::entities::order::Column::Status.eq(OrderStatus::Paid))
      .all(db)
      .await?;

    let mut by_game: std::collections::HashMap<i32, (i64, Decimal)> =
      std::collections::HashMap::new();
    for order in &paid_orders {
      let items = OrderItem::find()
        .filter(crate::entities::order_item::Column::OrderId.eq(&order.id))
        .all(db)
        .await?;
      for item in items {
        let entry = by_game.entry(item.game_id).or_insert((0, Decimal::ZERO));
        entry.0 += i64::from(item.quantity);
        entry.1 += item.price * Decimal::from(item.quantity);
      }
    }

    let mut sellers = Vec::new();
    for (game_id, (total_sold, revenue)) in by_game {
      let title = Game::find_by_id(game_id)
        .one(db)
        .await?
        .map(|game| game.title)
        .unwrap_or_else(|| format!("#{game_id}"));
      sellers.push(TopSeller { game_id, title, total_sold, revenue });
    }

    sellers.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
    sellers.truncate(limit);
    Ok(sellers)
  }
}
