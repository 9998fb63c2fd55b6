//! Read-only HTTP API
//!
//! The storefront's pages are rendered by an external view layer; this
//! surface only serves the data it polls for: the active catalog, order
//! status, and the session's cart size. Nothing here mutates state.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::game::ShareMethod;
use crate::entities::order::OrderStatus;
use crate::error::Result;
use crate::services::catalog::GameQuery;
use crate::services::{CatalogService, OrderService};
use crate::state::AppState;

#[derive(Serialize)]
pub struct GameSummary {
  pub id: i32,
  pub title: String,
  pub category: Option<String>,
  pub price: Decimal,
  pub stock: i32,
  pub image_url: Option<String>,
  pub share_method: ShareMethod,
}

impl From<crate::entities::prelude::GameModel> for GameSummary {
  fn from(game: crate::entities::prelude::GameModel) -> Self {
    Self {
      id: game.id,
      title: game.title,
      category: game.category,
      price: game.price,
      stock: game.stock,
      image_url: game.image_url,
      share_method: game.share_method,
    }
  }
}

#[derive(Deserialize, Default)]
pub struct GameFilter {
  pub category: Option<String>,
  pub search: Option<String>,
  #[serde(default)]
  pub in_stock: bool,
}

pub async fn list_games(
  State(app): State<Arc<AppState>>,
  Query(filter): Query<GameFilter>,
) -> Result<Json<Vec<GameSummary>>> {
  let query = GameQuery {
    category: filter.category,
    search: filter.search,
    in_stock_only: filter.in_stock,
  };
  let games = CatalogService::search(&app.db, query).await?;
  Ok(Json(games.into_iter().map(GameSummary::from).collect()))
}

pub async fn game_detail(
  State(app): State<Arc<AppState>>,
  Path(game_id): Path<i32>,
) -> Result<Json<GameSummary>> {
  let game = CatalogService::get(&app.db, game_id).await?;
  Ok(Json(game.into()))
}

#[derive(Serialize)]
pub struct OrderStatusView {
  pub id: String,
  pub status: OrderStatus,
  pub total_amount: Decimal,
  pub created_at: NaiveDateTime,
}

pub async fn order_status(
  State(app): State<Arc<AppState>>,
  Path(order_id): Path<String>,
) -> Result<Json<OrderStatusView>> {
  let order = OrderService::get(&app.db, &order_id).await?;
  Ok(Json(OrderStatusView {
    id: order.id,
    status: order.status,
    total_amount: order.total_amount,
    created_at: order.created_at,
  }))
}

#[derive(Serialize)]
pub struct CartCount {
  pub count: usize,
}

pub async fn cart_count(
  State(app): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Json<CartCount> {
  Json(CartCount { count: app.cart_count(&session_id) })
}

pub async fn health() -> Json<json::Value> {
  Json(json::json!({ "status": "ok" }))
}
