//! Error types for the storefront

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// One offending checkout line. Validation reports every violation in the
/// batch, not just the first.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LineIssue {
  Missing { game_id: i32 },
  Inactive { game_id: i32, title: String },
  OutOfStock { game_id: i32, title: String, available: i32, requested: i32 },
  AlreadyOwned { game_id: i32, title: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("game not found")]
  GameNotFound,

  #[error("order not found")]
  OrderNotFound,

  #[error("user not found")]
  UserNotFound,

  #[error("payment method not found")]
  PaymentMethodNotFound,

  #[error("cart is empty")]
  EmptyCart,

  #[error("game already owned")]
  AlreadyOwned,

  #[error("game not owned")]
  NotOwned,

  #[error("insufficient stock: {available} available")]
  InsufficientStock { available: i32 },

  #[error("checkout rejected: {} offending line(s)", .0.len())]
  CheckoutRejected(Vec<LineIssue>),

  #[error("order is not pending")]
  OrderNotPending,

  #[error("admin privileges required")]
  Forbidden,

  #[error("image upload failed: {0}")]
  Upload(String),

  #[error("game has existing orders")]
  GameHasOrders,

  #[error("user has existing orders")]
  UserHasOrders,

  #[error("{0}")]
  InvalidInput(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
      Error::GameNotFound => (StatusCode::NOT_FOUND, "Game not found"),
      Error::OrderNotFound => (StatusCode::NOT_FOUND, "Order not found"),
      Error::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
      Error::PaymentMethodNotFound => (StatusCode::NOT_FOUND, "Payment method not found"),
      Error::EmptyCart => (StatusCode::BAD_REQUEST, "Cart is empty"),
      Error::AlreadyOwned => (StatusCode::CONFLICT, "Game already owned"),
      Error::NotOwned => (StatusCode::FORBIDDEN, "Game not owned"),
      Error::InsufficientStock { .. } => (StatusCode::CONFLICT, "Insufficient stock"),
      Error::CheckoutRejected(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Checkout rejected"),
      Error::OrderNotPending => (StatusCode::CONFLICT, "Order is not pending"),
      Error::Forbidden => (StatusCode::FORBIDDEN, "Admin privileges required"),
      Error::Upload(_) => (StatusCode::BAD_GATEWAY, "Image upload failed"),
      Error::GameHasOrders => (StatusCode::CONFLICT, "Game has existing orders"),
      Error::UserHasOrders => (StatusCode::CONFLICT, "User has existing orders"),
      Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
      Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    };

    let body = match &self {
      Error::CheckoutRejected(issues) => json::json!({
        "success": false,
        "error": message,
        "lines": issues,
      }),
      _ => json::json!({
        "success": false,
        "error": message,
      }),
    };

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T> = std::result::Result<T, Error>;
