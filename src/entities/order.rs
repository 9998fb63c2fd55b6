//! Order entity - one checkout or buy-now, verified manually by an admin

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order lifecycle. `Paid` and `Cancelled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum OrderStatus {
  #[sea_orm(string_value = "pending")]
  Pending,
  #[sea_orm(string_value = "paid")]
  Paid,
  #[sea_orm(string_value = "cancelled")]
  Cancelled,
}

impl Default for OrderStatus {
  fn default() -> Self {
    Self::Pending
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
  /// UUID, assigned at creation.
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub user_id: i32,
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub payment_method_id: Option<i32>,
  pub payment_proof_url: Option<String>,
  pub payment_proof_public_id: Option<String>,
  pub created_at: NaiveDateTime,
  pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id"
  )]
  User,
  #[sea_orm(has_many = "super::order_item::Entity")]
  Items,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl Related<super::order_item::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Items.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
