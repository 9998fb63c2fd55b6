//! Game entity - catalog records with stock and share-method metadata

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How access to a purchased game is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ShareMethod {
  /// A cloud/phone code; each grant gets a freshly generated code.
  #[sea_orm(string_value = "cloud_code")]
  CloudCode,
  /// A shared account; grants copy the account credentials verbatim.
  #[sea_orm(string_value = "account")]
  Account,
}

impl Default for ShareMethod {
  fn default() -> Self {
    Self::CloudCode
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub title: String,
  pub description: Option<String>,
  pub short_description: Option<String>,
  pub price: Decimal,
  pub image_url: Option<String>,
  pub image_public_id: Option<String>,
  pub share_method: ShareMethod,
  pub cloud_code: Option<String>,
  pub account_email: Option<String>,
  pub account_password: Option<String>,
  /// Units currently reservable. Never negative.
  pub stock: i32,
  /// Cumulative stock ever added. Monotonically non-decreasing.
  pub initial_stock: i32,
  pub category: Option<String>,
  pub is_active: bool,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::order_item::Entity")]
  OrderItems,
  #[sea_orm(has_many = "super::library::Entity")]
  LibraryItems,
}

impl Related<super::order_item::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::OrderItems.def()
  }
}

impl Related<super::library::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::LibraryItems.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
