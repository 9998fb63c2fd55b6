//! User entity - registered buyers and admins

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  #[sea_orm(unique)]
  pub username: String,
  #[sea_orm(unique)]
  pub email: String,
  /// Owned by the external credential store; opaque to this crate.
  pub password_hash: Option<String>,
  pub is_admin: bool,
  pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::order::Entity")]
  Orders,
  #[sea_orm(has_many = "super::library::Entity")]
  LibraryItems,
}

impl Related<super::order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Orders.def()
  }
}

impl Related<super::library::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::LibraryItems.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
