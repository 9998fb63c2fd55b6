//! OrderItem entity - one line of an order, with its price snapshot

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub order_id: String,
  pub game_id: i32,
  pub quantity: i32,
  /// Price at purchase time; immune to later catalog price edits.
  pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::order::Entity",
    from = "Column::OrderId",
    to = "super::order::Column::Id"
  )]
  Order,
  #[sea_orm(
    belongs_to = "super::game::Entity",
    from = "Column::GameId",
    to = "super::game::Column::Id"
  )]
  Game,
}

impl Related<super::order::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Order.def()
  }
}

impl Related<super::game::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Game.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
