//! PaymentMethod entity - manually-verified payment destinations

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  pub kind: Option<String>,
  pub account_number: Option<String>,
  pub account_name: Option<String>,
  pub qr_code_url: Option<String>,
  pub qr_code_public_id: Option<String>,
  pub instructions: Option<String>,
  pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
