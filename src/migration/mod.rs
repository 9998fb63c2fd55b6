//! Database migrations using SeaORM

use sea_orm_migration::prelude::*;

mod m20260110_000001_create_users;
mod m20260110_000002_create_games;
mod m20260110_000003_create_payment_methods;
mod m20260110_000004_create_orders;
mod m20260110_000005_create_order_items;
mod m20260110_000006_create_user_library;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260110_000001_create_users::Migration),
      Box::new(m20260110_000002_create_games::Migration),
      Box::new(m20260110_000003_create_payment_methods::Migration),
      Box::new(m20260110_000004_create_orders::Migration),
      Box::new(m20260110_000005_create_order_items::Migration),
      Box::new(m20260110_000006_create_user_library::Migration),
    ]
  }
}
