use sea_orm_migration::prelude::*;

use super::m20260110_000002_create_games::Games;
use super::m20260110_000004_create_orders::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(OrderItems::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(OrderItems::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(OrderItems::OrderId).string().not_null())
          .col(ColumnDef::new(OrderItems::GameId).integer().not_null())
          .col(ColumnDef::new(OrderItems::Quantity).integer().not_null().default(1))
          .col(ColumnDef::new(OrderItems::Price).decimal().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_order_items_order")
              .from(OrderItems::Table, OrderItems::OrderId)
              .to(Orders::Table, Orders::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_order_items_game")
              .from(OrderItems::Table, OrderItems::GameId)
              .to(Games::Table, Games::Id),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_order_items_order")
          .table(OrderItems::Table)
          .col(OrderItems::OrderId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(OrderItems::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum OrderItems {
  Table,
  Id,
  OrderId,
  GameId,
  Quantity,
  Price,
}
