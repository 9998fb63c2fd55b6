use sea_orm_migration::prelude::*;

use super::m20260110_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Orders::Table)
          .if_not_exists()
          .col(ColumnDef::new(Orders::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Orders::UserId).integer().not_null())
          .col(ColumnDef::new(Orders::TotalAmount).decimal().not_null())
          .col(
            ColumnDef::new(Orders::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Orders::PaymentMethodId).integer().null())
          .col(ColumnDef::new(Orders::PaymentProofUrl).string().null())
          .col(ColumnDef::new(Orders::PaymentProofPublicId).string().null())
          .col(ColumnDef::new(Orders::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Orders::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_orders_user")
              .from(Orders::Table, Orders::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_orders_user")
          .table(Orders::Table)
          .col(Orders::UserId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_orders_status")
          .table(Orders::Table)
          .col(Orders::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Orders::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Orders {
  Table,
  Id,
  UserId,
  TotalAmount,
  Status,
  PaymentMethodId,
  PaymentProofUrl,
  PaymentProofPublicId,
  CreatedAt,
  UpdatedAt,
}
