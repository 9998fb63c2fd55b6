use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PaymentMethods::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PaymentMethods::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(PaymentMethods::Name).string().not_null())
          .col(ColumnDef::new(PaymentMethods::Kind).string().null())
          .col(ColumnDef::new(PaymentMethods::AccountNumber).string().null())
          .col(ColumnDef::new(PaymentMethods::AccountName).string().null())
          .col(ColumnDef::new(PaymentMethods::QrCodeUrl).string().null())
          .col(ColumnDef::new(PaymentMethods::QrCodePublicId).string().null())
          .col(ColumnDef::new(PaymentMethods::Instructions).text().null())
          .col(
            ColumnDef::new(PaymentMethods::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PaymentMethods {
  Table,
  Id,
  Name,
  Kind,
  AccountNumber,
  AccountName,
  QrCodeUrl,
  QrCodePublicId,
  Instructions,
  IsActive,
}
