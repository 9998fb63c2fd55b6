use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Games::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Games::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Games::Title).string().not_null())
          .col(ColumnDef::new(Games::Description).text().null())
          .col(ColumnDef::new(Games::ShortDescription).string().null())
          .col(ColumnDef::new(Games::Price).decimal().not_null())
          .col(ColumnDef::new(Games::ImageUrl).string().null())
          .col(ColumnDef::new(Games::ImagePublicId).string().null())
          .col(
            ColumnDef::new(Games::ShareMethod)
              .string()
              .not_null()
              .default("cloud_code"),
          )
          .col(ColumnDef::new(Games::CloudCode).string().null())
          .col(ColumnDef::new(Games::AccountEmail).string().null())
          .col(ColumnDef::new(Games::AccountPassword).string().null())
          .col(ColumnDef::new(Games::Stock).integer().not_null().default(0))
          .col(ColumnDef::new(Games::InitialStock).integer().not_null().default(0))
          .col(ColumnDef::new(Games::Category).string().null())
          .col(ColumnDef::new(Games::IsActive).boolean().not_null().default(true))
          .col(ColumnDef::new(Games::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_games_category")
          .table(Games::Table)
          .col(Games::Category)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Games::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Games {
  Table,
  Id,
  Title,
  Description,
  ShortDescription,
  Price,
  ImageUrl,
  ImagePublicId,
  ShareMethod,
  CloudCode,
  AccountEmail,
  AccountPassword,
  Stock,
  InitialStock,
  Category,
  IsActive,
  CreatedAt,
}
