use sea_orm_migration::prelude::*;

use super::m20260110_000001_create_users::Users;
use super::m20260110_000002_create_games::Games;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(UserLibrary::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(UserLibrary::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(UserLibrary::UserId).integer().not_null())
          .col(ColumnDef::new(UserLibrary::GameId).integer().not_null())
          .col(ColumnDef::new(UserLibrary::PurchasedAt).date_time().not_null())
          .col(
            ColumnDef::new(UserLibrary::DownloadCount)
              .integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(UserLibrary::AccessCode).string().null())
          .col(ColumnDef::new(UserLibrary::AccountEmail).string().null())
          .col(ColumnDef::new(UserLibrary::AccountPassword).string().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_library_user")
              .from(UserLibrary::Table, UserLibrary::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_library_game")
              .from(UserLibrary::Table, UserLibrary::GameId)
              .to(Games::Table, Games::Id),
          )
          .to_owned(),
      )
      .await?;

    // One library row per (user, game), ever.
    manager
      .create_index(
        Index::create()
          .name("idx_user_library_user_game")
          .table(UserLibrary::Table)
          .col(UserLibrary::UserId)
          .col(UserLibrary::GameId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(UserLibrary::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum UserLibrary {
  Table,
  Id,
  UserId,
  GameId,
  PurchasedAt,
  DownloadCount,
  AccessCode,
  AccountEmail,
  AccountPassword,
}
