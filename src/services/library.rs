//! Library service - owned games and access provisioning
//!
//! Provisioning runs through a single rule (`Access::provision`) shared by
//! the approval path and the lazy first-download path, so the two can never
//! diverge: cloud-code games get a freshly generated per-user code, account
//! games copy the shared credentials verbatim. Once set, access fields are
//! never overwritten.

use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
  Set, TransactionTrait,
};

use crate::entities::game::ShareMethod;
use crate::entities::prelude::*;
use crate::error::{Error, Result};

/// Generate a unique access code for a cloud-code grant. Each grant gets
/// its own code; the game's template code is never handed out directly.
pub fn generate_access_code() -> String {
  let bytes: [u8; 8] = rand::random();
  bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// The credentials a specific user will use for a specific game.
#[derive(Debug, Clone, Default)]
pub struct Access {
  pub access_code: Option<String>,
  pub account_email: Option<String>,
  pub account_password: Option<String>,
}

impl Access {
  pub fn provision(game: &GameModel) -> Self {
    match game.share_method {
      ShareMethod::CloudCode => {
        Self { access_code: Some(generate_access_code()), ..Default::default() }
      }
      ShareMethod::Account => Self {
        access_code: None,
        account_email: game.account_email.clone(),
        account_password: game.account_password.clone(),
      },
    }
  }
}

pub struct LibraryService;

impl LibraryService {
  pub async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    game_id: i32,
  ) -> Result<Option<LibraryModel>> {
    let entry = Library::find()
      .filter(crate::entities::library::Column::UserId.eq(user_id))
      .filter(crate::entities::library::Column::GameId.eq(game_id))
      .one(conn)
      .await?;
    Ok(entry)
  }

  /// Owned games with their catalog records, most recent first.
  pub async fn list(
    db: &DatabaseConnection,
    user_id: i32,
  ) -> Result<Vec<(LibraryModel, Option<GameModel>)>> {
    let entries = Library::find()
      .filter(crate::entities::library::Column::UserId.eq(user_id))
      .find_also_related(Game)
      .all(db)
      .await?;
    Ok(entries)
  }

  /// Record a download. Requires ownership; lazily provisions access fields
  /// that were left empty, using the same rule as approval-time grants.
  pub async fn download(
    db: &DatabaseConnection,
    user_id: i32,
    game_id: i32,
  ) -> Result<(LibraryModel, GameModel)> {
    let game = Game::find_by_id(game_id)
      .one(db)
      .await?
      .ok_or(Error::GameNotFound)?;

    let entry = Self::find_entry(db, user_id, game_id)
      .await?
      .ok_or(Error::NotOwned)?;

    let txn = db.begin().await?;

    let missing_code =
      game.share_method == ShareMethod::CloudCode && entry.access_code.is_none();
    let missing_account =
      game.share_method == ShareMethod::Account && entry.account_email.is_none();

    let download_count = entry.download_count + 1;
    let mut active: LibraryActiveModel = entry.into();
    active.download_count = Set(download_count);

    if missing_code || missing_account {
      let access = Access::provision(&game);
      if missing_code {
        active.access_code = Set(access.access_code);
      }
      if missing_account {
        active.account_email = Set(access.account_email);
        active.account_password = Set(access.account_password);
      }
    }

    let entry = active.update(&txn).await?;
    txn.commit().await?;

    Ok((entry, game))
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::images::mock::MockImageStore;
  use crate::services::catalog::tests::draft;
  use crate::services::{CatalogService, UserService, test_db};

  async fn grant(db: &DatabaseConnection, user_id: i32, game_id: i32, access: Access) {
    let entry = LibraryActiveModel {
      user_id: Set(user_id),
      game_id: Set(game_id),
      purchased_at: Set(Utc::now().naive_utc()),
      download_count: Set(0),
      access_code: Set(access.access_code),
      account_email: Set(access.account_email),
      account_password: Set(access.account_password),
      ..Default::default()
    };
    entry.insert(db).await.unwrap();
  }

  #[tokio::test]
  async fn test_download_requires_ownership() {
    let db = test_db().await;
    let images = MockImageStore::default();
    let user = UserService::register(&db, "u", "u@example.com", None).await.unwrap();
    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    let result = LibraryService::download(&db, user.id, game.id).await;
    assert!(matches!(result, Err(Error::NotOwned)));
  }

  #[tokio::test]
  async fn test_download_lazily_provisions_cloud_code() {
    let db = test_db().await;
    let images = MockImageStore::default();
    let user = UserService::register(&db, "u", "u@example.com", None).await.unwrap();
    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    // Grant with empty access fields.
    grant(&db, user.id, game.id, Access::default()).await;

    let (entry, _) = LibraryService::download(&db, user.id, game.id).await.unwrap();
    assert_eq!(entry.download_count, 1);
    let code = entry.access_code.clone().unwrap();
    assert_eq!(code.len(), 16);
    // Never the game's template code.
    assert_ne!(Some(code.clone()), game.cloud_code);

    // Second download keeps the code and bumps the counter.
    let (entry, _) = LibraryService::download(&db, user.id, game.id).await.unwrap();
    assert_eq!(entry.download_count, 2);
    assert_eq!(entry.access_code.as_deref(), Some(code.as_str()));
  }

  #[tokio::test]
  async fn test_download_copies_account_credentials() {
    let db = test_db().await;
    let images = MockImageStore::default();
    let user = UserService::register(&db, "u", "u@example.com", None).await.unwrap();

    let mut d = draft("Game A", 100, 5);
    d.share_method = ShareMethod::Account;
    d.account_email = Some("shared@example.com".into());
    d.account_password = Some("hunter2".into());
    let game = CatalogService::create_game(&db, &images, d, None).await.unwrap();

    grant(&db, user.id, game.id, Access::default()).await;

    let (entry, _) = LibraryService::download(&db, user.id, game.id).await.unwrap();
    assert_eq!(entry.account_email.as_deref(), Some("shared@example.com"));
    assert_eq!(entry.account_password.as_deref(), Some("hunter2"));
    assert_eq!(entry.access_code, None);
  }
}
