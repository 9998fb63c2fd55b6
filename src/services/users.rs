//! User service - registration and admin flag management
//!
//! Authentication itself (password checks, session issuance) belongs to the
//! external credential store; this service only keeps the records the order
//! engine needs.

use chrono::Utc;
use sea_orm::{
  ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

use crate::entities::prelude::*;
use crate::error::{Error, Result};

pub struct UserService;

impl UserService {
  pub async fn register(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password_hash: Option<String>,
  ) -> Result<UserModel> {
    let taken = User::find()
      .filter(
        crate::entities::user::Column::Username
          .eq(username)
          .or(crate::entities::user::Column::Email.eq(email)),
      )
      .one(db)
      .await?;

    if taken.is_some() {
      return Err(Error::InvalidInput("username or email already registered".into()));
    }

    let user = UserActiveModel {
      username: Set(username.to_string()),
      email: Set(email.to_string()),
      password_hash: Set(password_hash),
      is_admin: Set(false),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    };

    let user = user.insert(db).await?;
    Ok(user)
  }

  pub async fn get(db: &DatabaseConnection, user_id: i32) -> Result<UserModel> {
    User::find_by_id(user_id)
      .one(db)
      .await?
      .ok_or(Error::UserNotFound)
  }

  pub async fn set_admin(db: &DatabaseConnection, user_id: i32, is_admin: bool) -> Result<()> {
    let user = Self::get(db, user_id).await?;

    let mut user: UserActiveModel = user.into();
    user.is_admin = Set(is_admin);
    user.update(db).await?;
    Ok(())
  }

  /// Remove an account. Refused while orders or library grants reference
  /// the user; purchase history outlives the whim to delete.
  pub async fn delete(db: &DatabaseConnection, user_id: i32) -> Result<()> {
    let user = Self::get(db, user_id).await?;

    let orders = Order::find()
      .filter(crate::entities::order::Column::UserId.eq(user_id))
      .count(db)
      .await?;
    let grants = Library::find()
      .filter(crate::entities::library::Column::UserId.eq(user_id))
      .count(db)
      .await?;
    if orders > 0 || grants > 0 {
      return Err(Error::UserHasOrders);
    }

    User::delete_by_id(user.id).exec(db).await?;
    Ok(())
  }

  /// Admin gate shared by every admin-only operation. The `is_admin` flag
  /// is issued by the external credential store and trusted as-is.
  pub async fn require_admin(db: &DatabaseConnection, user_id: i32) -> Result<UserModel> {
    let user = Self::get(db, user_id).await?;
    if !user.is_admin {
      return Err(Error::Forbidden);
    }
    Ok(user)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::test_db;

  #[tokio::test]
  async fn test_register_and_get() {
    let db = test_db().await;

    let user = UserService::register(&db, "alice", "alice@example.com", None)
      .await
      .unwrap();
    assert!(!user.is_admin);

    let fetched = UserService::get(&db, user.id).await.unwrap();
    assert_eq!(fetched.username, "alice");
  }

  #[tokio::test]
  async fn test_register_duplicate_email() {
    let db = test_db().await;

    UserService::register(&db, "alice", "alice@example.com", None)
      .await
      .unwrap();

    let result = UserService::register(&db, "bob", "alice@example.com", None).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
  }

  #[tokio::test]
  async fn test_delete_refused_with_orders() {
    let db = test_db().await;
    let images = crate::images::mock::MockImageStore::default();

    let user = UserService::register(&db, "alice", "alice@example.com", None)
      .await
      .unwrap();
    let game = crate::services::CatalogService::create_game(
      &db,
      &images,
      crate::services::catalog::tests::draft("Game A", 100, 5),
      None,
    )
    .await
    .unwrap();
    crate::services::OrderService::buy_now(&db, &images, user.id, game.id, None, None)
      .await
      .unwrap();

    let result = UserService::delete(&db, user.id).await;
    assert!(matches!(result, Err(Error::UserHasOrders)));
    UserService::get(&db, user.id).await.unwrap();
  }

  #[tokio::test]
  async fn test_delete_clean_user() {
    let db = test_db().await;

    let user = UserService::register(&db, "alice", "alice@example.com", None)
      .await
      .unwrap();
    UserService::delete(&db, user.id).await.unwrap();

    let result = UserService::get(&db, user.id).await;
    assert!(matches!(result, Err(Error::UserNotFound)));
  }

  #[tokio::test]
  async fn test_require_admin() {
    let db = test_db().await;

    let user = UserService::register(&db, "alice", "alice@example.com", None)
      .await
      .unwrap();

    let result = UserService::require_admin(&db, user.id).await;
    assert!(matches!(result, Err(Error::Forbidden)));

    UserService::set_admin(&db, user.id, true).await.unwrap();
    UserService::require_admin(&db, user.id).await.unwrap();
  }
}
