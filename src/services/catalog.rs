//! Catalog service - game records, stock administration, browsing queries
//!
//! Stock rules: `stock` is only ever reduced by the order engine's
//! reservation; the admin paths may only grow it, and every unit added is
//! also added to `initial_stock`, which therefore never decreases.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
  ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
  QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;

use crate::entities::game::ShareMethod;
use crate::entities::prelude::*;
use crate::error::{Error, Result};
use crate::images::ImageStore;

#[derive(Debug, Clone, Deserialize)]
pub struct GameDraft {
  pub title: String,
  pub description: Option<String>,
  pub short_description: Option<String>,
  pub price: Decimal,
  pub stock: i32,
  pub share_method: ShareMethod,
  pub cloud_code: Option<String>,
  pub account_email: Option<String>,
  pub account_password: Option<String>,
  pub category: Option<String>,
  pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GameQuery {
  pub category: Option<String>,
  pub search: Option<String>,
  pub in_stock_only: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CategoryCount {
  pub name: String,
  pub count: u64,
}

pub struct CatalogService;

impl CatalogService {
  fn check_draft(draft: &GameDraft) -> Result<()> {
    if draft.price < Decimal::ZERO {
      return Err(Error::InvalidInput("price must be non-negative".into()));
    }
    if draft.stock < 0 {
      return Err(Error::InvalidInput("stock must be non-negative".into()));
    }
    Ok(())
  }

  /// Share-method fields are exclusive: a cloud-code game carries no
  /// account credentials and vice versa.
  fn share_fields(
    draft: &GameDraft,
  ) -> (Option<String>, Option<String>, Option<String>) {
    match draft.share_method {
      ShareMethod::CloudCode => (draft.cloud_code.clone(), None, None),
      ShareMethod::Account => {
        (None, draft.account_email.clone(), draft.account_password.clone())
      }
    }
  }

  pub async fn create_game(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    draft: GameDraft,
    image: Option<Vec<u8>>,
  ) -> Result<GameModel> {
    Self::check_draft(&draft)?;

    // Upload before any database write; a failed upload aborts cleanly.
    let uploaded = match image {
      Some(bytes) => Some(images.upload(bytes, "game_store/games").await?),
      None => None,
    };

    let (cloud_code, account_email, account_password) = Self::share_fields(&draft);

    let game = GameActiveModel {
      title: Set(draft.title),
      description: Set(draft.description),
      short_description: Set(draft.short_description),
      price: Set(draft.price),
      image_url: Set(uploaded.as_ref().map(|img| img.url.clone())),
      image_public_id: Set(uploaded.as_ref().map(|img| img.public_id.clone())),
      share_method: Set(draft.share_method),
      cloud_code: Set(cloud_code),
      account_email: Set(account_email),
      account_password: Set(account_password),
      stock: Set(draft.stock),
      initial_stock: Set(draft.stock),
      category: Set(draft.category),
      is_active: Set(draft.is_active),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    };

    let game = game.insert(db).await?;
    Ok(game)
  }

  pub async fn update_game(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    game_id: i32,
    draft: GameDraft,
    new_image: Option<Vec<u8>>,
  ) -> Result<GameModel> {
    Self::check_draft(&draft)?;

    let game = Self::get(db, game_id).await?;

    // The edit path may not shrink stock; sold units are accounted for by
    // the order engine, not by admin edits.
    if draft.stock < game.stock {
      return Err(Error::InvalidInput(format!(
        "cannot reduce stock from {} to {}; restock only adds",
        game.stock, draft.stock
      )));
    }
    let added = draft.stock - game.stock;

    let uploaded = match new_image {
      Some(bytes) => {
        if let Some(old_id) = &game.image_public_id {
          if let Err(err) = images.delete(old_id).await {
            tracing::warn!("failed to delete old catalog image {old_id}: {err}");
          }
        }
        Some(images.upload(bytes, "game_store/games").await?)
      }
      None => None,
    };

    let (cloud_code, account_email, account_password) = Self::share_fields(&draft);
    let initial_stock = game.initial_stock + added;

    let mut game: GameActiveModel = game.into();
    game.title = Set(draft.title);
    game.description = Set(draft.description);
    game.short_description = Set(draft.short_description);
    game.price = Set(draft.price);
    game.share_method = Set(draft.share_method);
    game.cloud_code = Set(cloud_code);
    game.account_email = Set(account_email);
    game.account_password = Set(account_password);
    game.stock = Set(draft.stock);
    game.initial_stock = Set(initial_stock);
    game.category = Set(draft.category);
    game.is_active = Set(draft.is_active);
    if let Some(img) = uploaded {
      game.image_url = Set(Some(img.url));
      game.image_public_id = Set(Some(img.public_id));
    }

    let game = game.update(db).await?;
    Ok(game)
  }

  /// Add `units` to both `stock` and `initial_stock`.
  pub async fn restock(db: &DatabaseConnection, game_id: i32, units: i32) -> Result<GameModel> {
    if units <= 0 {
      return Err(Error::InvalidInput("restock units must be positive".into()));
    }

    let game = Self::get(db, game_id).await?;
    let stock = game.stock + units;
    let initial_stock = game.initial_stock + units;

    let mut game: GameActiveModel = game.into();
    game.stock = Set(stock);
    game.initial_stock = Set(initial_stock);
    let game = game.update(db).await?;
    Ok(game)
  }

  pub async fn set_active(db: &DatabaseConnection, game_id: i32, is_active: bool) -> Result<()> {
    let game = Self::get(db, game_id).await?;

    let mut game: GameActiveModel = game.into();
    game.is_active = Set(is_active);
    game.update(db).await?;
    Ok(())
  }

  /// Hard delete. Refused while any order references the game; deactivate
  /// instead to retire it from the storefront.
  pub async fn delete_game(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    game_id: i32,
  ) -> Result<()> {
    let game = Self::get(db, game_id).await?;

    let referenced = OrderItem::find()
      .filter(crate::entities::order_item::Column::GameId.eq(game_id))
      .count(db)
      .await?;
    if referenced > 0 {
      return Err(Error::GameHasOrders);
    }

    if let Some(public_id) = &game.image_public_id {
      if let Err(err) = images.delete(public_id).await {
        tracing::warn!("failed to delete catalog image {public_id}: {err}");
      }
    }

    Game::delete_by_id(game.id).exec(db).await?;
    Ok(())
  }

  pub async fn get(db: &DatabaseConnection, game_id: i32) -> Result<GameModel> {
    Game::find_by_id(game_id)
      .one(db)
      .await?
      .ok_or(Error::GameNotFound)
  }

  pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<GameModel>> {
    let games = Game::find()
      .filter(crate::entities::game::Column::IsActive.eq(true))
      .order_by_desc(crate::entities::game::Column::CreatedAt)
      .all(db)
      .await?;
    Ok(games)
  }

  pub async fn search(db: &DatabaseConnection, query: GameQuery) -> Result<Vec<GameModel>> {
    let mut find = Game::find().filter(crate::entities::game::Column::IsActive.eq(true));

    if let Some(category) = &query.category {
      find = find.filter(crate::entities::game::Column::Category.eq(category));
    }
    if let Some(search) = &query.search {
      find = find.filter(crate::entities::game::Column::Title.contains(search));
    }
    if query.in_stock_only {
      find = find.filter(crate::entities::game::Column::Stock.gt(0));
    }

    let games = find
      .order_by_desc(crate::entities::game::Column::CreatedAt)
      .all(db)
      .await?;
    Ok(games)
  }

  /// Distinct categories of active games with their game counts, for the
  /// view layer's sidebar.
  pub async fn categories_with_counts(db: &DatabaseConnection) -> Result<Vec<CategoryCount>> {
    let categories: Vec<Option<String>> = Game::find()
      .select_only()
      .column(crate::entities::game::Column::Category)
      .filter(crate::entities::game::Column::IsActive.eq(true))
      .distinct()
      .into_tuple()
      .all(db)
      .await?;

    let mut counts = Vec::new();
    for name in categories.into_iter().flatten() {
      let count = Game::find()
        .filter(crate::entities::game::Column::Category.eq(&name))
        .filter(crate::entities::game::Column::IsActive.eq(true))
        .count(db)
        .await?;
      counts.push(CategoryCount { name, count });
    }
    Ok(counts)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use rust_decimal::Decimal;

  use super::*;
  use crate::images::mock::MockImageStore;
  use crate::services::test_db;

  pub(crate) fn draft(title: &str, price: i64, stock: i32) -> GameDraft {
    GameDraft {
      title: title.to_string(),
      description: None,
      short_description: None,
      price: Decimal::new(price, 0),
      stock,
      share_method: ShareMethod::CloudCode,
      cloud_code: Some("TEMPLATE".into()),
      account_email: None,
      account_password: None,
      category: Some("Cloud".into()),
      is_active: true,
    }
  }

  #[tokio::test]
  async fn test_create_sets_initial_stock() {
    let db = test_db().await;
    let images = MockImageStore::default();

    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    assert_eq!(game.stock, 5);
    assert_eq!(game.initial_stock, 5);
  }

  #[tokio::test]
  async fn test_account_draft_drops_cloud_code() {
    let db = test_db().await;
    let images = MockImageStore::default();

    let mut d = draft("Game A", 100, 5);
    d.share_method = ShareMethod::Account;
    d.account_email = Some("shared@example.com".into());
    d.account_password = Some("hunter2".into());

    let game = CatalogService::create_game(&db, &images, d, None).await.unwrap();
    assert_eq!(game.cloud_code, None);
    assert_eq!(game.account_email.as_deref(), Some("shared@example.com"));
  }

  #[tokio::test]
  async fn test_edit_cannot_shrink_stock() {
    let db = test_db().await;
    let images = MockImageStore::default();

    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    let result =
      CatalogService::update_game(&db, &images, game.id, draft("Game A", 100, 3), None).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
  }

  #[tokio::test]
  async fn test_edit_growth_adds_to_initial_stock() {
    let db = test_db().await;
    let images = MockImageStore::default();

    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    let game =
      CatalogService::update_game(&db, &images, game.id, draft("Game A", 100, 8), None)
        .await
        .unwrap();
    assert_eq!(game.stock, 8);
    assert_eq!(game.initial_stock, 8);
  }

  #[tokio::test]
  async fn test_restock_is_additive() {
    let db = test_db().await;
    let images = MockImageStore::default();

    let game = CatalogService::create_game(&db, &images, draft("Game A", 100, 5), None)
      .await
      .unwrap();

    let game = CatalogService::restock(&db, game.id, 3).await.unwrap();
    assert_eq!(game.stock, 8);
    assert_eq!(game.initial_stock, 8);

    assert!(CatalogService::restock(&db, game.id, 0).await.is_err());
  }

  #[tokio::test]
  async fn test_upload_failure_aborts_create() {
    let db = test_db().await;
    let images = MockImageStore::default();
    images.fail_uploads.store(true, std::sync::atomic::Ordering::Relaxed);

    let result =
      CatalogService::create_game(&db, &images, draft("Game A", 100, 5), Some(vec![1, 2, 3]))
        .await;
    assert!(matches!(result, Err(Error::Upload(_))));

    // Nothing was written.
    assert!(CatalogService::list_active(&db).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_search_filters() {
    let db = test_db().await;
    let images = MockImageStore::default();

    CatalogService::create_game(&db, &images, draft("Alpha Quest", 100, 5), None)
      .await
      .unwrap();
    let mut sold_out = draft("Beta Saga", 100, 0);
    sold_out.category = Some("Fish".into());
    CatalogService::create_game(&db, &images, sold_out, None).await.unwrap();

    let query = GameQuery { in_stock_only: true, ..Default::default() };
    let games = CatalogService::search(&db, query).await.unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].title, "Alpha Quest");

    let query = GameQuery { search: Some("Saga".into()), ..Default::default() };
    let games = CatalogService::search(&db, query).await.unwrap();
    assert_eq!(games.len(), 1);

    let counts = CatalogService::categories_with_counts(&db).await.unwrap();
    assert_eq!(counts.len(), 2);
  }
}
