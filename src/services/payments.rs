//! Payment method service - the destinations buyers pay into off-system

use sea_orm::{
  ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;

use crate::entities::prelude::*;
use crate::error::{Error, Result};
use crate::images::ImageStore;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodDraft {
  pub name: String,
  pub kind: Option<String>,
  pub account_number: Option<String>,
  pub account_name: Option<String>,
  pub instructions: Option<String>,
  pub is_active: bool,
}

pub struct PaymentService;

impl PaymentService {
  pub async fn create(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    draft: PaymentMethodDraft,
    qr_code: Option<Vec<u8>>,
  ) -> Result<PaymentMethodModel> {
    let uploaded = match qr_code {
      Some(bytes) => Some(images.upload(bytes, "game_store/qr_codes").await?),
      None => None,
    };

    let method = PaymentMethodActiveModel {
      name: Set(draft.name),
      kind: Set(draft.kind),
      account_number: Set(draft.account_number),
      account_name: Set(draft.account_name),
      qr_code_url: Set(uploaded.as_ref().map(|img| img.url.clone())),
      qr_code_public_id: Set(uploaded.as_ref().map(|img| img.public_id.clone())),
      instructions: Set(draft.instructions),
      is_active: Set(draft.is_active),
      ..Default::default()
    };

    let method = method.insert(db).await?;
    Ok(method)
  }

  pub async fn update(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    method_id: i32,
    draft: PaymentMethodDraft,
    new_qr_code: Option<Vec<u8>>,
  ) -> Result<PaymentMethodModel> {
    let method = Self::get(db, method_id).await?;

    let uploaded = match new_qr_code {
      Some(bytes) => {
        if let Some(old_id) = &method.qr_code_public_id {
          if let Err(err) = images.delete(old_id).await {
            tracing::warn!("failed to delete old QR code {old_id}: {err}");
          }
        }
        Some(images.upload(bytes, "game_store/qr_codes").await?)
      }
      None => None,
    };

    let mut method: PaymentMethodActiveModel = method.into();
    method.name = Set(draft.name);
    method.kind = Set(draft.kind);
    method.account_number = Set(draft.account_number);
    method.account_name = Set(draft.account_name);
    method.instructions = Set(draft.instructions);
    method.is_active = Set(draft.is_active);
    if let Some(img) = uploaded {
      method.qr_code_url = Set(Some(img.url));
      method.qr_code_public_id = Set(Some(img.public_id));
    }

    let method = method.update(db).await?;
    Ok(method)
  }

  pub async fn delete(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    method_id: i32,
  ) -> Result<()> {
    let method = Self::get(db, method_id).await?;

    if let Some(public_id) = &method.qr_code_public_id {
      if let Err(err) = images.delete(public_id).await {
        tracing::warn!("failed to delete QR code {public_id}: {err}");
      }
    }

    PaymentMethod::delete_by_id(method.id).exec(db).await?;
    Ok(())
  }

  pub async fn get(db: &DatabaseConnection, method_id: i32) -> Result<PaymentMethodModel> {
    PaymentMethod::find_by_id(method_id)
      .one(db)
      .await?
      .ok_or(Error::PaymentMethodNotFound)
  }

  pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<PaymentMethodModel>> {
    let methods = PaymentMethod::find()
      .filter(crate::entities::payment_method::Column::IsActive.eq(true))
      .all(db)
      .await?;
    Ok(methods)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::images::mock::MockImageStore;
  use crate::services::test_db;

  fn draft(name: &str, active: bool) -> PaymentMethodDraft {
    PaymentMethodDraft {
      name: name.to_string(),
      kind: Some("bank".into()),
      account_number: Some("12345".into()),
      account_name: Some("Store".into()),
      instructions: None,
      is_active: active,
    }
  }

  #[tokio::test]
  async fn test_list_active_filters() {
    let db = test_db().await;
    let images = MockImageStore::default();

    PaymentService::create(&db, &images, draft("Bank A", true), None)
      .await
      .unwrap();
    PaymentService::create(&db, &images, draft("Bank B", false), None)
      .await
      .unwrap();

    let active = PaymentService::list_active(&db).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Bank A");
  }

  #[tokio::test]
  async fn test_delete_removes_qr_image() {
    let db = test_db().await;
    let images = MockImageStore::default();

    let method = PaymentService::create(&db, &images, draft("Bank A", true), Some(vec![1]))
      .await
      .unwrap();
    assert!(method.qr_code_public_id.is_some());

    PaymentService::delete(&db, &images, method.id).await.unwrap();
    assert_eq!(images.deleted.lock().unwrap().len(), 1);
    assert!(matches!(
      PaymentService::get(&db, method.id).await,
      Err(Error::PaymentMethodNotFound)
    ));
  }
}
