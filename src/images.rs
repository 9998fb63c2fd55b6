//! External image store
//!
//! Catalog images, payment-method QR codes and payment proofs live in an
//! external image host. The core only ever sees an opaque public id and a
//! URL. Upload failures must abort the enclosing operation before any
//! database write happens.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
  pub url: String,
  pub public_id: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
  async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<UploadedImage>;
  async fn delete(&self, public_id: &str) -> Result<()>;
}

/// HTTP-backed store: POSTs raw bytes to `{base_url}/upload?folder=..` and
/// DELETEs `{base_url}/images/{public_id}`.
pub struct HttpImageStore {
  client: reqwest::Client,
  base_url: String,
}

impl HttpImageStore {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { client: reqwest::Client::new(), base_url: base_url.into() }
  }
}

#[async_trait]
impl ImageStore for HttpImageStore {
  async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<UploadedImage> {
    let url = format!("{}/upload", self.base_url);
    let response = self
      .client
      .post(&url)
      .query(&[("folder", folder)])
      .body(bytes)
      .send()
      .await
      .map_err(|err| Error::Upload(err.to_string()))?;

    if !response.status().is_success() {
      return Err(Error::Upload(format!("upload returned {}", response.status())));
    }

    response
      .json::<UploadedImage>()
      .await
      .map_err(|err| Error::Upload(err.to_string()))
  }

  async fn delete(&self, public_id: &str) -> Result<()> {
    let url = format!("{}/images/{}", self.base_url, public_id);
    let response = self
      .client
      .delete(&url)
      .send()
      .await
      .map_err(|err| Error::Upload(err.to_string()))?;

    if !response.status().is_success() {
      return Err(Error::Upload(format!("delete returned {}", response.status())));
    }
    Ok(())
  }
}

#[cfg(test)]
pub mod mock {
  use std::sync::Mutex;
  use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

  use super::*;

  /// In-memory store for tests. Can be told to fail uploads.
  #[derive(Default)]
  pub struct MockImageStore {
    counter: AtomicU32,
    pub fail_uploads: AtomicBool,
    pub deleted: Mutex<Vec<String>>,
  }

  #[async_trait]
  impl ImageStore for MockImageStore {
    async fn upload(&self, _bytes: Vec<u8>, folder: &str) -> Result<UploadedImage> {
      if self.fail_uploads.load(Ordering::Relaxed) {
        return Err(Error::Upload("mock upload failure".into()));
      }
      let n = self.counter.fetch_add(1, Ordering::Relaxed);
      let public_id = format!("{folder}/{n}");
      Ok(UploadedImage { url: format!("https://img.test/{public_id}"), public_id })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
      self.deleted.lock().unwrap().push(public_id.to_string());
      Ok(())
    }
  }
}
