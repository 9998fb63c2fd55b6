//! Game Store - digital-goods storefront core
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the read-only HTTP API with rate limiting
//! - External collaborators: image store (HTTP), credential store, view layer
//! - Tokio for async runtime

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use game_store::handlers;
use game_store::images::HttpImageStore;
use game_store::prelude::*;
use game_store::state::AppState;

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  // Initialize tracing
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "game_store=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:store.db?mode=rwc".into());
  let image_store_url = env::var("IMAGE_STORE_URL").expect("IMAGE_STORE_URL not set");

  info!("Starting Game Store v{}", env!("CARGO_PKG_VERSION"));

  let images = Arc::new(HttpImageStore::new(image_store_url));
  let app_state = Arc::new(AppState::new(&db_url, images).await);

  // Evict idle session carts
  let gc_app = app_state.clone();
  tokio::spawn(async move {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
      interval.tick().await;
      gc_app.gc_carts();
    }
  });

  // Rate limiting for the polling endpoints
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .expect("Failed to build rate limiter config"),
  );

  let governor_limiter = governor_conf.limiter().clone();
  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  let app = Router::new()
    .route("/api/games", get(handlers::list_games))
    .route("/api/games/{game_id}", get(handlers::game_detail))
    .route("/api/orders/{order_id}", get(handlers::order_status))
    .route("/api/cart/{session_id}/count", get(handlers::cart_count))
    .route("/health", get(handlers::health))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app_state);

  let port: u16 = env::var("PORT")
    .ok()
    .and_then(|p| p.parse().ok())
    .unwrap_or(3000);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  info!("HTTP server listening on {}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
  axum::serve(listener, app).await.expect("Server error");
}
