//! Digital-goods storefront core
//!
//! Catalog, session carts, and the order lifecycle: checkout reserves stock
//! at creation time, a human admin approves or rejects each payment proof,
//! and approval grants per-user access credentials into the buyer's
//! library. Rendering, authentication, and image hosting are external
//! collaborators.

pub mod cart;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod images;
pub mod migration;
pub mod prelude;
pub mod services;
pub mod state;
