//! SeaORM entity definitions
//!
//! This module contains all database entity definitions for the storefront.

pub mod game;
pub mod library;
pub mod order;
pub mod order_item;
pub mod payment_method;
pub mod prelude;
pub mod user;
