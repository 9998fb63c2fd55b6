//! Common imports shared across the crate

pub use sea_orm::{Database, DatabaseConnection};
pub use sea_orm_migration::MigratorTrait;
pub use tracing::{error, info, warn};

pub use crate::error::{Error, Result};
