//! Business logic services

pub mod cart;
pub mod catalog;
pub mod library;
pub mod orders;
pub mod payments;
pub mod reports;
pub mod users;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use library::LibraryService;
pub use orders::OrderService;
pub use payments::PaymentService;
pub use reports::ReportService;
pub use users::UserService;

#[cfg(test)]
pub(crate) async fn test_db() -> sea_orm::DatabaseConnection {
  use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

  let db = Database::connect("sqlite::memory:").await.unwrap();
  let schema = Schema::new(DbBackend::Sqlite);

  let stmt = schema.create_table_from_entity(crate::entities::user::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(crate::entities::game::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(crate::entities::payment_method::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(crate::entities::order::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(crate::entities::order_item::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(crate::entities::library::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  db
}
