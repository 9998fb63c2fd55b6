//! Entity prelude for convenient imports

pub use super::game::{
  ActiveModel as GameActiveModel, Entity as Game, Model as GameModel, ShareMethod,
};
pub use super::library::{
  ActiveModel as LibraryActiveModel, Entity as Library, Model as LibraryModel,
};
pub use super::order::{
  ActiveModel as OrderActiveModel, Entity as Order, Model as OrderModel, OrderStatus,
};
pub use super::order_item::{
  ActiveModel as OrderItemActiveModel, Entity as OrderItem, Model as OrderItemModel,
};
pub use super::payment_method::{
  ActiveModel as PaymentMethodActiveModel, Entity as PaymentMethod, Model as PaymentMethodModel,
};
pub use super::user::{ActiveModel as UserActiveModel, Entity as User, Model as UserModel};
