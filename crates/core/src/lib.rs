pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::Catalog;
pub use domain::cart::{Cart, CartLine};
pub use domain::order::{Order, OrderDraft, OrderId, OrderStatus, PaymentMethod};
pub use domain::product::{Product, ProductId};
pub use domain::session::SessionId;
pub use errors::{ApplicationError, DomainError};
