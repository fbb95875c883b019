//! Aggregates module
pub mod cart;
pub mod catalog;
pub mod order;
pub mod support;

pub use cart::{Cart, CartItem};
pub use catalog::{Catalog, Category, NewProduct, NewReview, Product, Review};
pub use order::{CustomerDetails, Order, OrderLedger, OrderStatus};
pub use support::{Message, Role, SupportAction, SupportMode, SupportSession};
