//! H8 Marketplace
//!
//! Single-process storefront demo: one application root owns every store and
//! all state lives in memory for the lifetime of the process.
//!
//! ## Features
//! - Product catalog management with categories, discounts and reviews
//! - Shopping cart keyed by (product, color variant)
//! - Order ledger with tracking-id lookup
//! - Support chat with AI assistance and keyword-driven human handover
//! - Password-gated admin commands

pub mod api;
pub mod app;
pub mod assistant;
pub mod config;
pub mod domain;
pub mod prefs;
pub mod seed;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Cart item not found")]
    CartItemNotFound,

    #[error("Product is out of stock")]
    OutOfStock,

    #[error("Nothing staged for checkout")]
    EmptyCheckout,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Deletion requires confirmation")]
    DeleteNotConfirmed,

    #[error("Preferences error: {0}")]
    Prefs(String),
}

pub type Result<T> = std::result::Result<T, MarketplaceError>;
