//! The shared state store behind every agent: per-session carts, per-product
//! stock counters, the order counter, and order documents.
//!
//! Agents never cache mutable documents across calls. Every mutation is
//! expressed as an atomic store primitive: conditional decrement for stock
//! reservation, upsert-increment for the order counter, and version
//! compare-and-swap for cart writes. Cross-call consistency lives here, not
//! in the handlers.

use async_trait::async_trait;
use thiserror::Error;

use shoptalk_core::domain::cart::Cart;
use shoptalk_core::domain::order::{Order, OrderDraft, OrderId};
use shoptalk_core::domain::product::ProductId;
use shoptalk_core::domain::session::SessionId;

pub mod memory;
pub mod sql;

pub use memory::InMemoryStateStore;
pub use sql::SqlStateStore;

/// Infrastructure failures only. Domain outcomes (empty cart, insufficient
/// stock, unknown order) are ordinary return values on the trait below.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// A cart document together with the version its row carried when read.
/// Version 0 means "no row yet"; the first successful save writes version 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedCart {
    pub cart: Cart,
    pub version: i64,
}

impl VersionedCart {
    pub fn empty() -> Self {
        Self { cart: Cart::default(), version: 0 }
    }
}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the session's cart, or the empty cart at version 0 when none
    /// has been written yet. Never fails for a missing document.
    async fn cart(&self, session: &SessionId) -> Result<VersionedCart, StoreError>;

    /// Compare-and-swap cart write: persists `cart` only if the stored
    /// version still equals `expected_version`. Returns false on conflict so
    /// the caller can re-read and retry.
    async fn save_cart(
        &self,
        session: &SessionId,
        cart: &Cart,
        expected_version: i64,
    ) -> Result<bool, StoreError>;

    /// Deletes the cart document; a subsequent `cart` returns the empty value.
    async fn clear_cart(&self, session: &SessionId) -> Result<(), StoreError>;

    /// Current stock counter. An uninitialized counter reads as the product's
    /// base stock without persisting anything; unknown products read as 0.
    async fn stock(&self, product: &ProductId) -> Result<i64, StoreError>;

    /// Atomic check-and-decrement: initializes the counter from base stock if
    /// absent, then decrements by `quantity` only when the counter covers it.
    /// Returns false (counter untouched) on insufficient stock, unknown
    /// product, or non-positive quantity.
    async fn reserve_stock(&self, product: &ProductId, quantity: i64)
        -> Result<bool, StoreError>;

    /// Re-increments a counter, compensating a reservation that is being
    /// rolled back. No-op when the counter was never initialized.
    async fn release_stock(&self, product: &ProductId, quantity: i64) -> Result<(), StoreError>;

    /// Atomically increments the order counter and formats
    /// `ORD-{YYYYMMDD}-{counter:04}`. The increment, not the date, is what
    /// guarantees uniqueness under concurrent callers.
    async fn next_order_id(&self) -> Result<OrderId, StoreError>;

    /// Assigns the next order id, stamps `created_at`/`updated_at`, persists
    /// the document, and returns it.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, StoreError>;

    async fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;
}

pub(crate) const ORDER_COUNTER_KEY: &str = "order_counter";

pub(crate) fn cart_key(session: &SessionId) -> String {
    format!("cart:{session}")
}

pub(crate) fn stock_key(product: &ProductId) -> String {
    format!("stock:{product}")
}

pub(crate) fn order_key(order_id: &OrderId) -> String {
    format!("order:{order_id}")
}

pub(crate) fn format_order_id(date: chrono::NaiveDate, counter: i64) -> OrderId {
    OrderId(format!("ORD-{}-{counter:04}", date.format("%Y%m%d")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use shoptalk_core::domain::product::ProductId;
    use shoptalk_core::domain::session::SessionId;

    use super::{cart_key, format_order_id, stock_key};

    #[test]
    fn keys_match_persisted_layout() {
        assert_eq!(cart_key(&SessionId("default".to_string())), "cart:default");
        assert_eq!(stock_key(&ProductId("SPORT001".to_string())), "stock:SPORT001");
    }

    #[test]
    fn order_id_is_zero_padded_to_four_digits() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 4).expect("valid date");
        assert_eq!(format_order_id(date, 1).as_str(), "ORD-20260204-0001");
        assert_eq!(format_order_id(date, 482).as_str(), "ORD-20260204-0482");
        // The pad is a minimum width; the sequence keeps counting past 9999.
        assert_eq!(format_order_id(date, 12345).as_str(), "ORD-20260204-12345");
    }
}
