use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use shoptalk_core::catalog::Catalog;
use shoptalk_core::domain::cart::Cart;
use shoptalk_core::domain::order::{Order, OrderDraft, OrderId};
use shoptalk_core::domain::product::ProductId;
use shoptalk_core::domain::session::SessionId;

use super::{
    cart_key, format_order_id, order_key, stock_key, StateStore, StoreError, VersionedCart,
    ORDER_COUNTER_KEY,
};
use crate::DbPool;

/// SQLite-backed state store. Every mutation is a single conditional
/// statement so two handlers racing on the same counter or cart row cannot
/// interleave a stale read with a write.
pub struct SqlStateStore {
    pool: DbPool,
    catalog: Arc<Catalog>,
}

impl SqlStateStore {
    pub fn new(pool: DbPool, catalog: Arc<Catalog>) -> Self {
        Self { pool, catalog }
    }
}

fn decode<E: std::fmt::Display>(error: E) -> StoreError {
    StoreError::Decode(error.to_string())
}

#[async_trait]
impl StateStore for SqlStateStore {
    async fn cart(&self, session: &SessionId) -> Result<VersionedCart, StoreError> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT value, version FROM state WHERE key = ?")
                .bind(cart_key(session))
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((value, version)) => {
                let cart: Cart = serde_json::from_str(&value).map_err(decode)?;
                Ok(VersionedCart { cart, version })
            }
            None => Ok(VersionedCart::empty()),
        }
    }

    async fn save_cart(
        &self,
        session: &SessionId,
        cart: &Cart,
        expected_version: i64,
    ) -> Result<bool, StoreError> {
        let value = serde_json::to_string(cart).map_err(decode)?;
        let key = cart_key(session);

        // Version 0 means the caller saw no row; only an insert may win.
        let result = if expected_version == 0 {
            sqlx::query(
                "INSERT INTO state (key, value, version) VALUES (?, ?, 1)
                 ON CONFLICT(key) DO NOTHING",
            )
            .bind(&key)
            .bind(&value)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                "UPDATE state SET value = ?, version = version + 1
                 WHERE key = ? AND version = ?",
            )
            .bind(&value)
            .bind(&key)
            .bind(expected_version)
            .execute(&self.pool)
            .await?
        };

        Ok(result.rows_affected() == 1)
    }

    async fn clear_cart(&self, session: &SessionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM state WHERE key = ?")
            .bind(cart_key(session))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn stock(&self, product: &ProductId) -> Result<i64, StoreError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM state WHERE key = ?")
            .bind(stock_key(product))
            .fetch_optional(&self.pool)
            .await?;

        match value {
            Some(raw) => raw.trim().parse::<i64>().map_err(decode),
            // Pure read on an absent counter: report base stock, persist nothing.
            None => Ok(self.catalog.find(product).map_or(0, |p| p.base_stock)),
        }
    }

    async fn reserve_stock(
        &self,
        product: &ProductId,
        quantity: i64,
    ) -> Result<bool, StoreError> {
        if quantity < 1 {
            return Ok(false);
        }
        let Some(catalog_product) = self.catalog.find(product) else {
            return Ok(false);
        };
        let key = stock_key(product);

        let mut tx = self.pool.begin().await?;

        // Initialize-if-absent, so concurrent first touches seed exactly once.
        sqlx::query(
            "INSERT INTO state (key, value, version) VALUES (?, ?, 1)
             ON CONFLICT(key) DO NOTHING",
        )
        .bind(&key)
        .bind(catalog_product.base_stock.to_string())
        .execute(&mut *tx)
        .await?;

        // The check and the decrement are one statement; rows_affected tells
        // us whether the reservation succeeded.
        let updated = sqlx::query(
            "UPDATE state
             SET value = CAST(CAST(value AS INTEGER) - ?1 AS TEXT), version = version + 1
             WHERE key = ?2 AND CAST(value AS INTEGER) >= ?1",
        )
        .bind(quantity)
        .bind(&key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated.rows_affected() == 1)
    }

    async fn release_stock(&self, product: &ProductId, quantity: i64) -> Result<(), StoreError> {
        if quantity < 1 {
            return Ok(());
        }
        sqlx::query(
            "UPDATE state
             SET value = CAST(CAST(value AS INTEGER) + ? AS TEXT), version = version + 1
             WHERE key = ?",
        )
        .bind(quantity)
        .bind(stock_key(product))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn next_order_id(&self) -> Result<OrderId, StoreError> {
        let counter: i64 = sqlx::query_scalar(
            "INSERT INTO state (key, value, version) VALUES (?, '1', 1)
             ON CONFLICT(key) DO UPDATE
                 SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT), version = version + 1
             RETURNING CAST(value AS INTEGER)",
        )
        .bind(ORDER_COUNTER_KEY)
        .fetch_one(&self.pool)
        .await?;

        Ok(format_order_id(Utc::now().date_naive(), counter))
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, StoreError> {
        let order_id = self.next_order_id().await?;
        let now = Utc::now();
        let order = Order {
            order_id: order_id.clone(),
            items: draft.items,
            total: draft.total,
            payment_method: draft.payment_method,
            status: draft.status,
            created_at: now,
            updated_at: now,
            tracking_number: None,
        };

        let value = serde_json::to_string(&order).map_err(decode)?;
        sqlx::query("INSERT INTO state (key, value, version) VALUES (?, ?, 1)")
            .bind(order_key(&order_id))
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(order)
    }

    async fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM state WHERE key = ?")
            .bind(order_key(id))
            .fetch_optional(&self.pool)
            .await?;

        match value {
            Some(raw) => {
                let order: Order = serde_json::from_str(&raw).map_err(decode)?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }
}
