use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use shoptalk_core::catalog::Catalog;
use shoptalk_core::domain::cart::Cart;
use shoptalk_core::domain::order::{Order, OrderDraft, OrderId};
use shoptalk_core::domain::product::ProductId;
use shoptalk_core::domain::session::SessionId;

use super::{format_order_id, StateStore, StoreError, VersionedCart};

#[derive(Default)]
struct InnerState {
    carts: HashMap<String, (Cart, i64)>,
    stock: HashMap<String, i64>,
    order_counter: i64,
    orders: HashMap<String, Order>,
}

/// In-process state store for tests and the one-shot CLI path. One mutex
/// guards all documents, which trivially gives every operation the atomicity
/// the SQL implementation gets from conditional statements.
pub struct InMemoryStateStore {
    catalog: Arc<Catalog>,
    inner: Mutex<InnerState>,
}

impl InMemoryStateStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog, inner: Mutex::new(InnerState::default()) }
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn cart(&self, session: &SessionId) -> Result<VersionedCart, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .carts
            .get(session.as_str())
            .map(|(cart, version)| VersionedCart { cart: cart.clone(), version: *version })
            .unwrap_or_else(VersionedCart::empty))
    }

    async fn save_cart(
        &self,
        session: &SessionId,
        cart: &Cart,
        expected_version: i64,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let current_version = inner.carts.get(session.as_str()).map_or(0, |(_, v)| *v);
        if current_version != expected_version {
            return Ok(false);
        }
        inner.carts.insert(session.as_str().to_string(), (cart.clone(), current_version + 1));
        Ok(true)
    }

    async fn clear_cart(&self, session: &SessionId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.carts.remove(session.as_str());
        Ok(())
    }

    async fn stock(&self, product: &ProductId) -> Result<i64, StoreError> {
        let inner = self.inner.lock().await;
        match inner.stock.get(product.as_str()) {
            Some(count) => Ok(*count),
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
        let Some(base_stock) = self.catalog.find(product).map(|p| p.base_stock) else {
            return Ok(false);
        };

        let mut inner = self.inner.lock().await;
        let counter = inner.stock.entry(product.as_str().to_string()).or_insert(base_stock);
        if *counter >= quantity {
            *counter -= quantity;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn release_stock(&self, product: &ProductId, quantity: i64) -> Result<(), StoreError> {
        if quantity < 1 {
            return Ok(());
        }
        let mut inner = self.inner.lock().await;
        if let Some(counter) = inner.stock.get_mut(product.as_str()) {
            *counter += quantity;
        }
        Ok(())
    }

    async fn next_order_id(&self) -> Result<OrderId, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.order_counter += 1;
        Ok(format_order_id(Utc::now().date_naive(), inner.order_counter))
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

        let mut inner = self.inner.lock().await;
        inner.orders.insert(order_id.as_str().to_string(), order.clone());
        Ok(order)
    }

    async fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.orders.get(id.as_str()).cloned())
    }
}
