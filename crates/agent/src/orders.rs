use std::sync::Arc;

use async_trait::async_trait;

use shoptalk_core::domain::order::OrderId;
use shoptalk_core::domain::session::SessionId;
use shoptalk_core::errors::ApplicationError;
use shoptalk_store::StateStore;

use crate::intent::extract_order_id;
use crate::{store_failure, Agent};

/// Read-only order status retrieval keyed on an order id found in the
/// message text.
pub struct OrderAgent {
    store: Arc<dyn StateStore>,
}

impl OrderAgent {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Agent for OrderAgent {
    fn name(&self) -> &'static str {
        "orders"
    }

    async fn handle(
        &self,
        _session: &SessionId,
        message: &str,
    ) -> Result<String, ApplicationError> {
        let Some(order_id) = extract_order_id(message) else {
            return Ok(
                "Please provide an order ID (e.g. ORD-20260204-0001) to check status.".to_string()
            );
        };

        let order_id = OrderId(order_id);
        match self.store.order(&order_id).await.map_err(store_failure)? {
            Some(order) => Ok(format!(
                "Order **{}** is currently **{}**. Total: ${}.",
                order.order_id, order.status, order.total
            )),
            None => Ok("Order not found.".to_string()),
        }
    }
}
