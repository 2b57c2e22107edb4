use std::sync::Arc;

use async_trait::async_trait;

use shoptalk_core::domain::cart::CartLine;
use shoptalk_core::domain::order::{OrderDraft, OrderStatus, PaymentMethod};
use shoptalk_core::domain::session::SessionId;
use shoptalk_core::errors::ApplicationError;
use shoptalk_store::StateStore;

use crate::{store_failure, Agent};

/// The one multi-step transactional sequence in the system: reserve every
/// cart line, create the order, clear the cart. Reservation is
/// all-or-nothing - on the first line that cannot be reserved, every line
/// reserved before it is released again.
pub struct CheckoutAgent {
    store: Arc<dyn StateStore>,
}

impl CheckoutAgent {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub async fn checkout(&self, session: &SessionId) -> Result<String, ApplicationError> {
        let versioned = self.store.cart(session).await.map_err(store_failure)?;
        if versioned.cart.is_empty() {
            return Ok("Your cart is empty. Nothing to checkout.".to_string());
        }

        if let Some(failed_line) = self.reserve_all(&versioned.cart.items).await? {
            return Ok(format!("Sorry, {} is no longer in stock.", failed_line.name));
        }

        let order = self
            .store
            .create_order(OrderDraft {
                items: versioned.cart.items.clone(),
                total: versioned.cart.total,
                payment_method: PaymentMethod::CreditCard,
                status: OrderStatus::Pending,
            })
            .await
            .map_err(store_failure)?;

        self.store.clear_cart(session).await.map_err(store_failure)?;

        tracing::info!(
            event_name = "checkout.order.created",
            session_id = %session,
            order_id = %order.order_id,
            total = %order.total,
            "checkout completed"
        );

        Ok(format!(
            "Checkout successful! Order ID: **{}**. Total: ${}.",
            order.order_id, order.total
        ))
    }

    /// Reserves each line in turn. On the first failure, releases everything
    /// reserved so far and returns the failing line.
    async fn reserve_all<'a>(
        &self,
        lines: &'a [CartLine],
    ) -> Result<Option<&'a CartLine>, ApplicationError> {
        let mut reserved: Vec<&CartLine> = Vec::with_capacity(lines.len());

        for line in lines {
            let ok = self
                .store
                .reserve_stock(&line.product_id, i64::from(line.quantity))
                .await
                .map_err(store_failure)?;

            if !ok {
                tracing::warn!(
                    event_name = "checkout.reservation.failed",
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    released_lines = reserved.len(),
                    "releasing prior reservations"
                );
                for done in reserved {
                    self.store
                        .release_stock(&done.product_id, i64::from(done.quantity))
                        .await
                        .map_err(store_failure)?;
                }
                return Ok(Some(line));
            }

            reserved.push(line);
        }

        Ok(None)
    }
}

#[async_trait]
impl Agent for CheckoutAgent {
    fn name(&self) -> &'static str {
        "checkout"
    }

    async fn handle(
        &self,
        session: &SessionId,
        _message: &str,
    ) -> Result<String, ApplicationError> {
        self.checkout(session).await
    }
}
