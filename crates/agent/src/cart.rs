use std::sync::Arc;

use async_trait::async_trait;

use shoptalk_core::catalog::Catalog;
use shoptalk_core::domain::product::ProductId;
use shoptalk_core::domain::session::SessionId;
use shoptalk_core::errors::ApplicationError;
use shoptalk_store::StateStore;

use crate::intent::{extract_product_id, mentions_any, normalize_text};
use crate::{store_failure, Agent};

/// Bounded retries for the optimistic cart write before the conflict is
/// reported as a persistence failure.
const MAX_SAVE_ATTEMPTS: u32 = 5;

/// Add-item and cart-view logic. Stock is checked but never reserved here;
/// only checkout decrements, so two sessions can both cart the last unit and
/// race to checkout.
pub struct CartAgent {
    catalog: Arc<Catalog>,
    store: Arc<dyn StateStore>,
}

/// What an add-item attempt produced; every variant maps to a reply string.
#[derive(Debug)]
pub enum AddOutcome {
    Added { product_name: String, cart_total: String },
    ProductNotFound,
    InsufficientStock,
}

impl CartAgent {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn StateStore>) -> Self {
        Self { catalog, store }
    }

    /// Adds `quantity` units of `product_id` to the session's cart. The cart
    /// write is a compare-and-swap on the document version, retried a bounded
    /// number of times so concurrent adds to one session serialize instead of
    /// losing updates.
    pub async fn add_item(
        &self,
        session: &SessionId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<AddOutcome, ApplicationError> {
        let Some(product) = self.catalog.find(product_id) else {
            return Ok(AddOutcome::ProductNotFound);
        };

        // Availability check only; the counter is untouched until checkout.
        let available = self.store.stock(product_id).await.map_err(store_failure)?;
        if available < i64::from(quantity.max(1)) {
            return Ok(AddOutcome::InsufficientStock);
        }

        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let mut versioned = self.store.cart(session).await.map_err(store_failure)?;
            versioned.cart.add_product(product, quantity)?;

            let saved = self
                .store
                .save_cart(session, &versioned.cart, versioned.version)
                .await
                .map_err(store_failure)?;
            if saved {
                return Ok(AddOutcome::Added {
                    product_name: product.name.clone(),
                    cart_total: versioned.cart.total.to_string(),
                });
            }

            tracing::debug!(
                event_name = "cart.save.conflict",
                session_id = %session,
                product_id = %product_id,
                attempt,
                "cart version conflict, re-reading"
            );
        }

        Err(ApplicationError::Persistence(format!(
            "cart write for session {session} still conflicted after {MAX_SAVE_ATTEMPTS} attempts"
        )))
    }

    async fn view(&self, session: &SessionId) -> Result<String, ApplicationError> {
        let versioned = self.store.cart(session).await.map_err(store_failure)?;
        if versioned.cart.is_empty() {
            return Ok("Your cart is empty.".to_string());
        }

        let mut reply = String::from("Your cart:\n");
        for line in &versioned.cart.items {
            reply.push_str(&format!("- {} x{} (${})\n", line.name, line.quantity, line.subtotal));
        }
        reply.push_str(&format!("\nTotal: ${}", versioned.cart.total));
        Ok(reply)
    }
}

#[async_trait]
impl Agent for CartAgent {
    fn name(&self) -> &'static str {
        "cart"
    }

    async fn handle(
        &self,
        session: &SessionId,
        message: &str,
    ) -> Result<String, ApplicationError> {
        let lower = normalize_text(message);

        if lower.contains("add") {
            let Some(product_id) = extract_product_id(message) else {
                return Ok("Please provide a valid product ID to add to cart.".to_string());
            };

            let reply = match self.add_item(session, &product_id, 1).await? {
                AddOutcome::Added { product_name, cart_total } => {
                    format!("Added {product_name} to cart. Total: ${cart_total}")
                }
                AddOutcome::ProductNotFound => "Product not found.".to_string(),
                AddOutcome::InsufficientStock => "Insufficient stock.".to_string(),
            };
            return Ok(reply);
        }

        if mentions_any(message, &["view", "cart"]) {
            return self.view(session).await;
        }

        Ok("I can help you add items to your cart or view cart contents.".to_string())
    }
}
