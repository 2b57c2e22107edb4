//! Agent logics - keyword-driven text handlers over the shared state store
//!
//! Each agent is invoked as `(session_id, message_text) -> response_text` by
//! whatever transport fronts it (HTTP here, anything message-shaped in
//! principle). The agents themselves are deliberately simple keyword
//! matchers; all correctness-bearing work happens in the state store they
//! share:
//!
//! 1. **Search** (`search`) - catalog keyword lookup, read-only
//! 2. **Cart** (`cart`) - add-item with versioned cart writes, cart view
//! 3. **Checkout** (`checkout`) - the one multi-step transactional sequence
//! 4. **Order lookup** (`orders`) - read-only order status retrieval
//!
//! The `router` module dispatches free text to one of the four by keyword,
//! mirroring how the demo's coordinator picks a downstream service.
//!
//! # Error policy
//!
//! Domain outcomes (unknown product, insufficient stock, empty cart, missing
//! order) never escape a handler - each converts them to a user-facing reply
//! where it detects them. Only infrastructure failures (store unreachable)
//! propagate, as `ApplicationError::Persistence`.

pub mod cart;
pub mod checkout;
pub mod intent;
pub mod orders;
pub mod router;
pub mod search;

use async_trait::async_trait;

use shoptalk_core::domain::session::SessionId;
use shoptalk_core::errors::ApplicationError;
use shoptalk_store::StoreError;

pub use cart::CartAgent;
pub use checkout::CheckoutAgent;
pub use orders::OrderAgent;
pub use router::{AgentKind, Router};
pub use search::SearchAgent;

#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        session: &SessionId,
        message: &str,
    ) -> Result<String, ApplicationError>;
}

pub(crate) fn store_failure(error: StoreError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}
