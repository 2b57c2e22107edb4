use std::sync::Arc;

use shoptalk_core::catalog::Catalog;
use shoptalk_core::domain::cart::Cart;
use shoptalk_core::domain::session::SessionId;
use shoptalk_core::errors::ApplicationError;
use shoptalk_store::StateStore;

use crate::intent::mentions_any;
use crate::{store_failure, Agent, CartAgent, CheckoutAgent, OrderAgent, SearchAgent};

const SEARCH_KEYWORDS: [&str; 4] = ["search", "find", "show", "look"];
const CART_KEYWORDS: [&str; 3] = ["add", "cart", "view"];
const CHECKOUT_KEYWORDS: [&str; 3] = ["checkout", "buy", "pay"];
const ORDER_KEYWORDS: [&str; 3] = ["status", "order", "track"];

const HELP_REPLY: &str =
    "I can help you search for products, manage your cart, checkout, or track orders.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Search,
    Cart,
    Checkout,
    Orders,
}

/// Classifies a message by keyword, first matching set wins in the order
/// search, cart, checkout, orders.
pub fn classify(message: &str) -> Option<AgentKind> {
    if mentions_any(message, &SEARCH_KEYWORDS) {
        Some(AgentKind::Search)
    } else if mentions_any(message, &CART_KEYWORDS) {
        Some(AgentKind::Cart)
    } else if mentions_any(message, &CHECKOUT_KEYWORDS) {
        Some(AgentKind::Checkout)
    } else if mentions_any(message, &ORDER_KEYWORDS) {
        Some(AgentKind::Orders)
    } else {
        None
    }
}

/// Dispatches free text to one of the four agent logics. Stands in for the
/// demo coordinator that fanned messages out to separate services; here the
/// agents share one process and one store handle.
pub struct Router {
    search: SearchAgent,
    cart: CartAgent,
    checkout: CheckoutAgent,
    orders: OrderAgent,
    store: Arc<dyn StateStore>,
}

impl Router {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn StateStore>) -> Self {
        Self {
            search: SearchAgent::new(Arc::clone(&catalog)),
            cart: CartAgent::new(catalog, Arc::clone(&store)),
            checkout: CheckoutAgent::new(Arc::clone(&store)),
            orders: OrderAgent::new(Arc::clone(&store)),
            store,
        }
    }

    /// Current cart contents for displaying alongside a reply.
    pub async fn cart_snapshot(&self, session: &SessionId) -> Result<Cart, ApplicationError> {
        Ok(self.store.cart(session).await.map_err(store_failure)?.cart)
    }

    pub async fn dispatch(
        &self,
        session: &SessionId,
        message: &str,
    ) -> Result<String, ApplicationError> {
        let Some(kind) = classify(message) else {
            return Ok(HELP_REPLY.to_string());
        };

        let agent: &dyn Agent = match kind {
            AgentKind::Search => &self.search,
            AgentKind::Cart => &self.cart,
            AgentKind::Checkout => &self.checkout,
            AgentKind::Orders => &self.orders,
        };

        tracing::info!(
            event_name = "router.dispatch",
            session_id = %session,
            agent = agent.name(),
            "routing message"
        );

        agent.handle(session, message).await
    }
}
