//! End-to-end agent flows over the in-memory state store: the add/view/
//! checkout/lookup conversation paths and the inventory edge cases around
//! them.

use std::sync::Arc;

use rust_decimal::Decimal;

use shoptalk_agent::cart::AddOutcome;
use shoptalk_agent::{CartAgent, CheckoutAgent, Router};
use shoptalk_core::catalog::Catalog;
use shoptalk_core::domain::product::{Product, ProductId};
use shoptalk_core::domain::session::SessionId;
use shoptalk_store::{InMemoryStateStore, StateStore};

fn demo_setup() -> (Router, Arc<dyn StateStore>) {
    let catalog = Arc::new(Catalog::demo());
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new(Arc::clone(&catalog)));
    (Router::new(catalog, Arc::clone(&store)), store)
}

fn test_product(id: &str, price_cents: i64, base_stock: i64) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: format!("{id} item"),
        description: String::new(),
        price: Decimal::new(price_cents, 2),
        base_stock,
        category: "Test".to_string(),
    }
}

fn session() -> SessionId {
    SessionId("default".to_string())
}

#[tokio::test]
async fn add_twice_then_checkout_worked_example() {
    let (router, store) = demo_setup();
    let session = session();
    let yoga_mat = ProductId("SPORT001".to_string());

    let reply = router.dispatch(&session, "add SPORT001 to my cart").await.expect("first add");
    assert_eq!(reply, "Added Yoga Mat (6mm) to cart. Total: $24.99");

    let reply = router.dispatch(&session, "add SPORT001 again").await.expect("second add");
    assert_eq!(reply, "Added Yoga Mat (6mm) to cart. Total: $49.98");

    let cart = store.cart(&session).await.expect("cart").cart;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].subtotal, Decimal::new(4998, 2));
    assert_eq!(cart.total, Decimal::new(4998, 2));

    let reply = router.dispatch(&session, "checkout please").await.expect("checkout");
    assert!(reply.starts_with("Checkout successful! Order ID: **ORD-"), "reply: {reply}");
    assert!(reply.ends_with("Total: $49.98."), "reply: {reply}");

    // Stock decremented by the carted quantity, cart reset to empty.
    assert_eq!(store.stock(&yoga_mat).await.expect("stock"), 73);
    assert!(store.cart(&session).await.expect("cart").cart.is_empty());

    // The confirmation's order id resolves to a retrievable pending order.
    let order_id = reply
        .split("**")
        .nth(1)
        .expect("order id between markers")
        .to_string();
    let lookup = router
        .dispatch(&session, &format!("what is the status of {order_id}?"))
        .await
        .expect("lookup");
    assert_eq!(lookup, format!("Order **{order_id}** is currently **pending**. Total: $49.98."));
}

#[tokio::test]
async fn add_item_with_zero_stock_leaves_cart_unchanged() {
    let catalog = Arc::new(Catalog::new(vec![test_product("ELEC901", 1999, 0)]));
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new(Arc::clone(&catalog)));
    let router = Router::new(catalog, Arc::clone(&store));
    let session = session();

    let reply = router.dispatch(&session, "add ELEC901").await.expect("add");
    assert_eq!(reply, "Insufficient stock.");
    assert!(store.cart(&session).await.expect("cart").cart.is_empty());
}

#[tokio::test]
async fn empty_cart_checkout_mutates_nothing() {
    let (router, store) = demo_setup();
    let session = session();
    let yoga_mat = ProductId("SPORT001".to_string());

    let reply = router.dispatch(&session, "checkout").await.expect("checkout");
    assert_eq!(reply, "Your cart is empty. Nothing to checkout.");

    assert_eq!(store.stock(&yoga_mat).await.expect("stock"), 75);
    assert!(store.cart(&session).await.expect("cart").cart.is_empty());
}

#[tokio::test]
async fn failed_line_releases_earlier_reservations() {
    // Plenty of A, a single unit of B. The cart legitimately holds two of B
    // because add-to-cart only checks availability, never reserves.
    let catalog = Arc::new(Catalog::new(vec![
        test_product("HOME901", 1000, 5),
        test_product("HOME902", 2000, 1),
    ]));
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new(Arc::clone(&catalog)));
    let cart_agent = CartAgent::new(Arc::clone(&catalog), Arc::clone(&store));
    let checkout = CheckoutAgent::new(Arc::clone(&store));
    let session = session();

    let a = ProductId("HOME901".to_string());
    let b = ProductId("HOME902".to_string());

    assert!(matches!(
        cart_agent.add_item(&session, &a, 2).await.expect("add a"),
        AddOutcome::Added { .. }
    ));
    for _ in 0..2 {
        assert!(matches!(
            cart_agent.add_item(&session, &b, 1).await.expect("add b"),
            AddOutcome::Added { .. }
        ));
    }

    let reply = checkout.checkout(&session).await.expect("checkout");
    assert_eq!(reply, "Sorry, HOME902 item is no longer in stock.");

    // A's reservation was compensated; B was never decremented.
    assert_eq!(store.stock(&a).await.expect("stock a"), 5);
    assert_eq!(store.stock(&b).await.expect("stock b"), 1);

    // The cart survives a failed checkout for another attempt.
    assert!(!store.cart(&session).await.expect("cart").cart.is_empty());
}

#[tokio::test]
async fn two_sessions_can_cart_the_last_unit_but_one_checkout_wins() {
    let catalog = Arc::new(Catalog::new(vec![test_product("SPORT901", 3500, 1)]));
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new(Arc::clone(&catalog)));
    let router = Router::new(catalog, Arc::clone(&store));

    let first = SessionId("alice".to_string());
    let second = SessionId("bob".to_string());

    // Both adds pass the availability check; nothing is reserved yet.
    let reply = router.dispatch(&first, "add SPORT901").await.expect("first add");
    assert!(reply.starts_with("Added"));
    let reply = router.dispatch(&second, "add SPORT901").await.expect("second add");
    assert!(reply.starts_with("Added"));

    let winner = router.dispatch(&first, "checkout").await.expect("first checkout");
    assert!(winner.starts_with("Checkout successful!"), "reply: {winner}");

    let loser = router.dispatch(&second, "checkout").await.expect("second checkout");
    assert_eq!(loser, "Sorry, SPORT901 item is no longer in stock.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_to_one_session_all_land_in_the_cart() {
    let catalog = Arc::new(Catalog::demo());
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new(Arc::clone(&catalog)));
    let cart_agent = Arc::new(CartAgent::new(catalog, Arc::clone(&store)));
    let session = session();
    let yoga_mat = ProductId("SPORT001".to_string());

    // Worst case, a writer loses once per competitor before its save lands,
    // so 5 writers stay within the bounded retry budget.
    let mut handles = Vec::new();
    for _ in 0..5 {
        let cart_agent = Arc::clone(&cart_agent);
        let session = session.clone();
        let yoga_mat = yoga_mat.clone();
        handles.push(tokio::spawn(async move {
            cart_agent.add_item(&session, &yoga_mat, 1).await.expect("add")
        }));
    }
    for handle in handles {
        assert!(matches!(handle.await.expect("join"), AddOutcome::Added { .. }));
    }

    // No update was lost: every add is reflected in the one merged line.
    let cart = store.cart(&session).await.expect("cart").cart;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.item_count, 5);
    assert_eq!(cart.total, Decimal::new(12495, 2));
}

#[tokio::test]
async fn order_lookup_handles_missing_and_malformed_ids() {
    let (router, _store) = demo_setup();
    let session = session();

    let reply = router
        .dispatch(&session, "track ORD-99999999-9999")
        .await
        .expect("unknown order");
    assert_eq!(reply, "Order not found.");

    let reply = router.dispatch(&session, "track my order").await.expect("malformed");
    assert_eq!(reply, "Please provide an order ID (e.g. ORD-20260204-0001) to check status.");
}

#[tokio::test]
async fn unclassified_message_gets_help_reply() {
    let (router, _store) = demo_setup();
    let reply = router.dispatch(&session(), "hello there").await.expect("help");
    assert_eq!(
        reply,
        "I can help you search for products, manage your cart, checkout, or track orders."
    );
}
