//! Contract suite run against both state store implementations, including
//! the concurrency properties that make the store the one correctness-bearing
//! component: last-unit reservations never double-succeed and order ids never
//! collide.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::TempDir;

use shoptalk_core::catalog::Catalog;
use shoptalk_core::domain::cart::Cart;
use shoptalk_core::domain::order::{OrderDraft, OrderId, OrderStatus, PaymentMethod};
use shoptalk_core::domain::product::{Product, ProductId};
use shoptalk_core::domain::session::SessionId;
use shoptalk_store::{
    connect_with_settings, migrations, InMemoryStateStore, SqlStateStore, StateStore,
};

fn session() -> SessionId {
    SessionId("default".to_string())
}

fn single_unit_catalog() -> Catalog {
    Catalog::new(vec![Product {
        id: ProductId("LAST001".to_string()),
        name: "Last Unit".to_string(),
        description: "Only one left".to_string(),
        price: Decimal::new(999, 2),
        base_stock: 1,
        category: "Test".to_string(),
    }])
}

async fn sql_store(catalog: Arc<Catalog>) -> (TempDir, Arc<dyn StateStore>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("state.db").display());
    let pool = connect_with_settings(&url, 5, 5).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");
    (dir, Arc::new(SqlStateStore::new(pool, catalog)))
}

fn memory_store(catalog: Arc<Catalog>) -> Arc<dyn StateStore> {
    Arc::new(InMemoryStateStore::new(catalog))
}

fn assert_order_id_format(id: &OrderId) {
    let raw = id.as_str();
    let rest = raw.strip_prefix("ORD-").unwrap_or_else(|| panic!("bad prefix: {raw}"));
    let (date, sequence) = rest.split_once('-').unwrap_or_else(|| panic!("bad shape: {raw}"));
    assert_eq!(date.len(), 8, "date part of {raw}");
    assert!(date.chars().all(|c| c.is_ascii_digit()), "date digits of {raw}");
    assert!(sequence.len() >= 4, "sequence pad of {raw}");
    assert!(sequence.chars().all(|c| c.is_ascii_digit()), "sequence digits of {raw}");
}

async fn cart_round_trip(store: Arc<dyn StateStore>, catalog: &Catalog) {
    let session = session();
    let yoga_mat = catalog.find(&ProductId("SPORT001".to_string())).expect("SPORT001");

    let mut versioned = store.cart(&session).await.expect("read empty");
    assert!(versioned.cart.is_empty());
    assert_eq!(versioned.version, 0);

    versioned.cart.add_product(yoga_mat, 2).expect("add");
    assert!(store.save_cart(&session, &versioned.cart, 0).await.expect("save"));

    let reloaded = store.cart(&session).await.expect("reload");
    assert_eq!(reloaded.cart, versioned.cart);
    assert_eq!(reloaded.version, 1);
    assert_eq!(reloaded.cart.total, Decimal::new(4998, 2));

    store.clear_cart(&session).await.expect("clear");
    let cleared = store.cart(&session).await.expect("read cleared");
    assert!(cleared.cart.is_empty());
    assert_eq!(cleared.version, 0);
}

async fn reservation_reflects_exact_decrement(store: Arc<dyn StateStore>) {
    let yoga_mat = ProductId("SPORT001".to_string());

    assert!(store.reserve_stock(&yoga_mat, 2).await.expect("reserve"));
    assert_eq!(store.stock(&yoga_mat).await.expect("stock"), 73);

    assert!(!store.reserve_stock(&yoga_mat, 100).await.expect("over-reserve"));
    assert_eq!(store.stock(&yoga_mat).await.expect("stock"), 73);

    store.release_stock(&yoga_mat, 2).await.expect("release");
    assert_eq!(store.stock(&yoga_mat).await.expect("stock"), 75);
}

async fn concurrent_last_unit_single_winner(store: Arc<dyn StateStore>) {
    let product = ProductId("LAST001".to_string());
    let mut handles = Vec::new();

    for _ in 0..8 {
        let store = Arc::clone(&store);
        let product = product.clone();
        handles.push(tokio::spawn(
            async move { store.reserve_stock(&product, 1).await.expect("reserve") },
        ));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("join") {
            successes += 1;
        }
    }

    assert_eq!(successes, 1, "exactly one reservation may win the last unit");
    assert_eq!(store.stock(&product).await.expect("stock"), 0);
}

async fn concurrent_order_ids_are_distinct(store: Arc<dyn StateStore>) {
    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move { store.next_order_id().await.expect("order id") }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let id = handle.await.expect("join");
        assert_order_id_format(&id);
        assert!(ids.insert(id.as_str().to_string()), "duplicate order id");
    }
    assert_eq!(ids.len(), 20);
}

async fn order_create_and_lookup(store: Arc<dyn StateStore>, catalog: &Catalog) {
    let yoga_mat = catalog.find(&ProductId("SPORT001".to_string())).expect("SPORT001");
    let mut cart = Cart::default();
    cart.add_product(yoga_mat, 2).expect("add");

    let draft = OrderDraft {
        items: cart.items.clone(),
        total: cart.total,
        payment_method: PaymentMethod::CreditCard,
        status: OrderStatus::Pending,
    };
    let order = store.create_order(draft).await.expect("create order");

    assert_order_id_format(&order.order_id);
    assert_eq!(order.total, Decimal::new(4998, 2));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.created_at, order.updated_at);

    let found = store.order(&order.order_id).await.expect("lookup");
    assert_eq!(found, Some(order));

    let missing = store.order(&OrderId("ORD-99999999-9999".to_string())).await.expect("lookup");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn sql_cart_round_trip() {
    let catalog = Arc::new(Catalog::demo());
    let (_dir, store) = sql_store(Arc::clone(&catalog)).await;
    cart_round_trip(store, &catalog).await;
}

#[tokio::test]
async fn memory_cart_round_trip() {
    let catalog = Arc::new(Catalog::demo());
    let store = memory_store(Arc::clone(&catalog));
    cart_round_trip(store, &catalog).await;
}

#[tokio::test]
async fn sql_reservation_reflects_exact_decrement() {
    let (_dir, store) = sql_store(Arc::new(Catalog::demo())).await;
    reservation_reflects_exact_decrement(store).await;
}

#[tokio::test]
async fn memory_reservation_reflects_exact_decrement() {
    let store = memory_store(Arc::new(Catalog::demo()));
    reservation_reflects_exact_decrement(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sql_concurrent_last_unit_single_winner() {
    let (_dir, store) = sql_store(Arc::new(single_unit_catalog())).await;
    concurrent_last_unit_single_winner(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_last_unit_single_winner() {
    let store = memory_store(Arc::new(single_unit_catalog()));
    concurrent_last_unit_single_winner(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sql_concurrent_order_ids_are_distinct() {
    let (_dir, store) = sql_store(Arc::new(Catalog::demo())).await;
    concurrent_order_ids_are_distinct(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_order_ids_are_distinct() {
    let store = memory_store(Arc::new(Catalog::demo()));
    concurrent_order_ids_are_distinct(store).await;
}

#[tokio::test]
async fn sql_order_create_and_lookup() {
    let catalog = Arc::new(Catalog::demo());
    let (_dir, store) = sql_store(Arc::clone(&catalog)).await;
    order_create_and_lookup(store, &catalog).await;
}

#[tokio::test]
async fn memory_order_create_and_lookup() {
    let catalog = Arc::new(Catalog::demo());
    let store = memory_store(Arc::clone(&catalog));
    order_create_and_lookup(store, &catalog).await;
}

#[tokio::test]
async fn sql_stale_cart_version_is_rejected() {
    let catalog = Arc::new(Catalog::demo());
    let (_dir, store) = sql_store(Arc::clone(&catalog)).await;
    let session = session();
    let cart = Cart::default();

    assert!(store.save_cart(&session, &cart, 0).await.expect("insert"));
    assert!(!store.save_cart(&session, &cart, 0).await.expect("stale insert"));
    assert!(store.save_cart(&session, &cart, 1).await.expect("versioned update"));
    assert!(!store.save_cart(&session, &cart, 1).await.expect("stale update"));
}
