pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod state;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{seed_base_stock, verify_seed, SeedReport};
pub use state::{InMemoryStateStore, SqlStateStore, StateStore, StoreError, VersionedCart};
