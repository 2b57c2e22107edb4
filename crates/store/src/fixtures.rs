//! Demo fixtures: pre-seeds the stock counter for every catalog product so a
//! fresh database starts from known inventory instead of lazily initializing
//! on first checkout.

use shoptalk_core::catalog::Catalog;

use crate::state::{stock_key, StoreError};
use crate::DbPool;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub seeded: usize,
    pub skipped: usize,
}

/// Inserts `stock:{product_id}` rows at base stock for every product, leaving
/// counters that already exist untouched.
pub async fn seed_base_stock(pool: &DbPool, catalog: &Catalog) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    for product in catalog.products() {
        let result = sqlx::query(
            "INSERT INTO state (key, value, version) VALUES (?, ?, 1)
             ON CONFLICT(key) DO NOTHING",
        )
        .bind(stock_key(&product.id))
        .bind(product.base_stock.to_string())
        .execute(pool)
        .await?;

        if result.rows_affected() == 1 {
            report.seeded += 1;
        } else {
            report.skipped += 1;
        }
    }

    Ok(report)
}

/// Confirms a stock counter row exists for every catalog product.
pub async fn verify_seed(pool: &DbPool, catalog: &Catalog) -> Result<bool, StoreError> {
    for product in catalog.products() {
        let present: Option<String> = sqlx::query_scalar("SELECT value FROM state WHERE key = ?")
            .bind(stock_key(&product.id))
            .fetch_optional(pool)
            .await?;
        if present.is_none() {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use shoptalk_core::catalog::Catalog;

    use crate::{connect_with_settings, migrations};

    use super::{seed_base_stock, verify_seed};

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        let catalog = Catalog::demo();

        let first = seed_base_stock(&pool, &catalog).await.expect("first seed");
        assert_eq!(first.seeded, catalog.products().len());
        assert_eq!(first.skipped, 0);

        let second = seed_base_stock(&pool, &catalog).await.expect("second seed");
        assert_eq!(second.seeded, 0);
        assert_eq!(second.skipped, catalog.products().len());

        assert!(verify_seed(&pool, &catalog).await.expect("verify"));
    }
}
