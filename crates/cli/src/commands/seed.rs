use crate::commands::CommandResult;
use shoptalk_core::catalog::Catalog;
use shoptalk_core::config::{AppConfig, LoadOptions};
use shoptalk_store::{connect, migrations, seed_base_stock, verify_seed, SeedReport};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let catalog = Catalog::demo();
        let report = seed_base_stock(&pool, &catalog)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verified = verify_seed(&pool, &catalog)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<SeedReport, (&'static str, String, u8)> = if verified {
            Ok(report)
        } else {
            Err((
                "seed_verification",
                "one or more stock counters are missing after seeding".to_string(),
                6u8,
            ))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(report) => CommandResult::success("seed", seed_message(&report)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn seed_message(report: &SeedReport) -> String {
    format!(
        "seeded {} stock counter(s), left {} existing counter(s) untouched",
        report.seeded, report.skipped
    )
}

#[cfg(test)]
mod tests {
    use shoptalk_store::SeedReport;

    use super::seed_message;

    #[test]
    fn seed_message_reports_both_counts() {
        let report = SeedReport { seeded: 10, skipped: 0 };
        assert_eq!(seed_message(&report), "seeded 10 stock counter(s), left 0 existing counter(s) untouched");

        let rerun = SeedReport { seeded: 0, skipped: 10 };
        assert_eq!(seed_message(&rerun), "seeded 0 stock counter(s), left 10 existing counter(s) untouched");
    }
}
