use motofleet_db::{connect_with_config, migrations, DemoCatalog};

use crate::commands::{load_config, runtime, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seeded = DemoCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoCatalog::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<Vec<(&'static str, i64)>, (&'static str, String, u8)> =
            if verification.all_present {
                Ok(seeded.tables)
            } else {
                let failed = verification
                    .checks
                    .iter()
                    .filter_map(|(check, passed)| (!passed).then_some(*check))
                    .collect::<Vec<_>>();
                Err(("seed_verification", verification_failure_message(&failed), 6u8))
            };

        pool.close().await;
        run_result
    });

    match result {
        Ok(tables) => CommandResult::success("seed", summary_message(&tables)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary_message(tables: &[(&'static str, i64)]) -> String {
    let counts =
        tables.iter().map(|(table, rows)| format!("{table}={rows}")).collect::<Vec<_>>();
    format!("demo catalog loaded and verified: {}", counts.join(", "))
}

fn verification_failure_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "demo catalog failed to load".to_string()
    } else {
        format!("demo catalog verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::{summary_message, verification_failure_message};

    #[test]
    fn verification_error_message_targets_failed_checks() {
        assert_eq!(
            verification_failure_message(&["price_list", "group-price-list"]),
            "demo catalog verification failed for checks: price_list, group-price-list"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(verification_failure_message(&[]), "demo catalog failed to load");
    }

    #[test]
    fn summary_lists_row_counts_in_seed_order() {
        assert_eq!(
            summary_message(&[("part", 6), ("price_list", 3)]),
            "demo catalog loaded and verified: part=6, price_list=3"
        );
    }
}
