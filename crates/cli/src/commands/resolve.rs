use std::sync::Arc;

use motofleet_core::{
    CustomerId, PartId, PriceRequest, PriceResolutionService, PriceResolver, PricingError,
};
use motofleet_db::{connect_with_config, SqlPricingStore};

use crate::commands::{load_config, runtime, CommandResult};

#[derive(Debug, Clone)]
pub struct ResolveArgs {
    pub part: i64,
    pub customer: Option<i64>,
    pub list: Option<String>,
    pub quantity: u32,
}

pub fn run(args: ResolveArgs) -> CommandResult {
    let config = match load_config("resolve") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("resolve") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let request = PriceRequest {
        part_id: PartId(args.part),
        customer_id: args.customer.map(CustomerId),
        list_code: args.list,
        quantity: args.quantity,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        let service = PriceResolutionService::new(
            Arc::new(SqlPricingStore::new(pool.clone())),
            config.pricing.clone(),
        );

        let outcome = service
            .resolve_price(request)
            .await
            .map_err(|error| (error_class(&error), error.to_string(), 7u8));
        pool.close().await;
        outcome
    });

    match result {
        Ok(resolution) => {
            let message = format!(
                "part {} resolved to {} on list `{}` ({}, alert {})",
                resolution.part_id,
                resolution.final_price,
                resolution.applied_list_code,
                resolution.resolution_method.as_str(),
                resolution.alert_level.as_str()
            );
            match serde_json::to_value(&resolution) {
                Ok(value) => CommandResult::success_with("resolve", message, Some(value)),
                Err(error) => {
                    CommandResult::failure("resolve", "serialization", error.to_string(), 8)
                }
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("resolve", error_class, message, exit_code)
        }
    }
}

fn error_class(error: &PricingError) -> &'static str {
    match error {
        PricingError::PartNotFound(_) => "part_not_found",
        PricingError::ListNotFound { .. } => "list_not_found",
        PricingError::NoDefaultList { .. } => "no_default_list",
        PricingError::InvalidInput(_) => "invalid_input",
        PricingError::InvalidConfiguration(_) => "invalid_configuration",
        PricingError::Store(_) => "store",
    }
}
