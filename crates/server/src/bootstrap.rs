use std::sync::Arc;

use motofleet_core::config::{AppConfig, ConfigError};
use motofleet_core::{PriceResolutionService, PriceResolver, PricingStores};
use motofleet_db::{connect_with_config, migrations, DbPool, SqlPricingStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub resolver: Arc<dyn PriceResolver>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        policy_version = %config.pricing.version,
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let stores: Arc<dyn PricingStores> = Arc::new(SqlPricingStore::new(db_pool.clone()));
    let resolver: Arc<dyn PriceResolver> =
        Arc::new(PriceResolutionService::new(stores, config.pricing.clone()));

    Ok(Application { config, db_pool, resolver })
}
