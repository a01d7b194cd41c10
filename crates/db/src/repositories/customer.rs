use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use motofleet_core::domain::{
    customer::{CustomerGroup, CustomerId, RentalContract},
    price_list::PriceListId,
};
use motofleet_core::errors::StoreError;
use motofleet_core::pricing::store::CustomerDirectory;

use super::{decimal_column, flag_column, parse_timestamp, RepositoryError, SqlPricingStore};

impl SqlPricingStore {
    async fn load_group_memberships(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CustomerGroup>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT g.id, g.name, g.price_list_id
            FROM customer_group g
            INNER JOIN customer_group_member m ON m.group_id = g.id
            WHERE m.customer_id = ?
            ORDER BY g.id ASC
            "#,
        )
        .bind(customer_id.0)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(group_from_row).collect()
    }

    async fn load_active_contract(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<RentalContract>, RepositoryError> {
        // Offsets in stored text make lexical ORDER BY unreliable, so compare parsed instants.
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, period_amount, started_at, active
            FROM rental_contract
            WHERE customer_id = ? AND active = 1
            "#,
        )
        .bind(customer_id.0)
        .fetch_all(self.pool())
        .await?;

        let mut latest: Option<RentalContract> = None;
        for row in &rows {
            let contract = contract_from_row(row)?;
            let newer = latest.as_ref().map_or(true, |current| {
                (contract.started_at, contract.id) > (current.started_at, current.id)
            });
            if newer {
                latest = Some(contract);
            }
        }
        Ok(latest)
    }

    async fn load_earliest_contract_start(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        // Offsets in stored text make lexical MIN unreliable, so compare parsed instants.
        let rows = sqlx::query("SELECT started_at FROM rental_contract WHERE customer_id = ?")
            .bind(customer_id.0)
            .fetch_all(self.pool())
            .await?;

        let mut earliest: Option<DateTime<Utc>> = None;
        for row in &rows {
            let raw: String = row.try_get("started_at")?;
            let started_at = parse_timestamp("started_at", &raw)?;
            earliest = Some(earliest.map_or(started_at, |current| current.min(started_at)));
        }
        Ok(earliest)
    }
}

#[async_trait]
impl CustomerDirectory for SqlPricingStore {
    async fn group_memberships(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CustomerGroup>, StoreError> {
        Ok(self.load_group_memberships(customer_id).await?)
    }

    async fn active_contract(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<RentalContract>, StoreError> {
        Ok(self.load_active_contract(customer_id).await?)
    }

    async fn earliest_contract_start(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.load_earliest_contract_start(customer_id).await?)
    }
}

fn group_from_row(row: &SqliteRow) -> Result<CustomerGroup, RepositoryError> {
    let price_list_id: Option<i64> = row.try_get("price_list_id")?;

    Ok(CustomerGroup {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price_list_id: price_list_id.map(PriceListId),
    })
}

fn contract_from_row(row: &SqliteRow) -> Result<RentalContract, RepositoryError> {
    let started_at: String = row.try_get("started_at")?;

    Ok(RentalContract {
        id: row.try_get("id")?,
        customer_id: CustomerId(row.try_get("customer_id")?),
        period_amount: decimal_column(row, "period_amount")?,
        started_at: parse_timestamp("started_at", &started_at)?,
        active: flag_column(row, "active")?,
    })
}
