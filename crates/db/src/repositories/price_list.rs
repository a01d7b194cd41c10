use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use motofleet_core::domain::{
    part::PartId,
    price_list::{PriceList, PriceListId, PriceListItem},
    ValidityWindow,
};
use motofleet_core::errors::StoreError;
use motofleet_core::pricing::store::PriceListStore;

use super::{
    count_column, decimal_column, flag_column, optional_decimal_column, optional_timestamp_column,
    RepositoryError, SqlPricingStore,
};

const PRICE_LIST_COLUMNS: &str =
    "id, code, name, global_discount_pct, auto_calculate, auto_markup";

impl SqlPricingStore {
    async fn load_list_by_code(&self, code: &str) -> Result<Option<PriceList>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRICE_LIST_COLUMNS} FROM price_list WHERE code = ?"))
            .bind(code)
            .fetch_optional(self.pool())
            .await?;

        row.map(|r| price_list_from_row(&r)).transpose()
    }

    async fn load_list_by_id(&self, id: PriceListId) -> Result<Option<PriceList>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRICE_LIST_COLUMNS} FROM price_list WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(self.pool())
            .await?;

        row.map(|r| price_list_from_row(&r)).transpose()
    }

    async fn load_list_items(
        &self,
        list_id: PriceListId,
        part_id: PartId,
    ) -> Result<Vec<PriceListItem>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, price_list_id, part_id, price, min_quantity, valid_from, valid_to
            FROM price_list_item
            WHERE price_list_id = ? AND part_id = ?
            ORDER BY id
            "#,
        )
        .bind(list_id.0)
        .bind(part_id.0)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(price_list_item_from_row).collect()
    }
}

#[async_trait]
impl PriceListStore for SqlPricingStore {
    async fn find_list_by_code(&self, code: &str) -> Result<Option<PriceList>, StoreError> {
        Ok(self.load_list_by_code(code).await?)
    }

    async fn find_list_by_id(&self, id: PriceListId) -> Result<Option<PriceList>, StoreError> {
        Ok(self.load_list_by_id(id).await?)
    }

    async fn list_items(
        &self,
        list_id: PriceListId,
        part_id: PartId,
    ) -> Result<Vec<PriceListItem>, StoreError> {
        Ok(self.load_list_items(list_id, part_id).await?)
    }
}

fn price_list_from_row(row: &SqliteRow) -> Result<PriceList, RepositoryError> {
    Ok(PriceList {
        id: PriceListId(row.try_get("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        global_discount_pct: optional_decimal_column(row, "global_discount_pct")?,
        auto_calculate: flag_column(row, "auto_calculate")?,
        auto_markup: optional_decimal_column(row, "auto_markup")?,
    })
}

fn price_list_item_from_row(row: &SqliteRow) -> Result<PriceListItem, RepositoryError> {
    let id: i64 = row.try_get("id")?;

    Ok(PriceListItem {
        id,
        price_list_id: PriceListId(row.try_get("price_list_id")?),
        part_id: PartId(row.try_get("part_id")?),
        price: decimal_column(row, "price")?,
        min_quantity: count_column(row, "min_quantity", "price_list_item", id)?,
        validity: ValidityWindow::between(
            optional_timestamp_column(row, "valid_from")?,
            optional_timestamp_column(row, "valid_to")?,
        ),
    })
}
