use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use motofleet_core::domain::part::{CategoryCode, CategoryConfig, Part, PartId};
use motofleet_core::errors::StoreError;
use motofleet_core::pricing::store::{CategoryConfigStore, PartStore};

use super::{decimal_column, optional_decimal_column, RepositoryError, SqlPricingStore};

impl SqlPricingStore {
    async fn load_part(&self, id: PartId) -> Result<Option<Part>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, code, name, category, landed_cost, foreign_cost, list_price,
                   margin_floor, margin_target
            FROM part
            WHERE id = ?
            "#,
        )
        .bind(id.0)
        .fetch_optional(self.pool())
        .await?;

        row.map(|r| part_from_row(&r)).transpose()
    }

    async fn load_category_config(
        &self,
        category: &CategoryCode,
    ) -> Result<Option<CategoryConfig>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT category, markup_default, margin_floor, margin_target
            FROM part_category_config
            WHERE category = ?
            "#,
        )
        .bind(category.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.map(|r| category_config_from_row(&r)).transpose()
    }
}

#[async_trait]
impl PartStore for SqlPricingStore {
    async fn find_part(&self, id: PartId) -> Result<Option<Part>, StoreError> {
        Ok(self.load_part(id).await?)
    }
}

#[async_trait]
impl CategoryConfigStore for SqlPricingStore {
    async fn category_config(
        &self,
        category: &CategoryCode,
    ) -> Result<Option<CategoryConfig>, StoreError> {
        Ok(self.load_category_config(category).await?)
    }
}

fn part_from_row(row: &SqliteRow) -> Result<Part, RepositoryError> {
    let category: Option<String> = row.try_get("category")?;

    Ok(Part {
        id: PartId(row.try_get("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        category: category.filter(|code| !code.trim().is_empty()).map(CategoryCode),
        landed_cost: decimal_column(row, "landed_cost")?,
        foreign_cost: decimal_column(row, "foreign_cost")?,
        list_price: decimal_column(row, "list_price")?,
        margin_floor: optional_decimal_column(row, "margin_floor")?,
        margin_target: optional_decimal_column(row, "margin_target")?,
    })
}

fn category_config_from_row(row: &SqliteRow) -> Result<CategoryConfig, RepositoryError> {
    Ok(CategoryConfig {
        category: CategoryCode(row.try_get("category")?),
        markup_default: optional_decimal_column(row, "markup_default")?,
        margin_floor: optional_decimal_column(row, "margin_floor")?,
        margin_target: optional_decimal_column(row, "margin_target")?,
    })
}

#[cfg(test)]
mod tests {
    use motofleet_core::domain::part::{CategoryCode, PartId};
    use motofleet_core::errors::StoreError;
    use motofleet_core::pricing::store::{CategoryConfigStore, PartStore};
    use rust_decimal::Decimal;

    use crate::repositories::test_support::{exec, setup_pool};
    use crate::repositories::SqlPricingStore;

    #[tokio::test]
    async fn part_row_decodes_costs_and_overrides() {
        let pool = setup_pool().await;
        exec(
            &pool,
            "INSERT INTO part (id, code, name, category, landed_cost, foreign_cost, list_price, margin_floor)
             VALUES (10, 'PAS-100', 'Brake pads', 'FRENOS', '1000.50', '8.25', '0', '0.20')",
        )
        .await;
        let store = SqlPricingStore::new(pool.clone());

        let part = store.find_part(PartId(10)).await.expect("query").expect("part exists");

        assert_eq!(part.code, "PAS-100");
        assert_eq!(part.category, Some(CategoryCode("FRENOS".to_string())));
        assert_eq!(part.landed_cost, Decimal::new(100050, 2));
        assert_eq!(part.margin_floor, Some(Decimal::new(20, 2)));
        assert_eq!(part.margin_target, None);
        assert!(store.find_part(PartId(11)).await.expect("query").is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn malformed_cost_is_a_decode_error() {
        let pool = setup_pool().await;
        exec(
            &pool,
            "INSERT INTO part (id, code, name, landed_cost) VALUES (1, 'BAD-1', 'Broken', 'n/a')",
        )
        .await;
        let store = SqlPricingStore::new(pool.clone());

        let error = store.find_part(PartId(1)).await.unwrap_err();

        assert!(matches!(error, StoreError::Decode(ref message) if message.contains("landed_cost")));
        pool.close().await;
    }

    #[tokio::test]
    async fn category_config_lookup_by_code() {
        let pool = setup_pool().await;
        exec(
            &pool,
            "INSERT INTO part_category_config (category, markup_default, margin_floor)
             VALUES ('MOTOR', '1.8', '0.18')",
        )
        .await;
        let store = SqlPricingStore::new(pool.clone());

        let config = store
            .category_config(&CategoryCode("MOTOR".to_string()))
            .await
            .expect("query")
            .expect("config exists");

        assert_eq!(config.markup_default, Some(Decimal::new(18, 1)));
        assert_eq!(config.margin_target, None);
        assert!(store
            .category_config(&CategoryCode("FRENOS".to_string()))
            .await
            .expect("query")
            .is_none());

        pool.close().await;
    }
}
