use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use motofleet_core::domain::{
    markup::{MarkupRule, RoundingMode},
    part::CategoryCode,
};
use motofleet_core::errors::StoreError;
use motofleet_core::pricing::store::MarkupRuleStore;

use super::{
    decimal_column, flag_column, optional_decimal_column, parse_timestamp, RepositoryError,
    SqlPricingStore,
};

impl SqlPricingStore {
    async fn load_active_markup_rules(
        &self,
        category: Option<&CategoryCode>,
    ) -> Result<Vec<MarkupRule>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, band_from, band_to, multiplier, rounding, priority, active,
                   created_at
            FROM markup_rule
            WHERE active = 1 AND (category IS NULL OR category = ?)
            ORDER BY id
            "#,
        )
        .bind(category.map(CategoryCode::as_str))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(markup_rule_from_row).collect()
    }
}

#[async_trait]
impl MarkupRuleStore for SqlPricingStore {
    async fn active_markup_rules(
        &self,
        category: Option<&CategoryCode>,
    ) -> Result<Vec<MarkupRule>, StoreError> {
        Ok(self.load_active_markup_rules(category).await?)
    }
}

fn markup_rule_from_row(row: &SqliteRow) -> Result<MarkupRule, RepositoryError> {
    let id: i64 = row.try_get("id")?;
    let category: Option<String> = row.try_get("category")?;
    let rounding: String = row.try_get("rounding")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(MarkupRule {
        id,
        category: category.map(CategoryCode),
        band_from: optional_decimal_column(row, "band_from")?,
        band_to: optional_decimal_column(row, "band_to")?,
        multiplier: decimal_column(row, "multiplier")?,
        rounding: rounding.parse::<RoundingMode>().map_err(|message| {
            RepositoryError::Decode(format!("markup_rule {id}: {message}"))
        })?,
        priority: row.try_get("priority")?,
        active: flag_column(row, "active")?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}
