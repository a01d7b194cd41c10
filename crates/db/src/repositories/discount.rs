use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use motofleet_core::domain::{
    discount::{DiscountCondition, DiscountKind, DiscountRule, PlanTier},
    part::CategoryCode,
    ValidityWindow,
};
use motofleet_core::errors::StoreError;
use motofleet_core::pricing::store::DiscountRuleStore;

use super::{
    decimal_column, flag_column, optional_timestamp_column, RepositoryError, SqlPricingStore,
};

impl SqlPricingStore {
    async fn load_active_discount_rules(&self) -> Result<Vec<DiscountRule>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, condition_type, min_quantity, category, plan_tier, min_tenure_months,
                   discount_type, value, accumulable, priority, active, valid_from, valid_to
            FROM discount_rule
            WHERE active = 1
            ORDER BY priority DESC, id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(discount_rule_from_row).collect()
    }
}

#[async_trait]
impl DiscountRuleStore for SqlPricingStore {
    async fn active_discount_rules(&self) -> Result<Vec<DiscountRule>, StoreError> {
        Ok(self.load_active_discount_rules().await?)
    }
}

fn discount_rule_from_row(row: &SqliteRow) -> Result<DiscountRule, RepositoryError> {
    let id: i64 = row.try_get("id")?;
    let discount_type: String = row.try_get("discount_type")?;

    Ok(DiscountRule {
        id,
        name: row.try_get("name")?,
        condition: condition_from_row(row, id)?,
        kind: discount_type
            .parse::<DiscountKind>()
            .map_err(|message| RepositoryError::Decode(format!("discount_rule {id}: {message}")))?,
        value: decimal_column(row, "value")?,
        accumulable: flag_column(row, "accumulable")?,
        priority: row.try_get("priority")?,
        active: flag_column(row, "active")?,
        validity: ValidityWindow::between(
            optional_timestamp_column(row, "valid_from")?,
            optional_timestamp_column(row, "valid_to")?,
        ),
    })
}

/// Unknown condition types and missing parameters are decode errors, never skipped rules.
fn condition_from_row(row: &SqliteRow, id: i64) -> Result<DiscountCondition, RepositoryError> {
    let condition_type: String = row.try_get("condition_type")?;

    match condition_type.trim().to_ascii_uppercase().as_str() {
        "ALWAYS" => Ok(DiscountCondition::Always),
        "QUANTITY" => Ok(DiscountCondition::Quantity {
            min_quantity: required_count(row, id, "min_quantity")?,
        }),
        "CATEGORY" => {
            let category: Option<String> = row.try_get("category")?;
            let category = category
                .filter(|code| !code.trim().is_empty())
                .ok_or_else(|| missing_parameter(id, "category"))?;
            Ok(DiscountCondition::Category { category: CategoryCode(category) })
        }
        "RENTAL_PLAN" => {
            let plan: Option<String> = row.try_get("plan_tier")?;
            let plan = plan.ok_or_else(|| missing_parameter(id, "plan_tier"))?;
            let plan = plan.parse::<PlanTier>().map_err(|message| {
                RepositoryError::Decode(format!("discount_rule {id}: {message}"))
            })?;
            Ok(DiscountCondition::RentalPlan { plan })
        }
        "CUSTOMER_TENURE" => Ok(DiscountCondition::CustomerTenure {
            min_months: required_count(row, id, "min_tenure_months")?,
        }),
        "CUSTOMER_GROUP" => Ok(DiscountCondition::CustomerGroup),
        other => Err(RepositoryError::Decode(format!(
            "discount_rule {id}: unknown condition_type `{other}`"
        ))),
    }
}

fn required_count(row: &SqliteRow, id: i64, column: &str) -> Result<u32, RepositoryError> {
    let raw: Option<i64> = row.try_get(column)?;
    let raw = raw.ok_or_else(|| missing_parameter(id, column))?;
    u32::try_from(raw).map_err(|_| {
        RepositoryError::Decode(format!("discount_rule {id}: {column} must be non-negative"))
    })
}

fn missing_parameter(id: i64, column: &str) -> RepositoryError {
    RepositoryError::Decode(format!("discount_rule {id}: condition requires `{column}`"))
}

#[cfg(test)]
mod tests {
    use motofleet_core::domain::{
        discount::{DiscountCondition, DiscountKind, PlanTier},
        part::CategoryCode,
    };
    use motofleet_core::errors::StoreError;
    use motofleet_core::pricing::store::DiscountRuleStore;
    use rust_decimal::Decimal;

    use crate::repositories::test_support::{exec, setup_pool};
    use crate::repositories::SqlPricingStore;

    #[tokio::test]
    async fn every_condition_type_decodes_into_its_variant() {
        let pool = setup_pool().await;
        exec(
            &pool,
            "INSERT INTO discount_rule (id, name, condition_type, min_quantity, category, plan_tier,
                                        min_tenure_months, discount_type, value, accumulable, priority)
             VALUES (1, 'always', 'ALWAYS', NULL, NULL, NULL, NULL, 'PERCENTAGE', '0.05', 1, 1),
                    (2, 'bulk', 'QUANTITY', 10, NULL, NULL, NULL, 'PERCENTAGE', '0.10', 0, 6),
                    (3, 'brakes', 'CATEGORY', NULL, 'FRENOS', NULL, NULL, 'FIXED_AMOUNT', '150', 0, 5),
                    (4, 'vip', 'RENTAL_PLAN', NULL, NULL, 'VIP', NULL, 'PERCENTAGE', '0.12', 0, 4),
                    (5, 'loyal', 'CUSTOMER_TENURE', NULL, NULL, NULL, 24, 'PERCENTAGE', '0.03', 1, 3),
                    (6, 'group', 'CUSTOMER_GROUP', NULL, NULL, NULL, NULL, 'PERCENTAGE', '0.02', 1, 2)",
        )
        .await;
        exec(
            &pool,
            "INSERT INTO discount_rule (id, name, condition_type, discount_type, value, active)
             VALUES (7, 'retired', 'ALWAYS', 'PERCENTAGE', '0.50', 0)",
        )
        .await;
        let store = SqlPricingStore::new(pool.clone());

        let rules = store.active_discount_rules().await.expect("query");

        let conditions: Vec<DiscountCondition> =
            rules.iter().map(|rule| rule.condition.clone()).collect();
        assert_eq!(
            conditions,
            vec![
                DiscountCondition::Quantity { min_quantity: 10 },
                DiscountCondition::Category { category: CategoryCode("FRENOS".to_string()) },
                DiscountCondition::RentalPlan { plan: PlanTier::Vip },
                DiscountCondition::CustomerTenure { min_months: 24 },
                DiscountCondition::CustomerGroup,
                DiscountCondition::Always,
            ]
        );
        assert_eq!(rules[1].kind, DiscountKind::FixedAmount);
        assert_eq!(rules[1].value, Decimal::from(150));
        assert!(rules.iter().all(|rule| rule.id != 7));

        pool.close().await;
    }

    #[tokio::test]
    async fn missing_condition_parameter_is_a_decode_error() {
        let pool = setup_pool().await;
        exec(
            &pool,
            "INSERT INTO discount_rule (id, name, condition_type, discount_type, value)
             VALUES (1, 'broken bulk', 'QUANTITY', 'PERCENTAGE', '0.10')",
        )
        .await;
        let store = SqlPricingStore::new(pool.clone());

        let error = store.active_discount_rules().await.unwrap_err();

        assert!(matches!(error, StoreError::Decode(ref message) if message.contains("min_quantity")));
        pool.close().await;
    }

    #[tokio::test]
    async fn validity_window_is_decoded() {
        let pool = setup_pool().await;
        exec(
            &pool,
            "INSERT INTO discount_rule (id, name, condition_type, discount_type, value, valid_from, valid_to)
             VALUES (1, 'summer', 'ALWAYS', 'PERCENTAGE', '0.10', '2026-01-01T00:00:00Z', '2026-03-01T00:00:00Z')",
        )
        .await;
        let store = SqlPricingStore::new(pool.clone());

        let rules = store.active_discount_rules().await.expect("query");

        assert!(rules[0].validity.from.is_some());
        assert!(rules[0].validity.to.is_some());
        pool.close().await;
    }
}
