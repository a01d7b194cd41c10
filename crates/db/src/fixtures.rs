use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Row counts the demo catalog guarantees after a load, keyed by table.
const SEEDED_TABLES: &[(&str, i64)] = &[
    ("part_category_config", 3),
    ("part", 6),
    ("price_list", 3),
    ("price_list_item", 6),
    ("markup_rule", 3),
    ("discount_rule", 6),
    ("customer", 2),
    ("customer_group", 1),
    ("customer_group_member", 1),
    ("rental_contract", 2),
];

const SEEDED_LIST_CODES: &[&str] = &["MINORISTA", "MAYORISTA", "USO-INTERNO"];

/// Deterministic demo catalog: three price lists, parts across categories (one without cost),
/// markup bands, one discount rule per condition type and two customers with contracts.
pub struct DemoCatalog;

impl DemoCatalog {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let mut tables = Vec::with_capacity(SEEDED_TABLES.len());
        for (table, _) in SEEDED_TABLES {
            tables.push((*table, count_rows(pool, table).await?));
        }

        Ok(SeedResult { tables })
    }

    /// Checks that every seeded row is present; rows added by hand on top do not fail the check.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for (table, expected) in SEEDED_TABLES {
            checks.push((*table, count_rows(pool, table).await? >= *expected));
        }

        for code in SEEDED_LIST_CODES {
            let exists: i64 =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM price_list WHERE code = ?1)")
                    .bind(code)
                    .fetch_one(pool)
                    .await?;
            checks.push((*code, exists == 1));
        }

        let group_list_linked: i64 = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM customer_group g
                INNER JOIN price_list l ON l.id = g.price_list_id
                WHERE g.name = 'Flotas' AND l.code = 'MAYORISTA'
            )",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("group-price-list", group_list_linked == 1));

        let condition_types: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT condition_type) FROM discount_rule")
                .fetch_one(pool)
                .await?;
        checks.push(("discount-condition-types", condition_types >= 6));

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

async fn count_rows(pool: &DbPool, table: &str) -> Result<i64, RepositoryError> {
    let count: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {table}")).fetch_one(pool).await?;
    Ok(count)
}

#[derive(Debug)]
pub struct SeedResult {
    pub tables: Vec<(&'static str, i64)>,
}

impl SeedResult {
    pub fn rows_in(&self, table: &str) -> Option<i64> {
        self.tables.iter().find(|(name, _)| *name == table).map(|(_, count)| *count)
    }
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
