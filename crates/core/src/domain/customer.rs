use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price_list::PriceListId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerGroup {
    pub id: i64,
    pub name: String,
    pub price_list_id: Option<PriceListId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalContract {
    pub id: i64,
    pub customer_id: CustomerId,
    /// Amount billed per rental period; the only signal available for plan tiering.
    pub period_amount: Decimal,
    pub started_at: DateTime<Utc>,
    pub active: bool,
}
