use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{part::PartId, ValidityWindow};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PriceListId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceList {
    pub id: PriceListId,
    pub code: String,
    pub name: String,
    /// Whole-list discount in percentage points (`10` means 10%).
    pub global_discount_pct: Option<Decimal>,
    /// Pure cost-plus list: every price is `cost * auto_markup`.
    pub auto_calculate: bool,
    pub auto_markup: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListItem {
    pub id: i64,
    pub price_list_id: PriceListId,
    pub part_id: PartId,
    pub price: Decimal,
    pub min_quantity: u32,
    pub validity: ValidityWindow,
}
