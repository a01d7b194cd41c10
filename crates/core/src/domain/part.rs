use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub i64);

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryCode(pub String);

impl CategoryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Spare-parts catalog item as seen by the pricing engine. Owned by the costing workflows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub code: String,
    pub name: String,
    pub category: Option<CategoryCode>,
    /// Average landed cost in local currency.
    pub landed_cost: Decimal,
    /// Average purchase cost in the supplier's (foreign) currency.
    pub foreign_cost: Decimal,
    pub list_price: Decimal,
    pub margin_floor: Option<Decimal>,
    pub margin_target: Option<Decimal>,
}

impl Part {
    /// Cost used for markup and margin math. The landed cost wins; the foreign cost is only
    /// converted when no landed cost was recorded and an exchange rate is configured.
    pub fn cost_basis(&self, exchange_rate: Option<Decimal>) -> Decimal {
        if self.landed_cost > Decimal::ZERO {
            return self.landed_cost;
        }

        match exchange_rate {
            Some(rate) if self.foreign_cost > Decimal::ZERO && rate > Decimal::ZERO => {
                self.foreign_cost.saturating_mul(rate)
            }
            _ => self.landed_cost.max(Decimal::ZERO),
        }
    }
}

/// Per-category fallbacks. Every knob is optional; missing values fall through to the policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub category: CategoryCode,
    pub markup_default: Option<Decimal>,
    pub margin_floor: Option<Decimal>,
    pub margin_target: Option<Decimal>,
}
