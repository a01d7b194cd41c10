use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{part::CategoryCode, ValidityWindow};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
}

impl DiscountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::FixedAmount => "FIXED_AMOUNT",
        }
    }
}

impl std::str::FromStr for DiscountKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PERCENTAGE" => Ok(Self::Percentage),
            "FIXED_AMOUNT" => Ok(Self::FixedAmount),
            other => Err(format!("unsupported discount type `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTier {
    Basic,
    Premium,
    Vip,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Premium => "PREMIUM",
            Self::Vip => "VIP",
        }
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BASIC" => Ok(Self::Basic),
            "PREMIUM" => Ok(Self::Premium),
            "VIP" => Ok(Self::Vip),
            other => Err(format!("unsupported plan tier `{other}`")),
        }
    }
}

/// Predicate attached to a discount rule. Each variant carries only its own parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountCondition {
    Always,
    Quantity { min_quantity: u32 },
    Category { category: CategoryCode },
    RentalPlan { plan: PlanTier },
    CustomerTenure { min_months: u32 },
    CustomerGroup,
}

impl DiscountCondition {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Always => "ALWAYS",
            Self::Quantity { .. } => "QUANTITY",
            Self::Category { .. } => "CATEGORY",
            Self::RentalPlan { .. } => "RENTAL_PLAN",
            Self::CustomerTenure { .. } => "CUSTOMER_TENURE",
            Self::CustomerGroup => "CUSTOMER_GROUP",
        }
    }

    /// Conditions that can only be decided with customer records at hand.
    pub fn requires_customer(&self) -> bool {
        matches!(self, Self::RentalPlan { .. } | Self::CustomerTenure { .. } | Self::CustomerGroup)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRule {
    pub id: i64,
    pub name: String,
    pub condition: DiscountCondition,
    pub kind: DiscountKind,
    /// Fraction for percentage rules (`0.20` is 20%), currency amount for fixed rules.
    pub value: Decimal,
    pub accumulable: bool,
    pub priority: i32,
    pub active: bool,
    pub validity: ValidityWindow,
}
