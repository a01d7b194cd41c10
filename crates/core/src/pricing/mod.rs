pub mod discount;
#[cfg(test)]
mod fixtures;
pub mod guardrail;
pub mod markup;
pub mod policy;
pub mod price_list;
pub mod rounding;
pub mod service;
pub mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::PricingError;

pub use discount::{ApplicableDiscount, DiscountEvaluator};
pub use guardrail::{AlertLevel, GuardrailOutcome, MarginBounds};
pub use markup::MarkupCalculator;
pub use policy::PricingPolicy;
pub use price_list::{ListResolution, PriceListResolver};
pub use service::{
    AppliedDiscount, PriceRequest, PriceResolutionService, PriceResolver, ResolutionResult,
};
pub use store::PricingStores;

/// Largest cost or price (10^20) the engine accepts. Margin floors and percentage math stay
/// inside `Decimal` range below it.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x6310_0000, 0x6BC7_5E2D, 0x5, false, 0);

/// Rejects overflowed or out-of-range amounts read from the catalog or derived from it.
pub fn bounded_amount(stage: &str, amount: Option<Decimal>) -> Result<Decimal, PricingError> {
    match amount {
        Some(value) if value.abs() <= MAX_AMOUNT => Ok(value),
        _ => Err(PricingError::InvalidConfiguration(format!(
            "{stage} is outside the supported amount range"
        ))),
    }
}

/// How the base price of a resolution was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceSource {
    Auto,
    ListItem,
    MarkupRule,
    CategoryDefault,
    DefaultMarkup,
    NoCost,
}

impl PriceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::ListItem => "list-item",
            Self::MarkupRule => "markup-rule",
            Self::CategoryDefault => "category-default",
            Self::DefaultMarkup => "default-markup",
            Self::NoCost => "no-cost",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

impl PricingTraceStep {
    pub fn new(stage: &str, detail: impl Into<String>, amount: Decimal) -> Self {
        Self { stage: stage.to_string(), detail: detail.into(), amount }
    }
}
