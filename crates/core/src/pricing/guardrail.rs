use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::policy::{validate_margin, PricingPolicy};
use crate::domain::part::{CategoryConfig, Part};
use crate::errors::PricingError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Ok,
    Low,
    Critical,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Low => "LOW",
            Self::Critical => "CRITICAL",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarginBounds {
    pub floor: Decimal,
    pub target: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardrailOutcome {
    pub price: Decimal,
    pub margin: Decimal,
    pub alert: AlertLevel,
    /// True when the floor overrode the incoming price.
    pub enforced: bool,
}

/// Part override, then category override, then the policy default. Each level is checked
/// independently for floor and target.
pub fn resolve_margin_bounds(
    part: &Part,
    category_config: Option<&CategoryConfig>,
    policy: &PricingPolicy,
) -> Result<MarginBounds, PricingError> {
    let floor = part
        .margin_floor
        .or_else(|| category_config.and_then(|config| config.margin_floor))
        .unwrap_or(policy.default_margin_floor);
    let target = part
        .margin_target
        .or_else(|| category_config.and_then(|config| config.margin_target))
        .unwrap_or(policy.default_margin_target);

    validate_margin("margin floor", floor)?;
    validate_margin("margin target", target)?;
    Ok(MarginBounds { floor, target })
}

/// Margin as a fraction of price. A part without cost counts as pure margin; a non-positive
/// price against a real cost is reported as -1.
pub fn margin_of(price: Decimal, cost: Decimal) -> Decimal {
    if cost <= Decimal::ZERO {
        return Decimal::ONE;
    }
    if price <= Decimal::ZERO {
        return Decimal::NEGATIVE_ONE;
    }
    (price - cost) / price
}

pub fn enforce(price: Decimal, cost: Decimal, bounds: MarginBounds) -> GuardrailOutcome {
    let margin = margin_of(price, cost);

    if cost > Decimal::ZERO && margin < bounds.floor {
        return GuardrailOutcome {
            price: cost.checked_div(Decimal::ONE - bounds.floor).unwrap_or(Decimal::MAX),
            margin: bounds.floor,
            alert: AlertLevel::Critical,
            enforced: true,
        };
    }

    let alert = if margin < bounds.target { AlertLevel::Low } else { AlertLevel::Ok };
    GuardrailOutcome { price, margin, alert, enforced: false }
}
