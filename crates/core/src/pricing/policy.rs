use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::PricingError;

/// Immutable snapshot of the engine's global knobs. Injected into the service, never read from
/// ambient state, so a resolution can be replayed against a known version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub version: String,
    pub default_list_code: String,
    pub default_markup: Decimal,
    pub default_margin_floor: Decimal,
    pub default_margin_target: Decimal,
    pub plan_tier_premium_from: Decimal,
    pub plan_tier_vip_from: Decimal,
    pub exchange_rate: Option<Decimal>,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            version: "default".to_string(),
            default_list_code: "MINORISTA".to_string(),
            default_markup: Decimal::new(20, 1),
            default_margin_floor: Decimal::new(15, 2),
            default_margin_target: Decimal::new(35, 2),
            plan_tier_premium_from: Decimal::from(100_000),
            plan_tier_vip_from: Decimal::from(200_000),
            exchange_rate: None,
        }
    }
}

impl PricingPolicy {
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.default_list_code.trim().is_empty() {
            return Err(invalid("default_list_code must not be empty"));
        }
        if self.default_markup <= Decimal::ZERO {
            return Err(invalid("default_markup must be greater than zero"));
        }
        validate_margin("default_margin_floor", self.default_margin_floor)?;
        validate_margin("default_margin_target", self.default_margin_target)?;
        if self.plan_tier_premium_from <= Decimal::ZERO
            || self.plan_tier_premium_from >= self.plan_tier_vip_from
        {
            return Err(invalid(
                "plan tier thresholds must satisfy 0 < plan_tier_premium_from < plan_tier_vip_from",
            ));
        }
        if let Some(rate) = self.exchange_rate {
            if rate <= Decimal::ZERO {
                return Err(invalid("exchange_rate must be greater than zero when set"));
            }
        }
        Ok(())
    }
}

/// Margins are fractions of the sale price and must stay below 1 for the floor formula to hold.
pub fn validate_margin(name: &str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(invalid(&format!("{name} must be in range [0, 1), got {value}")));
    }
    Ok(())
}

fn invalid(message: &str) -> PricingError {
    PricingError::InvalidConfiguration(message.to_string())
}
