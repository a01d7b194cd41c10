use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::part::CategoryCode;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMode {
    #[default]
    None,
    #[serde(rename = "NEAREST_10")]
    Nearest10,
    #[serde(rename = "NEAREST_50")]
    Nearest50,
    #[serde(rename = "NEAREST_99")]
    Nearest99,
}

impl RoundingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Nearest10 => "NEAREST_10",
            Self::Nearest50 => "NEAREST_50",
            Self::Nearest99 => "NEAREST_99",
        }
    }
}

impl std::str::FromStr for RoundingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NONE" | "" => Ok(Self::None),
            "NEAREST_10" => Ok(Self::Nearest10),
            "NEAREST_50" => Ok(Self::Nearest50),
            "NEAREST_99" => Ok(Self::Nearest99),
            other => Err(format!("unsupported rounding mode `{other}`")),
        }
    }
}

/// Cost-band multiplier. `category = None` marks a generic rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupRule {
    pub id: i64,
    pub category: Option<CategoryCode>,
    pub band_from: Option<Decimal>,
    pub band_to: Option<Decimal>,
    pub multiplier: Decimal,
    pub rounding: RoundingMode,
    pub priority: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl MarkupRule {
    /// Band is `[band_from, band_to)`; open ends match everything on that side.
    pub fn covers_cost(&self, cost: Decimal) -> bool {
        let above_floor = self.band_from.map_or(true, |from| from <= cost);
        let below_ceiling = self.band_to.map_or(true, |to| to > cost);
        above_floor && below_ceiling
    }

    pub fn applies_to(&self, category: Option<&CategoryCode>) -> bool {
        match &self.category {
            None => true,
            Some(scope) => category == Some(scope),
        }
    }

    pub fn is_category_specific(&self) -> bool {
        self.category.is_some()
    }

    pub fn describe(&self) -> String {
        let scope = self.category.as_ref().map_or("generic", CategoryCode::as_str);
        let from = self.band_from.map_or_else(|| "-inf".to_string(), |value| value.to_string());
        let to = self.band_to.map_or_else(|| "+inf".to_string(), |value| value.to_string());
        format!(
            "markup rule #{} ({scope}, band [{from}, {to}), x{}, {})",
            self.id,
            self.multiplier.normalize(),
            self.rounding.as_str()
        )
    }
}
