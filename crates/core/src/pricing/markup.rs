use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::warn;

use super::{
    bounded_amount, policy::PricingPolicy, rounding::round_price, store::MarkupRuleStore,
    PriceSource,
};
use crate::domain::{
    markup::MarkupRule,
    part::{CategoryCode, CategoryConfig, Part},
};
use crate::errors::PricingError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupQuote {
    pub price: Decimal,
    pub source: PriceSource,
    pub description: String,
}

/// Cost-plus pricing used when a list carries no explicit price for the part.
pub struct MarkupCalculator<'a, S: ?Sized> {
    store: &'a S,
    policy: &'a PricingPolicy,
}

impl<'a, S> MarkupCalculator<'a, S>
where
    S: MarkupRuleStore + ?Sized,
{
    pub fn new(store: &'a S, policy: &'a PricingPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn compute(
        &self,
        part: &Part,
        cost: Decimal,
        category_config: Option<&CategoryConfig>,
    ) -> Result<MarkupQuote, PricingError> {
        if cost <= Decimal::ZERO {
            warn!(
                event_name = "pricing.markup.no_cost",
                part_id = part.id.0,
                part_code = %part.code,
                "part has no usable cost; markup resolves to zero"
            );
            return Ok(no_cost_quote());
        }

        let rules = self.store.active_markup_rules(part.category.as_ref()).await?;
        quote_markup(part.category.as_ref(), cost, &rules, category_config, self.policy)
    }
}

/// Category-specific rules beat generic ones regardless of priority; then priority desc,
/// newest first, highest id first.
pub fn compare_markup_rules(left: &MarkupRule, right: &MarkupRule) -> Ordering {
    right
        .is_category_specific()
        .cmp(&left.is_category_specific())
        .then_with(|| right.priority.cmp(&left.priority))
        .then_with(|| right.created_at.cmp(&left.created_at))
        .then_with(|| right.id.cmp(&left.id))
}

pub fn select_markup_rule<'r>(
    rules: &'r [MarkupRule],
    category: Option<&CategoryCode>,
    cost: Decimal,
) -> Option<&'r MarkupRule> {
    rules
        .iter()
        .filter(|rule| rule.active && rule.applies_to(category) && rule.covers_cost(cost))
        .min_by(|left, right| compare_markup_rules(left, right))
}

pub fn quote_markup(
    category: Option<&CategoryCode>,
    cost: Decimal,
    rules: &[MarkupRule],
    category_config: Option<&CategoryConfig>,
    policy: &PricingPolicy,
) -> Result<MarkupQuote, PricingError> {
    if cost <= Decimal::ZERO {
        return Ok(no_cost_quote());
    }

    if let Some(rule) = select_markup_rule(rules, category, cost) {
        let raw = bounded_amount("markup rule price", cost.checked_mul(rule.multiplier))?;
        return Ok(MarkupQuote {
            price: round_price(raw, rule.rounding),
            source: PriceSource::MarkupRule,
            description: rule.describe(),
        });
    }

    let quote = match category_config
        .and_then(|config| config.markup_default.map(|markup| (config, markup)))
    {
        Some((config, markup)) if markup > Decimal::ZERO => MarkupQuote {
            price: bounded_amount("category default price", cost.checked_mul(markup))?,
            source: PriceSource::CategoryDefault,
            description: format!(
                "category `{}` default markup x{}",
                config.category.as_str(),
                markup.normalize()
            ),
        },
        _ => MarkupQuote {
            price: bounded_amount(
                "default markup price",
                cost.checked_mul(policy.default_markup),
            )?,
            source: PriceSource::DefaultMarkup,
            description: format!("policy default markup x{}", policy.default_markup.normalize()),
        },
    };
    Ok(quote)
}

fn no_cost_quote() -> MarkupQuote {
    MarkupQuote {
        price: Decimal::ZERO,
        source: PriceSource::NoCost,
        description: "no cost".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{quote_markup, select_markup_rule};
    use crate::domain::{
        markup::{MarkupRule, RoundingMode},
        part::{CategoryCode, CategoryConfig},
    };
    use crate::errors::PricingError;
    use crate::pricing::{policy::PricingPolicy, PriceSource};

    fn rule(id: i64, category: Option<&str>, priority: i32, multiplier: i64) -> MarkupRule {
        MarkupRule {
            id,
            category: category.map(|code| CategoryCode(code.to_string())),
            band_from: None,
            band_to: None,
            multiplier: Decimal::from(multiplier),
            rounding: RoundingMode::None,
            priority,
            active: true,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn frenos() -> CategoryCode {
        CategoryCode("FRENOS".to_string())
    }

    #[test]
    fn category_rule_beats_generic_rule_with_higher_priority() {
        let rules = vec![rule(1, None, 100, 3), rule(2, Some("FRENOS"), 1, 2)];

        let selected = select_markup_rule(&rules, Some(&frenos()), Decimal::from(1000));

        assert_eq!(selected.map(|rule| rule.id), Some(2));
    }

    #[test]
    fn rules_for_other_categories_never_match() {
        let rules = vec![rule(1, Some("MOTOR"), 10, 3), rule(2, None, 0, 2)];

        let selected = select_markup_rule(&rules, Some(&frenos()), Decimal::from(1000));

        assert_eq!(selected.map(|rule| rule.id), Some(2));
    }

    #[test]
    fn band_is_half_open_on_cost() {
        let mut low = rule(1, None, 0, 3);
        low.band_to = Some(Decimal::from(1000));
        let mut high = rule(2, None, 0, 2);
        high.band_from = Some(Decimal::from(1000));
        let rules = vec![low, high];

        assert_eq!(select_markup_rule(&rules, None, Decimal::from(999)).map(|r| r.id), Some(1));
        assert_eq!(select_markup_rule(&rules, None, Decimal::from(1000)).map(|r| r.id), Some(2));
    }

    #[test]
    fn ties_break_on_priority_then_recency() {
        let mut older = rule(1, None, 5, 2);
        older.created_at = older.created_at - Duration::days(10);
        let newer = rule(2, None, 5, 3);
        let low_priority = rule(3, None, 1, 4);
        let rules = vec![older, low_priority, newer];

        assert_eq!(select_markup_rule(&rules, None, Decimal::from(50)).map(|r| r.id), Some(2));
    }

    #[test]
    fn inactive_rules_are_skipped() {
        let mut inactive = rule(1, Some("FRENOS"), 10, 3);
        inactive.active = false;
        let rules = vec![inactive];

        assert!(select_markup_rule(&rules, Some(&frenos()), Decimal::from(50)).is_none());
    }

    #[test]
    fn matched_rule_applies_its_rounding_mode() {
        let mut rounded = rule(1, None, 0, 2);
        rounded.multiplier = Decimal::new(175, 2);
        rounded.rounding = RoundingMode::Nearest99;

        let quote = quote_markup(
            None,
            Decimal::from(1000),
            &[rounded],
            None,
            &PricingPolicy::default(),
        )
        .expect("quote");

        assert_eq!(quote.source, PriceSource::MarkupRule);
        assert_eq!(quote.price, Decimal::from(1799));
    }

    #[test]
    fn falls_back_to_category_default_then_policy_default() {
        let config = CategoryConfig {
            category: frenos(),
            markup_default: Some(Decimal::new(25, 1)),
            margin_floor: None,
            margin_target: None,
        };
        let policy = PricingPolicy::default();

        let category_quote =
            quote_markup(Some(&frenos()), Decimal::from(100), &[], Some(&config), &policy)
                .expect("quote");
        assert_eq!(category_quote.source, PriceSource::CategoryDefault);
        assert_eq!(category_quote.price, Decimal::from(250));

        let default_quote = quote_markup(Some(&frenos()), Decimal::from(100), &[], None, &policy)
            .expect("quote");
        assert_eq!(default_quote.source, PriceSource::DefaultMarkup);
        assert_eq!(default_quote.price, Decimal::from(200));
    }

    #[test]
    fn zero_cost_degrades_to_no_cost_quote() {
        let quote = quote_markup(
            None,
            Decimal::ZERO,
            &[rule(1, None, 0, 3)],
            None,
            &PricingPolicy::default(),
        )
        .expect("quote");

        assert_eq!(quote.source, PriceSource::NoCost);
        assert_eq!(quote.price, Decimal::ZERO);
        assert_eq!(quote.description, "no cost");
    }

    #[test]
    fn overflowing_markup_is_a_configuration_error() {
        let huge_cost = Decimal::from_str("50000000000000000000000000000").expect("decimal");

        let error = quote_markup(
            None,
            huge_cost,
            &[rule(1, None, 0, 3)],
            None,
            &PricingPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(error, PricingError::InvalidConfiguration(_)));

        let mut steep = rule(2, None, 0, 1);
        steep.multiplier = Decimal::from_str("1000000000000000000000").expect("decimal");
        let error = quote_markup(None, Decimal::from(1000), &[steep], None, &PricingPolicy::default())
            .unwrap_err();
        assert!(matches!(error, PricingError::InvalidConfiguration(_)));
    }
}
