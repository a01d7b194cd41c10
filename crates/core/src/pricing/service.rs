use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    bounded_amount,
    discount::{ApplicableDiscount, DiscountEvaluator},
    guardrail::{enforce, margin_of, resolve_margin_bounds, AlertLevel},
    policy::PricingPolicy,
    price_list::{ListResolution, PriceListResolver},
    rounding::round_to_unit,
    store::PricingStores,
    PriceSource, PricingTraceStep,
};
use crate::domain::{
    customer::CustomerId,
    discount::DiscountKind,
    part::{CategoryConfig, Part, PartId},
};
use crate::errors::PricingError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub part_id: PartId,
    pub customer_id: Option<CustomerId>,
    pub list_code: Option<String>,
    pub quantity: u32,
}

impl PriceRequest {
    pub fn for_part(part_id: PartId) -> Self {
        Self { part_id, customer_id: None, list_code: None, quantity: 1 }
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if self.quantity == 0 {
            return Err(PricingError::InvalidInput("quantity must be at least 1".to_string()));
        }
        if let Some(code) = &self.list_code {
            if code.trim().is_empty() {
                return Err(PricingError::InvalidInput("listCode must not be blank".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
}

/// Explainable outcome of one resolution. Never reduced to a bare number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub part_id: PartId,
    pub part_name: String,
    pub category: Option<String>,
    pub retail_reference_price: Decimal,
    pub final_price: Decimal,
    pub applied_list_code: String,
    pub resolution_method: PriceSource,
    pub discounts_applied: Vec<AppliedDiscount>,
    pub total_discount_percent: Decimal,
    pub savings_amount: Decimal,
    pub cost_basis: Decimal,
    pub resulting_margin: Decimal,
    pub margin_floor: Decimal,
    pub margin_target: Decimal,
    pub alert_level: AlertLevel,
    pub policy_version: String,
    pub quantity: u32,
    pub customer_id: Option<CustomerId>,
    pub base_price: Decimal,
    pub list_discount_percent: Option<Decimal>,
    pub trace: Vec<PricingTraceStep>,
}

#[async_trait]
pub trait PriceResolver: Send + Sync {
    async fn resolve_price(&self, request: PriceRequest) -> Result<ResolutionResult, PricingError>;
}

pub struct PriceResolutionService<S: ?Sized> {
    stores: Arc<S>,
    policy: PricingPolicy,
}

impl<S> PriceResolutionService<S>
where
    S: PricingStores + ?Sized,
{
    pub fn new(stores: Arc<S>, policy: PricingPolicy) -> Self {
        Self { stores, policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Resolves against an explicit instant so validity windows can be pinned.
    pub async fn resolve_price_at(
        &self,
        request: &PriceRequest,
        now: DateTime<Utc>,
    ) -> Result<ResolutionResult, PricingError> {
        request.validate()?;
        let stores = self.stores.as_ref();

        let part = stores
            .find_part(request.part_id)
            .await?
            .ok_or(PricingError::PartNotFound(request.part_id))?;
        let cost =
            bounded_amount("cost basis", Some(part.cost_basis(self.policy.exchange_rate)))?;
        let category_config = match &part.category {
            Some(category) => stores.category_config(category).await?,
            None => None,
        };

        let lists = PriceListResolver::new(stores, &self.policy);
        let resolution = lists
            .resolve(
                &part,
                cost,
                request.customer_id,
                request.list_code.as_deref(),
                request.quantity,
                now,
                category_config.as_ref(),
            )
            .await?;
        let retail_reference = self
            .retail_reference(&lists, &resolution, &part, cost, request, now, category_config.as_ref())
            .await?;

        let mut trace = vec![PricingTraceStep::new(
            "base_price",
            format!("{} ({})", resolution.description, resolution.method.as_str()),
            resolution.base_price,
        )];

        let mut price = resolution.base_price;
        let list_discount_percent =
            resolution.list.global_discount_pct.filter(|pct| *pct > Decimal::ZERO);
        if let Some(pct) = list_discount_percent {
            price = apply_list_discount(price, pct);
            trace.push(PricingTraceStep::new(
                "list_discount",
                format!("list `{}` global discount {}%", resolution.list.code, pct.normalize()),
                price,
            ));
        }

        let applicable = DiscountEvaluator::new(stores, &self.policy)
            .evaluate(&part, request.customer_id, request.quantity, now)
            .await?;
        let chain = apply_discounts(price, &applicable);
        for step in &chain.steps {
            trace.push(PricingTraceStep::new(
                "discount",
                format!(
                    "{} {} {}",
                    step.discount.name,
                    step.discount.kind.as_str(),
                    step.discount.value.normalize()
                ),
                step.price_after,
            ));
        }

        let bounds = resolve_margin_bounds(&part, category_config.as_ref(), &self.policy)?;
        let guarded = enforce(chain.price, cost, bounds);
        if guarded.enforced {
            info!(
                event_name = "pricing.guardrail.enforced",
                part_id = part.id.0,
                discounted_price = %chain.price,
                enforced_price = %guarded.price,
                margin_floor = %bounds.floor,
                "margin floor overrode discounted price"
            );
            trace.push(PricingTraceStep::new(
                "margin_guardrail",
                format!("margin floor {} enforced", bounds.floor.normalize()),
                guarded.price,
            ));
        }

        let final_price =
            round_to_unit(bounded_amount("margin floor price", Some(guarded.price))?);
        trace.push(PricingTraceStep::new("rounding", "nearest whole unit", final_price));

        let savings = (retail_reference - final_price).max(Decimal::ZERO);
        let total_discount_percent = if retail_reference > Decimal::ZERO {
            (savings / retail_reference * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        };

        debug!(
            event_name = "pricing.resolve.computed",
            part_id = part.id.0,
            list_code = %resolution.list.code,
            method = resolution.method.as_str(),
            final_price = %final_price,
            alert_level = guarded.alert.as_str(),
            "price resolved"
        );

        Ok(ResolutionResult {
            part_id: part.id,
            part_name: part.name.clone(),
            category: part.category.as_ref().map(|category| category.as_str().to_string()),
            retail_reference_price: retail_reference.round_dp(2),
            final_price,
            applied_list_code: resolution.list.code.clone(),
            resolution_method: resolution.method,
            discounts_applied: chain.steps.into_iter().map(|step| step.discount).collect(),
            total_discount_percent,
            savings_amount: savings.round_dp(2),
            cost_basis: cost,
            resulting_margin: margin_of(final_price, cost).round_dp(4),
            margin_floor: bounds.floor,
            margin_target: bounds.target,
            alert_level: guarded.alert,
            policy_version: self.policy.version.clone(),
            quantity: request.quantity,
            customer_id: request.customer_id,
            base_price: resolution.base_price,
            list_discount_percent,
            trace,
        })
    }

    /// Base price the default retail list would give, for savings reporting only.
    #[allow(clippy::too_many_arguments)]
    async fn retail_reference(
        &self,
        lists: &PriceListResolver<'_, S>,
        resolution: &ListResolution,
        part: &Part,
        cost: Decimal,
        request: &PriceRequest,
        now: DateTime<Utc>,
        category_config: Option<&CategoryConfig>,
    ) -> Result<Decimal, PricingError> {
        if resolution.list.code == self.policy.default_list_code {
            return Ok(resolution.base_price);
        }

        match lists.default_list().await? {
            Some(default_list) => Ok(lists
                .price_on_list(default_list, part, cost, request.quantity, now, category_config)
                .await?
                .base_price),
            None => {
                warn!(
                    event_name = "pricing.retail_reference.missing_default",
                    part_id = part.id.0,
                    default_list_code = %self.policy.default_list_code,
                    "default list missing; retail reference falls back to resolved base price"
                );
                Ok(resolution.base_price)
            }
        }
    }
}

#[async_trait]
impl<S> PriceResolver for PriceResolutionService<S>
where
    S: PricingStores + ?Sized,
{
    async fn resolve_price(&self, request: PriceRequest) -> Result<ResolutionResult, PricingError> {
        self.resolve_price_at(&request, Utc::now()).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscountStep {
    pub discount: AppliedDiscount,
    pub price_after: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscountChain {
    pub price: Decimal,
    pub steps: Vec<DiscountStep>,
}

/// Best non-accumulable rule first (largest raw value, earliest on ties), then every
/// accumulable rule in the given order, each against the running price.
///
/// Percentage and fixed values are compared as raw numbers, so a 0.20 rule loses to a
/// 500 fixed rule. Left as is until the ranking is agreed with pricing.
pub fn apply_discounts(price: Decimal, applicable: &[ApplicableDiscount]) -> DiscountChain {
    let mut best: Option<&ApplicableDiscount> = None;
    for candidate in applicable.iter().filter(|discount| !discount.accumulable) {
        if best.map_or(true, |current| candidate.value > current.value) {
            best = Some(candidate);
        }
    }

    let mut running = price;
    let mut steps = Vec::new();
    for discount in best.into_iter().chain(applicable.iter().filter(|d| d.accumulable)) {
        running = apply_discount(running, discount.kind, discount.value);
        steps.push(DiscountStep {
            discount: AppliedDiscount {
                name: discount.name.clone(),
                kind: discount.kind,
                value: discount.value,
            },
            price_after: running,
        });
    }

    DiscountChain { price: running, steps }
}

/// Never raises the price and never goes below zero. Saturating math keeps out-of-range rule
/// values inside that clamp.
pub fn apply_discount(price: Decimal, kind: DiscountKind, value: Decimal) -> Decimal {
    let discounted = match kind {
        DiscountKind::Percentage => price.saturating_mul(Decimal::ONE.saturating_sub(value)),
        DiscountKind::FixedAmount => price.saturating_sub(value),
    };
    discounted.min(price).max(Decimal::ZERO)
}

/// `pct` is in percentage points (10 means 10%).
pub fn apply_list_discount(price: Decimal, pct: Decimal) -> Decimal {
    apply_discount(price, DiscountKind::Percentage, pct / Decimal::ONE_HUNDRED)
}
