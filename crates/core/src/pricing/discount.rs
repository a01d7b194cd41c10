use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    policy::PricingPolicy,
    store::{CustomerDirectory, DiscountRuleStore},
};
use crate::domain::{
    customer::CustomerId,
    discount::{DiscountCondition, DiscountKind, DiscountRule, PlanTier},
    part::Part,
};
use crate::errors::PricingError;

/// Days per month used for tenure arithmetic.
const TENURE_MONTH_DAYS: i64 = 30;

/// Customer facts the condition predicates can look at. Empty for anonymous requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerProfile {
    pub customer_id: Option<CustomerId>,
    pub in_any_group: bool,
    pub active_contract_amount: Option<Decimal>,
    pub first_contract_start: Option<DateTime<Utc>>,
}

impl CustomerProfile {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

pub struct DiscountContext<'a> {
    pub part: &'a Part,
    pub quantity: u32,
    pub now: DateTime<Utc>,
    pub customer: &'a CustomerProfile,
    pub policy: &'a PricingPolicy,
}

/// A rule that passed its predicate, tagged with the value it contributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicableDiscount {
    pub rule_id: i64,
    pub name: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub accumulable: bool,
    pub priority: i32,
}

impl From<&DiscountRule> for ApplicableDiscount {
    fn from(rule: &DiscountRule) -> Self {
        Self {
            rule_id: rule.id,
            name: rule.name.clone(),
            kind: rule.kind,
            value: rule.value,
            accumulable: rule.accumulable,
            priority: rule.priority,
        }
    }
}

pub struct DiscountEvaluator<'a, S: ?Sized> {
    store: &'a S,
    policy: &'a PricingPolicy,
}

impl<'a, S> DiscountEvaluator<'a, S>
where
    S: DiscountRuleStore + CustomerDirectory + ?Sized,
{
    pub fn new(store: &'a S, policy: &'a PricingPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the rules whose predicate holds, highest priority first. Prices are untouched.
    pub async fn evaluate(
        &self,
        part: &Part,
        customer_id: Option<CustomerId>,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<ApplicableDiscount>, PricingError> {
        let rules = self.store.active_discount_rules().await?;

        let needs_customer = rules.iter().any(|rule| rule.condition.requires_customer());
        let customer = match customer_id {
            Some(customer_id) if needs_customer => self.load_profile(customer_id).await?,
            Some(customer_id) => {
                CustomerProfile { customer_id: Some(customer_id), ..CustomerProfile::default() }
            }
            None => CustomerProfile::anonymous(),
        };

        let context =
            DiscountContext { part, quantity, now, customer: &customer, policy: self.policy };
        Ok(applicable_discounts(&rules, &context))
    }

    async fn load_profile(&self, customer_id: CustomerId) -> Result<CustomerProfile, PricingError> {
        let groups = self.store.group_memberships(customer_id).await?;
        let contract = self.store.active_contract(customer_id).await?;
        let first_contract_start = self.store.earliest_contract_start(customer_id).await?;

        Ok(CustomerProfile {
            customer_id: Some(customer_id),
            in_any_group: !groups.is_empty(),
            active_contract_amount: contract
                .filter(|contract| contract.active)
                .map(|contract| contract.period_amount),
            first_contract_start,
        })
    }
}

pub fn applicable_discounts(
    rules: &[DiscountRule],
    context: &DiscountContext<'_>,
) -> Vec<ApplicableDiscount> {
    let mut matched: Vec<&DiscountRule> = rules
        .iter()
        .filter(|rule| rule.active && rule.validity.contains(context.now))
        .filter(|rule| condition_applies(&rule.condition, context))
        .collect();
    matched.sort_by(|left, right| compare_discount_rules(left, right));
    matched.into_iter().map(ApplicableDiscount::from).collect()
}

pub fn compare_discount_rules(left: &DiscountRule, right: &DiscountRule) -> Ordering {
    right.priority.cmp(&left.priority).then_with(|| left.id.cmp(&right.id))
}

pub fn condition_applies(condition: &DiscountCondition, context: &DiscountContext<'_>) -> bool {
    match condition {
        DiscountCondition::Always => true,
        DiscountCondition::Quantity { min_quantity } => context.quantity >= *min_quantity,
        DiscountCondition::Category { category } => context.part.category.as_ref() == Some(category),
        DiscountCondition::RentalPlan { plan } => context
            .customer
            .active_contract_amount
            .is_some_and(|amount| infer_plan_tier(amount, context.policy) == *plan),
        DiscountCondition::CustomerTenure { min_months } => context
            .customer
            .first_contract_start
            .is_some_and(|start| tenure_months(start, context.now) >= i64::from(*min_months)),
        DiscountCondition::CustomerGroup => context.customer.in_any_group,
    }
}

/// Bands a contract's period amount into a plan tier. Stand-in until contracts carry an
/// explicit plan.
pub fn infer_plan_tier(period_amount: Decimal, policy: &PricingPolicy) -> PlanTier {
    if period_amount < policy.plan_tier_premium_from {
        PlanTier::Basic
    } else if period_amount < policy.plan_tier_vip_from {
        PlanTier::Premium
    } else {
        PlanTier::Vip
    }
}

pub fn tenure_months(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((now - start).num_days() / TENURE_MONTH_DAYS).max(0)
}
