//! Vec-backed stores for exercising the pricing components without a database.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use super::store::{
    CategoryConfigStore, CustomerDirectory, DiscountRuleStore, MarkupRuleStore, PartStore,
    PriceListStore,
};
use crate::domain::{
    customer::{CustomerGroup, CustomerId, RentalContract},
    discount::{DiscountCondition, DiscountKind, DiscountRule},
    markup::{MarkupRule, RoundingMode},
    part::{CategoryCode, CategoryConfig, Part, PartId},
    price_list::{PriceList, PriceListId, PriceListItem},
    ValidityWindow,
};
use crate::errors::StoreError;

#[derive(Clone, Debug, Default)]
pub struct FixtureStores {
    pub parts: Vec<Part>,
    pub lists: Vec<PriceList>,
    pub items: Vec<PriceListItem>,
    pub markup_rules: Vec<MarkupRule>,
    pub category_configs: Vec<CategoryConfig>,
    pub discount_rules: Vec<DiscountRule>,
    pub groups: Vec<(CustomerId, CustomerGroup)>,
    pub contracts: Vec<RentalContract>,
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
}

pub fn part(id: i64, landed_cost: Decimal) -> Part {
    Part {
        id: PartId(id),
        code: format!("REP-{id:04}"),
        name: format!("Part {id}"),
        category: Some(CategoryCode("FRENOS".to_string())),
        landed_cost,
        foreign_cost: Decimal::ZERO,
        list_price: Decimal::ZERO,
        margin_floor: None,
        margin_target: None,
    }
}

pub fn list(id: i64, code: &str) -> PriceList {
    PriceList {
        id: PriceListId(id),
        code: code.to_string(),
        name: code.to_string(),
        global_discount_pct: None,
        auto_calculate: false,
        auto_markup: None,
    }
}

pub fn list_item(
    id: i64,
    list_id: i64,
    part_id: i64,
    min_quantity: u32,
    price: Decimal,
    validity: ValidityWindow,
) -> PriceListItem {
    PriceListItem {
        id,
        price_list_id: PriceListId(list_id),
        part_id: PartId(part_id),
        price,
        min_quantity,
        validity,
    }
}

pub fn markup_rule(id: i64, category: Option<&str>, multiplier: Decimal) -> MarkupRule {
    MarkupRule {
        id,
        category: category.map(|code| CategoryCode(code.to_string())),
        band_from: None,
        band_to: None,
        multiplier,
        rounding: RoundingMode::None,
        priority: 0,
        active: true,
        created_at: now(),
    }
}

pub fn category_config(
    category: &str,
    markup_default: Option<Decimal>,
    margin_floor: Option<Decimal>,
) -> CategoryConfig {
    CategoryConfig {
        category: CategoryCode(category.to_string()),
        markup_default,
        margin_floor,
        margin_target: None,
    }
}

pub fn discount_rule(
    id: i64,
    condition: DiscountCondition,
    kind: DiscountKind,
    value: Decimal,
    accumulable: bool,
) -> DiscountRule {
    DiscountRule {
        id,
        name: format!("discount-{id}"),
        condition,
        kind,
        value,
        accumulable,
        priority: 0,
        active: true,
        validity: ValidityWindow::always(),
    }
}

pub fn group(id: i64, price_list_id: Option<i64>) -> CustomerGroup {
    CustomerGroup { id, name: format!("group-{id}"), price_list_id: price_list_id.map(PriceListId) }
}

pub fn contract(
    id: i64,
    customer_id: i64,
    period_amount: Decimal,
    started_at: DateTime<Utc>,
) -> RentalContract {
    RentalContract {
        id,
        customer_id: CustomerId(customer_id),
        period_amount,
        started_at,
        active: true,
    }
}

#[async_trait]
impl PartStore for FixtureStores {
    async fn find_part(&self, id: PartId) -> Result<Option<Part>, StoreError> {
        Ok(self.parts.iter().find(|part| part.id == id).cloned())
    }
}

#[async_trait]
impl PriceListStore for FixtureStores {
    async fn find_list_by_code(&self, code: &str) -> Result<Option<PriceList>, StoreError> {
        Ok(self.lists.iter().find(|list| list.code == code).cloned())
    }

    async fn find_list_by_id(&self, id: PriceListId) -> Result<Option<PriceList>, StoreError> {
        Ok(self.lists.iter().find(|list| list.id == id).cloned())
    }

    async fn list_items(
        &self,
        list_id: PriceListId,
        part_id: PartId,
    ) -> Result<Vec<PriceListItem>, StoreError> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.price_list_id == list_id && item.part_id == part_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MarkupRuleStore for FixtureStores {
    async fn active_markup_rules(
        &self,
        category: Option<&CategoryCode>,
    ) -> Result<Vec<MarkupRule>, StoreError> {
        Ok(self
            .markup_rules
            .iter()
            .filter(|rule| rule.active && rule.applies_to(category))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CategoryConfigStore for FixtureStores {
    async fn category_config(
        &self,
        category: &CategoryCode,
    ) -> Result<Option<CategoryConfig>, StoreError> {
        Ok(self.category_configs.iter().find(|config| &config.category == category).cloned())
    }
}

#[async_trait]
impl DiscountRuleStore for FixtureStores {
    async fn active_discount_rules(&self) -> Result<Vec<DiscountRule>, StoreError> {
        Ok(self.discount_rules.iter().filter(|rule| rule.active).cloned().collect())
    }
}

#[async_trait]
impl CustomerDirectory for FixtureStores {
    async fn group_memberships(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CustomerGroup>, StoreError> {
        Ok(self
            .groups
            .iter()
            .filter(|(member, _)| *member == customer_id)
            .map(|(_, group)| group.clone())
            .collect())
    }

    async fn active_contract(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<RentalContract>, StoreError> {
        Ok(self
            .contracts
            .iter()
            .filter(|contract| contract.customer_id == customer_id && contract.active)
            .max_by_key(|contract| contract.started_at)
            .cloned())
    }

    async fn earliest_contract_start(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .contracts
            .iter()
            .filter(|contract| contract.customer_id == customer_id)
            .map(|contract| contract.started_at)
            .min())
    }
}
