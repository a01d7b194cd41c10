use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use motofleet_core::domain::{
    customer::{CustomerGroup, CustomerId, RentalContract},
    discount::DiscountRule,
    markup::MarkupRule,
    part::{CategoryCode, CategoryConfig, Part, PartId},
    price_list::{PriceList, PriceListId, PriceListItem},
};
use motofleet_core::errors::StoreError;
use motofleet_core::pricing::store::{
    CategoryConfigStore, CustomerDirectory, DiscountRuleStore, MarkupRuleStore, PartStore,
    PriceListStore,
};

/// Process-local pricing catalog. Backs handler tests and dry runs where no database is wired.
#[derive(Default)]
pub struct InMemoryPricingStore {
    parts: RwLock<HashMap<PartId, Part>>,
    lists: RwLock<HashMap<PriceListId, PriceList>>,
    items: RwLock<Vec<PriceListItem>>,
    markup_rules: RwLock<Vec<MarkupRule>>,
    category_configs: RwLock<HashMap<String, CategoryConfig>>,
    discount_rules: RwLock<Vec<DiscountRule>>,
    groups: RwLock<HashMap<i64, CustomerGroup>>,
    memberships: RwLock<Vec<(CustomerId, i64)>>,
    contracts: RwLock<Vec<RentalContract>>,
}

impl InMemoryPricingStore {
    pub async fn add_part(&self, part: Part) {
        self.parts.write().await.insert(part.id, part);
    }

    pub async fn add_price_list(&self, list: PriceList) {
        self.lists.write().await.insert(list.id, list);
    }

    pub async fn add_list_item(&self, item: PriceListItem) {
        self.items.write().await.push(item);
    }

    pub async fn add_markup_rule(&self, rule: MarkupRule) {
        self.markup_rules.write().await.push(rule);
    }

    pub async fn add_category_config(&self, config: CategoryConfig) {
        self.category_configs.write().await.insert(config.category.0.clone(), config);
    }

    pub async fn add_discount_rule(&self, rule: DiscountRule) {
        self.discount_rules.write().await.push(rule);
    }

    pub async fn add_group(&self, group: CustomerGroup) {
        self.groups.write().await.insert(group.id, group);
    }

    pub async fn add_membership(&self, customer_id: CustomerId, group_id: i64) {
        self.memberships.write().await.push((customer_id, group_id));
    }

    pub async fn add_contract(&self, contract: RentalContract) {
        self.contracts.write().await.push(contract);
    }
}

#[async_trait]
impl PartStore for InMemoryPricingStore {
    async fn find_part(&self, id: PartId) -> Result<Option<Part>, StoreError> {
        Ok(self.parts.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl PriceListStore for InMemoryPricingStore {
    async fn find_list_by_code(&self, code: &str) -> Result<Option<PriceList>, StoreError> {
        Ok(self.lists.read().await.values().find(|list| list.code == code).cloned())
    }

    async fn find_list_by_id(&self, id: PriceListId) -> Result<Option<PriceList>, StoreError> {
        Ok(self.lists.read().await.get(&id).cloned())
    }

    async fn list_items(
        &self,
        list_id: PriceListId,
        part_id: PartId,
    ) -> Result<Vec<PriceListItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.price_list_id == list_id && item.part_id == part_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MarkupRuleStore for InMemoryPricingStore {
    async fn active_markup_rules(
        &self,
        category: Option<&CategoryCode>,
    ) -> Result<Vec<MarkupRule>, StoreError> {
        let rules = self.markup_rules.read().await;
        Ok(rules.iter().filter(|rule| rule.active && rule.applies_to(category)).cloned().collect())
    }
}

#[async_trait]
impl CategoryConfigStore for InMemoryPricingStore {
    async fn category_config(
        &self,
        category: &CategoryCode,
    ) -> Result<Option<CategoryConfig>, StoreError> {
        Ok(self.category_configs.read().await.get(category.as_str()).cloned())
    }
}

#[async_trait]
impl DiscountRuleStore for InMemoryPricingStore {
    async fn active_discount_rules(&self) -> Result<Vec<DiscountRule>, StoreError> {
        let rules = self.discount_rules.read().await;
        Ok(rules.iter().filter(|rule| rule.active).cloned().collect())
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryPricingStore {
    async fn group_memberships(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CustomerGroup>, StoreError> {
        let memberships = self.memberships.read().await;
        let groups = self.groups.read().await;
        let mut found: Vec<CustomerGroup> = memberships
            .iter()
            .filter(|(member, _)| *member == customer_id)
            .filter_map(|(_, group_id)| groups.get(group_id).cloned())
            .collect();
        found.sort_by_key(|group| group.id);
        Ok(found)
    }

    async fn active_contract(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<RentalContract>, StoreError> {
        let contracts = self.contracts.read().await;
        Ok(contracts
            .iter()
            .filter(|contract| contract.customer_id == customer_id && contract.active)
            .max_by_key(|contract| (contract.started_at, contract.id))
            .cloned())
    }

    async fn earliest_contract_start(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let contracts = self.contracts.read().await;
        Ok(contracts
            .iter()
            .filter(|contract| contract.customer_id == customer_id)
            .map(|contract| contract.started_at)
            .min())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use motofleet_core::domain::{
        customer::{CustomerGroup, CustomerId, RentalContract},
        markup::{MarkupRule, RoundingMode},
        part::CategoryCode,
        price_list::PriceListId,
    };
    use motofleet_core::pricing::store::{CustomerDirectory, MarkupRuleStore};
    use rust_decimal::Decimal;

    use super::InMemoryPricingStore;

    fn rule(id: i64, category: Option<&str>, active: bool) -> MarkupRule {
        MarkupRule {
            id,
            category: category.map(|code| CategoryCode(code.to_string())),
            band_from: None,
            band_to: None,
            multiplier: Decimal::new(13, 1),
            rounding: RoundingMode::None,
            priority: 0,
            active,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn markup_rules_are_filtered_by_scope_and_activity() {
        let store = InMemoryPricingStore::default();
        store.add_markup_rule(rule(1, None, true)).await;
        store.add_markup_rule(rule(2, Some("FRENOS"), true)).await;
        store.add_markup_rule(rule(3, Some("MOTOR"), true)).await;
        store.add_markup_rule(rule(4, Some("FRENOS"), false)).await;

        let frenos = CategoryCode("FRENOS".to_string());
        let rules = store.active_markup_rules(Some(&frenos)).await.expect("rules");

        assert_eq!(rules.iter().map(|rule| rule.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn customer_directory_mirrors_sql_ordering() {
        let store = InMemoryPricingStore::default();
        store
            .add_group(CustomerGroup {
                id: 5,
                name: "Flotas".into(),
                price_list_id: Some(PriceListId(2)),
            })
            .await;
        store.add_group(CustomerGroup { id: 2, name: "Talleres".into(), price_list_id: None }).await;
        store.add_membership(CustomerId(7), 5).await;
        store.add_membership(CustomerId(7), 2).await;
        let older = Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        for (id, started_at, active) in [(1, older, false), (2, newer, true)] {
            store
                .add_contract(RentalContract {
                    id,
                    customer_id: CustomerId(7),
                    period_amount: Decimal::from(1000),
                    started_at,
                    active,
                })
                .await;
        }

        let groups = store.group_memberships(CustomerId(7)).await.expect("groups");
        let contract = store.active_contract(CustomerId(7)).await.expect("contract");
        let earliest = store.earliest_contract_start(CustomerId(7)).await.expect("earliest");

        assert_eq!(groups.iter().map(|group| group.id).collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(contract.map(|contract| contract.id), Some(2));
        assert_eq!(earliest, Some(older));
    }
}
