//! Read-only collaborator interfaces the engine consumes. The catalog/CRM subsystem owns the
//! data; implementations live in `motofleet-db`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    customer::{CustomerGroup, CustomerId, RentalContract},
    discount::DiscountRule,
    markup::MarkupRule,
    part::{CategoryCode, CategoryConfig, Part, PartId},
    price_list::{PriceList, PriceListId, PriceListItem},
};
use crate::errors::StoreError;

#[async_trait]
pub trait PartStore: Send + Sync {
    async fn find_part(&self, id: PartId) -> Result<Option<Part>, StoreError>;
}

#[async_trait]
pub trait PriceListStore: Send + Sync {
    async fn find_list_by_code(&self, code: &str) -> Result<Option<PriceList>, StoreError>;

    async fn find_list_by_id(&self, id: PriceListId) -> Result<Option<PriceList>, StoreError>;

    /// Every item row for the pair; quantity and validity filtering happen in the engine.
    async fn list_items(
        &self,
        list_id: PriceListId,
        part_id: PartId,
    ) -> Result<Vec<PriceListItem>, StoreError>;
}

#[async_trait]
pub trait MarkupRuleStore: Send + Sync {
    /// Active rules scoped to `category` plus every active generic rule.
    async fn active_markup_rules(
        &self,
        category: Option<&CategoryCode>,
    ) -> Result<Vec<MarkupRule>, StoreError>;
}

#[async_trait]
pub trait CategoryConfigStore: Send + Sync {
    async fn category_config(
        &self,
        category: &CategoryCode,
    ) -> Result<Option<CategoryConfig>, StoreError>;
}

#[async_trait]
pub trait DiscountRuleStore: Send + Sync {
    async fn active_discount_rules(&self) -> Result<Vec<DiscountRule>, StoreError>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn group_memberships(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CustomerGroup>, StoreError>;

    async fn active_contract(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<RentalContract>, StoreError>;

    async fn earliest_contract_start(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;
}

/// Everything a resolution reads, as one bound.
pub trait PricingStores:
    PartStore + PriceListStore + MarkupRuleStore + CategoryConfigStore + DiscountRuleStore + CustomerDirectory
{
}

impl<T> PricingStores for T where
    T: PartStore
        + PriceListStore
        + MarkupRuleStore
        + CategoryConfigStore
        + DiscountRuleStore
        + CustomerDirectory
{
}
