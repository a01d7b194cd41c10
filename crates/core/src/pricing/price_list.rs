use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{
    bounded_amount,
    markup::MarkupCalculator,
    policy::PricingPolicy,
    store::{CustomerDirectory, MarkupRuleStore, PriceListStore},
    PriceSource,
};
use crate::domain::{
    customer::CustomerId,
    part::{CategoryConfig, Part},
    price_list::{PriceList, PriceListItem},
};
use crate::errors::PricingError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListResolution {
    pub list: PriceList,
    pub base_price: Decimal,
    pub method: PriceSource,
    pub description: String,
}

/// Picks the price list for a request and reads the base price off it.
pub struct PriceListResolver<'a, S: ?Sized> {
    store: &'a S,
    policy: &'a PricingPolicy,
}

impl<'a, S> PriceListResolver<'a, S>
where
    S: PriceListStore + MarkupRuleStore + CustomerDirectory + ?Sized,
{
    pub fn new(store: &'a S, policy: &'a PricingPolicy) -> Self {
        Self { store, policy }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn resolve(
        &self,
        part: &Part,
        cost: Decimal,
        customer_id: Option<CustomerId>,
        list_code: Option<&str>,
        quantity: u32,
        now: DateTime<Utc>,
        category_config: Option<&CategoryConfig>,
    ) -> Result<ListResolution, PricingError> {
        let list = self.determine_list(customer_id, list_code).await?;
        self.price_on_list(list, part, cost, quantity, now, category_config).await
    }

    /// Explicit code, then the customer's group list, then the default retail list.
    pub async fn determine_list(
        &self,
        customer_id: Option<CustomerId>,
        list_code: Option<&str>,
    ) -> Result<PriceList, PricingError> {
        if let Some(code) = list_code {
            return self
                .store
                .find_list_by_code(code)
                .await?
                .ok_or_else(|| PricingError::ListNotFound { code: code.to_string() });
        }

        if let Some(customer_id) = customer_id {
            if let Some(list) = self.customer_group_list(customer_id).await? {
                return Ok(list);
            }
        }

        self.default_list().await?.ok_or_else(|| PricingError::NoDefaultList {
            code: self.policy.default_list_code.clone(),
        })
    }

    pub async fn default_list(&self) -> Result<Option<PriceList>, PricingError> {
        Ok(self.store.find_list_by_code(&self.policy.default_list_code).await?)
    }

    pub async fn price_on_list(
        &self,
        list: PriceList,
        part: &Part,
        cost: Decimal,
        quantity: u32,
        now: DateTime<Utc>,
        category_config: Option<&CategoryConfig>,
    ) -> Result<ListResolution, PricingError> {
        if list.auto_calculate {
            return auto_calculated(list, cost, self.policy);
        }

        let items = self.store.list_items(list.id, part.id).await?;
        if let Some(item) = select_list_item(&items, quantity, now) {
            let base_price = bounded_amount("list item price", Some(item.price))?;
            let description = format!(
                "list `{}` item #{} (min quantity {})",
                list.code, item.id, item.min_quantity
            );
            return Ok(ListResolution {
                base_price,
                method: PriceSource::ListItem,
                description,
                list,
            });
        }

        let markup = MarkupCalculator::new(self.store, self.policy)
            .compute(part, cost, category_config)
            .await?;
        Ok(ListResolution {
            list,
            base_price: markup.price,
            method: markup.source,
            description: markup.description,
        })
    }

    async fn customer_group_list(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<PriceList>, PricingError> {
        let groups = self.store.group_memberships(customer_id).await?;
        for group in groups {
            let Some(list_id) = group.price_list_id else {
                continue;
            };
            match self.store.find_list_by_id(list_id).await? {
                Some(list) => {
                    debug!(
                        event_name = "pricing.list.customer_group",
                        customer_id = customer_id.0,
                        group = %group.name,
                        list_code = %list.code,
                        "price list resolved from customer group"
                    );
                    return Ok(Some(list));
                }
                None => warn!(
                    event_name = "pricing.list.dangling_group_list",
                    customer_id = customer_id.0,
                    group = %group.name,
                    price_list_id = list_id.0,
                    "customer group points at a missing price list"
                ),
            }
        }
        Ok(None)
    }
}

fn auto_calculated(
    list: PriceList,
    cost: Decimal,
    policy: &PricingPolicy,
) -> Result<ListResolution, PricingError> {
    if cost <= Decimal::ZERO {
        return Ok(ListResolution {
            list,
            base_price: Decimal::ZERO,
            method: PriceSource::NoCost,
            description: "no cost".to_string(),
        });
    }

    let multiplier = list
        .auto_markup
        .filter(|markup| *markup > Decimal::ZERO)
        .unwrap_or(policy.default_markup);
    Ok(ListResolution {
        description: format!("list `{}` auto cost-plus x{}", list.code, multiplier.normalize()),
        base_price: bounded_amount("auto list price", cost.checked_mul(multiplier))?,
        method: PriceSource::Auto,
        list,
    })
}

/// Highest quantity break first, then the most recent validity start (an open start counts as
/// oldest), then the highest id.
pub fn compare_list_items(left: &PriceListItem, right: &PriceListItem) -> Ordering {
    right
        .min_quantity
        .cmp(&left.min_quantity)
        .then_with(|| right.validity.from.cmp(&left.validity.from))
        .then_with(|| right.id.cmp(&left.id))
}

pub fn select_list_item(
    items: &[PriceListItem],
    quantity: u32,
    now: DateTime<Utc>,
) -> Option<&PriceListItem> {
    items
        .iter()
        .filter(|item| item.min_quantity <= quantity && item.validity.contains(now))
        .min_by(|left, right| compare_list_items(left, right))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::select_list_item;
    use crate::domain::{
        part::PartId,
        price_list::{PriceListId, PriceListItem},
        ValidityWindow,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    fn item(id: i64, min_quantity: u32, price: i64, validity: ValidityWindow) -> PriceListItem {
        PriceListItem {
            id,
            price_list_id: PriceListId(1),
            part_id: PartId(7),
            price: Decimal::from(price),
            min_quantity,
            validity,
        }
    }

    #[test]
    fn highest_applicable_quantity_break_wins() {
        let items = vec![
            item(1, 1, 500, ValidityWindow::always()),
            item(2, 10, 420, ValidityWindow::always()),
            item(3, 50, 380, ValidityWindow::always()),
        ];

        let selected = select_list_item(&items, 15, now());

        assert_eq!(selected.map(|item| item.id), Some(2));
    }

    #[test]
    fn quantity_equal_to_break_selects_that_break() {
        let items = vec![
            item(1, 1, 500, ValidityWindow::always()),
            item(2, 5, 450, ValidityWindow::always()),
        ];

        assert_eq!(select_list_item(&items, 5, now()).map(|item| item.price), Some(450.into()));
    }

    #[test]
    fn expired_item_is_never_selected() {
        let expired = ValidityWindow::between(
            Some(now() - Duration::days(60)),
            Some(now() - Duration::days(1)),
        );
        let items = vec![item(1, 1, 500, ValidityWindow::always()), item(2, 10, 300, expired)];

        assert_eq!(select_list_item(&items, 20, now()).map(|item| item.id), Some(1));
    }

    #[test]
    fn future_item_is_not_selected_yet() {
        let future = ValidityWindow::between(Some(now() + Duration::days(1)), None);
        let items = vec![item(1, 1, 500, future)];

        assert!(select_list_item(&items, 1, now()).is_none());
    }

    #[test]
    fn most_recent_validity_start_breaks_quantity_ties() {
        let older = ValidityWindow::between(Some(now() - Duration::days(90)), None);
        let newer = ValidityWindow::between(Some(now() - Duration::days(5)), None);
        let items = vec![
            item(1, 1, 510, ValidityWindow::always()),
            item(2, 1, 500, older),
            item(3, 1, 490, newer),
        ];

        assert_eq!(select_list_item(&items, 1, now()).map(|item| item.id), Some(3));
    }
}
