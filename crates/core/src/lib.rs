pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use domain::customer::{CustomerGroup, CustomerId, RentalContract};
pub use domain::discount::{DiscountCondition, DiscountKind, DiscountRule, PlanTier};
pub use domain::markup::{MarkupRule, RoundingMode};
pub use domain::part::{CategoryCode, CategoryConfig, Part, PartId};
pub use domain::price_list::{PriceList, PriceListId, PriceListItem};
pub use domain::ValidityWindow;
pub use errors::{InterfaceError, PricingError, StoreError};
pub use pricing::{
    AlertLevel, AppliedDiscount, PriceRequest, PriceResolutionService, PriceResolver, PriceSource,
    PricingPolicy, PricingStores, PricingTraceStep, ResolutionResult,
};
