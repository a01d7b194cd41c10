use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::markup::RoundingMode;

/// Maps a raw price to a display price. Half-way values round away from zero.
pub fn round_price(price: Decimal, mode: RoundingMode) -> Decimal {
    match mode {
        RoundingMode::None => price,
        RoundingMode::Nearest10 => round_to_multiple(price, Decimal::TEN),
        RoundingMode::Nearest50 => round_to_multiple(price, Decimal::from(50)),
        RoundingMode::Nearest99 => {
            let hundreds = (price / Decimal::ONE_HUNDRED).floor();
            hundreds * Decimal::ONE_HUNDRED + Decimal::from(99)
        }
    }
}

/// Final step of every resolution, independent of any rule's rounding mode.
pub fn round_to_unit(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn round_to_multiple(price: Decimal, step: Decimal) -> Decimal {
    (price / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * step
}
