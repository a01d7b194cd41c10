pub mod customer;
pub mod discount;
pub mod markup;
pub mod part;
pub mod price_list;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open validity window `[from, to)`. A missing bound is unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    pub fn always() -> Self {
        Self::default()
    }

    pub fn between(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let started = self.from.map_or(true, |from| from <= instant);
        let not_ended = self.to.map_or(true, |to| instant < to);
        started && not_ended
    }
}
