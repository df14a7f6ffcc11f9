// Barber Domain Model

use super::shop::ShopId;
use serde::{Deserialize, Serialize};

/// Barber identifier
pub type BarberId = String;

/// Assumed service time when a barber has no recorded average (minutes)
pub const DEFAULT_AVERAGE_CUT_TIME_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barber {
    pub id: BarberId,
    pub shop_id: ShopId,
    /// Minutes per customer, if the shop has recorded one
    pub average_cut_time: Option<i64>,
}

impl Barber {
    pub fn new(
        id: impl Into<String>,
        shop_id: impl Into<String>,
        average_cut_time: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            shop_id: shop_id.into(),
            average_cut_time,
        }
    }

    /// Average cut time with the default applied. Zero and negative values
    /// are passed through as recorded.
    pub fn effective_cut_time(&self) -> i64 {
        self.average_cut_time.unwrap_or(DEFAULT_AVERAGE_CUT_TIME_MINUTES)
    }
}
