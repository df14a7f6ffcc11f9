// Shop Domain Model

use serde::{Deserialize, Serialize};

/// Shop identifier
pub type ShopId = String;

/// Per-shop notification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    pub shop_id: ShopId,
    /// Largest estimated wait (minutes) that still triggers an early alert
    pub notify_threshold: i64,
}

impl ShopConfig {
    pub fn new(shop_id: impl Into<String>, notify_threshold: i64) -> Self {
        Self {
            shop_id: shop_id.into(),
            notify_threshold,
        }
    }
}
