use serde::{Deserialize, Serialize};

/// `modules.billing` section of the application config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BillingConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 15,
            max_page_size: 100,
        }
    }
}
