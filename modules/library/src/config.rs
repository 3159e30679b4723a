use serde::{Deserialize, Serialize};

use crate::domain::query::PageLimits;
use crate::domain::service::ServiceConfig;

/// Configuration for the library module, read from `modules.library`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Fine charged per day a loan is past its return date.
    #[serde(default = "default_fine_per_day")]
    pub fine_per_day: f64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            fine_per_day: default_fine_per_day(),
        }
    }
}

impl LibraryConfig {
    pub fn to_service_config(&self) -> ServiceConfig {
        ServiceConfig {
            page_limits: PageLimits {
                default_limit: self.default_page_size,
                max_limit: self.max_page_size,
            },
            fine_per_day: self.fine_per_day,
            ..ServiceConfig::default()
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

fn default_fine_per_day() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: LibraryConfig = serde_json::from_value(serde_json::json!({
            "fine_per_day": 2.5
        }))
        .unwrap();
        assert_eq!(cfg.default_page_size, 10);
        assert_eq!(cfg.max_page_size, 100);
        assert_eq!(cfg.to_service_config().fine_per_day, 2.5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<LibraryConfig, _> =
            serde_json::from_value(serde_json::json!({ "page_size": 5 }));
        assert!(res.is_err());
    }
}
