//! Payment provider configuration

use chrono::NaiveDate;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::billing::DEFAULT_API_VERSION;

/// Payment provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// API version the typed payloads are pinned to.
    ///
    /// Events rendered with another version still go through the
    /// unchecked deserialization path.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_version.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__API_VERSION"));
        }
        // Versions may carry a release suffix, e.g. `2024-06-20.acacia`.
        let date = self.api_version.split('.').next().unwrap_or_default();
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(ValidationError::InvalidApiVersion(self.api_version.clone()));
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}
