//! Configuration for the partner commission and quote pricing engines
//!
//! Provides:
//! - Built-in business tables (`constants`)
//! - YAML + environment layered loading (`PricingDomainConfig::load`)
//! - Crate views that hand out validated engines
//! - A process-wide, read-only configuration handle

pub mod constants;
pub mod domain;
pub mod error;

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;

pub use domain::{
    EarningsDomainView, EarningsProfile, PricingDomainConfig, QuoteConfig, QuoteDomainView,
    TierTableKind, TierTablesConfig, ENV_PREFIX,
};
pub use error::ConfigError;

static PRICING_CONFIG: OnceCell<Arc<PricingDomainConfig>> = OnceCell::new();

/// Install the process-wide configuration. May only be called once.
pub fn init_pricing_config(config: PricingDomainConfig) -> Result<Arc<PricingDomainConfig>, ConfigError> {
    config.validate()?;
    let config = Arc::new(config);
    PRICING_CONFIG
        .set(config.clone())
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(config)
}

/// Load a YAML file and install it as the process-wide configuration
pub fn init_pricing_config_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Arc<PricingDomainConfig>, ConfigError> {
    init_pricing_config(PricingDomainConfig::load(path)?)
}

/// Process-wide configuration; built-in defaults if never initialized
pub fn pricing_config() -> Arc<PricingDomainConfig> {
    PRICING_CONFIG
        .get_or_init(|| {
            tracing::warn!("Pricing configuration not initialized, using built-in defaults");
            Arc::new(PricingDomainConfig::default())
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test touches the global so ordering between tests cannot matter
    #[test]
    fn test_global_config_initializes_once() {
        let installed = init_pricing_config(PricingDomainConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&installed, &pricing_config()));

        let second = init_pricing_config(PricingDomainConfig::default());
        assert!(matches!(second, Err(ConfigError::AlreadyInitialized)));
    }
}
