//! Pricing Domain Configuration
//!
//! Layered configuration:
//! 1. Built-in defaults (`constants`)
//! 2. YAML file (config/base/pricing.yaml)
//! 3. `PARTNER_COMMISSION__*` environment variables
//!
//! Consumers go through a view that exposes built, validated tables.

mod master;
mod views;

pub use master::{
    EarningsProfile, PricingDomainConfig, QuoteConfig, TierTableKind, TierTablesConfig, ENV_PREFIX,
};
pub use views::{EarningsDomainView, QuoteDomainView};
