//! Crate-Specific Domain Views
//!
//! Consumers read configuration through a view that has already built and
//! validated the tables they need.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use partner_commission_core::earnings::{EarningsCalculator, LocationSchedule, OptInRate};
use partner_commission_core::quote::{PricingEngine, QuoteValidator};
use partner_commission_core::tiers::{ResolvedTier, TierLookup, TierTable};

use super::master::{EarningsProfile, PricingDomainConfig, TierTableKind};
use crate::error::ConfigError;

/// View for tier resolution and earnings projections
pub struct EarningsDomainView {
    config: Arc<PricingDomainConfig>,
    partner_tiers: Arc<TierTable>,
    landing_tiers: Arc<TierTable>,
    locations: LocationSchedule,
}

impl EarningsDomainView {
    pub fn new(config: Arc<PricingDomainConfig>) -> Result<Self, ConfigError> {
        Ok(Self {
            partner_tiers: Arc::new(config.partner_tier_table()?),
            landing_tiers: Arc::new(config.landing_tier_table()?),
            locations: config.location_schedule()?,
            config,
        })
    }

    pub fn partner_tiers(&self) -> &Arc<TierTable> {
        &self.partner_tiers
    }

    pub fn landing_tiers(&self) -> &Arc<TierTable> {
        &self.landing_tiers
    }

    pub fn tiers(&self, kind: TierTableKind) -> &Arc<TierTable> {
        match kind {
            TierTableKind::PartnerProgram => &self.partner_tiers,
            TierTableKind::LandingCalculator => &self.landing_tiers,
        }
    }

    pub fn location_schedule(&self) -> &LocationSchedule {
        &self.locations
    }

    pub fn default_profile(&self) -> &str {
        &self.config.default_profile
    }

    /// Profile names, sorted
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.config.opt_in_profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn profile(&self, name: &str) -> Result<&EarningsProfile, ConfigError> {
        self.config.profile(name)
    }

    /// Calculator for a named profile; `None` selects the default profile
    pub fn calculator(&self, profile: Option<&str>) -> Result<EarningsCalculator, ConfigError> {
        let name = profile.unwrap_or(&self.config.default_profile);
        let profile = self.config.profile(name)?;
        let opt_in = OptInRate::new(profile.opt_in_rate).map_err(ConfigError::table("opt_in_profiles"))?;

        let calculator = EarningsCalculator::new(self.tiers(profile.tier_table).clone(), opt_in);
        Ok(if profile.multi_location {
            calculator.with_locations(self.locations.clone())
        } else {
            calculator
        })
    }

    /// Partner program tier for a volume
    pub fn resolve_tier(&self, volume: u64) -> TierLookup<'_> {
        self.partner_tiers.resolve(volume)
    }

    /// Partner program tier, honouring any configured override
    pub fn resolve_for_partner(
        &self,
        partner_id: &str,
        volume: u64,
        now: DateTime<Utc>,
    ) -> ResolvedTier<'_> {
        self.partner_tiers
            .resolve_for_partner(volume, self.config.tier_override(partner_id), now)
    }
}

/// View for quote validation and pricing
pub struct QuoteDomainView {
    engine: PricingEngine,
    validator: QuoteValidator,
    validity: Duration,
}

impl QuoteDomainView {
    /// Validates the whole configuration first, since quote limits feed
    /// date arithmetic.
    pub fn new(config: Arc<PricingDomainConfig>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: config.build_pricing_engine(config.partner_tier_table()?)?,
            validator: config.quote_validator(),
            validity: Duration::days(config.quotes.validity_days),
        })
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    pub fn validator(&self) -> &QuoteValidator {
        &self.validator
    }

    /// How long a saved quote stays open
    pub fn validity(&self) -> Duration {
        self.validity
    }
}
