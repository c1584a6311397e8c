//! Master pricing configuration
//!
//! Raw, serde-facing shape of every business table. Nothing here is trusted
//! until `validate()` has rebuilt the tables through the core constructors.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use partner_commission_core::earnings::{LocationOption, LocationSchedule, OptInRate};
use partner_commission_core::quote::{
    CoverageRates, DiscountStep, EventTypeRisk, PricingEngine, QuoteLimits, QuoteValidator,
    RiskBounds, RiskTables, VolumeDiscountSchedule,
};
use partner_commission_core::tiers::{CommissionTier, TierOverride, TierTable};

use crate::constants::{landing_calculator, locations, opt_in, partner_program, pricing};
use crate::error::ConfigError;

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "PARTNER_COMMISSION";

/// Which tier table an earnings profile prices against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierTableKind {
    #[default]
    PartnerProgram,
    LandingCalculator,
}

/// Named earnings surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsProfile {
    pub opt_in_rate: f64,
    #[serde(default)]
    pub tier_table: TierTableKind,
    /// Apply the multi-location bonus schedule
    #[serde(default)]
    pub multi_location: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTablesConfig {
    pub partner_program: Vec<CommissionTier>,
    pub landing_calculator: Vec<CommissionTier>,
}

impl Default for TierTablesConfig {
    fn default() -> Self {
        Self {
            partner_program: partner_program::TIERS
                .iter()
                .map(|(name, min, max, percentage, per, bonus)| CommissionTier {
                    name: name.to_string(),
                    min_volume: *min,
                    max_volume: *max,
                    percentage: *percentage,
                    per_participant: *per,
                    flat_bonus: *bonus,
                })
                .collect(),
            landing_calculator: landing_calculator::TIERS
                .iter()
                .map(|(name, min, max, percentage, per)| CommissionTier {
                    name: name.to_string(),
                    min_volume: *min,
                    max_volume: *max,
                    percentage: *percentage,
                    per_participant: *per,
                    flat_bonus: 0.0,
                })
                .collect(),
        }
    }
}

/// Quote pricing tables and validation limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub base_prices: CoverageRates,
    pub coverage_risk: CoverageRates,
    pub event_types: Vec<EventTypeRisk>,
    pub default_event_risk: f64,
    pub factor_bounds: RiskBounds,
    pub multiplier_bounds: RiskBounds,
    pub volume_discounts: Vec<DiscountStep>,
    pub minimum_premium_fraction: f64,
    pub validity_days: i64,
    pub limits: QuoteLimits,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            base_prices: CoverageRates {
                liability: pricing::BASE_LIABILITY,
                equipment: pricing::BASE_EQUIPMENT,
                cancellation: pricing::BASE_CANCELLATION,
            },
            coverage_risk: CoverageRates {
                liability: pricing::COVERAGE_RISK_LIABILITY,
                equipment: pricing::COVERAGE_RISK_EQUIPMENT,
                cancellation: pricing::COVERAGE_RISK_CANCELLATION,
            },
            event_types: pricing::EVENT_TYPES
                .iter()
                .map(|(activity, risk)| EventTypeRisk {
                    activity: activity.to_string(),
                    risk: *risk,
                })
                .collect(),
            default_event_risk: pricing::DEFAULT_EVENT_RISK,
            factor_bounds: RiskBounds {
                min: pricing::FACTOR_MIN,
                max: pricing::FACTOR_MAX,
            },
            multiplier_bounds: RiskBounds {
                min: pricing::MULTIPLIER_MIN,
                max: pricing::MULTIPLIER_MAX,
            },
            volume_discounts: pricing::VOLUME_DISCOUNTS
                .iter()
                .map(|(min_volume, rate)| DiscountStep {
                    min_volume: *min_volume,
                    rate: *rate,
                })
                .collect(),
            minimum_premium_fraction: pricing::MINIMUM_PREMIUM_FRACTION,
            validity_days: pricing::QUOTE_VALIDITY_DAYS,
            limits: QuoteLimits::default(),
        }
    }
}

/// Complete pricing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingDomainConfig {
    pub tiers: TierTablesConfig,
    pub opt_in_profiles: HashMap<String, EarningsProfile>,
    pub default_profile: String,
    pub locations: Vec<LocationOption>,
    /// Manual tier assignments by partner
    pub tier_overrides: Vec<TierOverride>,
    pub quotes: QuoteConfig,
}

impl Default for PricingDomainConfig {
    fn default() -> Self {
        let profile = |opt_in_rate, tier_table, multi_location| EarningsProfile {
            opt_in_rate,
            tier_table,
            multi_location,
        };

        let mut opt_in_profiles = HashMap::new();
        opt_in_profiles.insert(
            opt_in::PARTNER_DASHBOARD.to_string(),
            profile(opt_in::PARTNER_DASHBOARD_RATE, TierTableKind::PartnerProgram, false),
        );
        opt_in_profiles.insert(
            opt_in::WELLNESS.to_string(),
            profile(opt_in::WELLNESS_RATE, TierTableKind::PartnerProgram, false),
        );
        opt_in_profiles.insert(
            opt_in::LANDING_CALCULATOR.to_string(),
            profile(opt_in::LANDING_CALCULATOR_RATE, TierTableKind::LandingCalculator, true),
        );

        Self {
            tiers: TierTablesConfig::default(),
            opt_in_profiles,
            default_profile: opt_in::DEFAULT_PROFILE.to_string(),
            locations: locations::OPTIONS
                .iter()
                .map(|(label, min, max, bonus)| LocationOption {
                    label: label.to_string(),
                    min_locations: *min,
                    max_locations: *max,
                    bonus: *bonus,
                })
                .collect(),
            tier_overrides: Vec::new(),
            quotes: QuoteConfig::default(),
        }
    }
}

impl PricingDomainConfig {
    /// Load from a YAML file layered with `PARTNER_COMMISSION__*` variables.
    ///
    /// Environment overrides apply key by key, e.g.
    /// `PARTNER_COMMISSION__QUOTES__VALIDITY_DAYS=45`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;

        tracing::info!(
            path = %path.display(),
            profiles = loaded.opt_in_profiles.len(),
            overrides = loaded.tier_overrides.len(),
            "Loaded pricing configuration"
        );

        Ok(loaded)
    }

    /// Parse YAML without environment layering
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let parsed: Self = serde_yaml::from_str(yaml)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rebuild every table through the core constructors
    pub fn validate(&self) -> Result<(), ConfigError> {
        let partner = self.partner_tier_table()?;
        self.landing_tier_table()?;
        self.location_schedule()?;

        for (name, profile) in &self.opt_in_profiles {
            OptInRate::new(profile.opt_in_rate).map_err(ConfigError::table("opt_in_profiles"))?;
            tracing::trace!(profile = %name, rate = profile.opt_in_rate, "Validated profile");
        }
        if !self.opt_in_profiles.contains_key(&self.default_profile) {
            return Err(ConfigError::UnknownProfile(self.default_profile.clone()));
        }

        for ov in &self.tier_overrides {
            if partner.find_by_name(&ov.tier_name).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "tier override for partner '{}' names unknown tier '{}'",
                    ov.partner_id, ov.tier_name
                )));
            }
        }

        self.validate_quotes(partner)
    }

    fn validate_quotes(&self, partner: TierTable) -> Result<(), ConfigError> {
        let quotes = &self.quotes;
        if !(1..=pricing::MAX_QUOTE_VALIDITY_DAYS).contains(&quotes.validity_days) {
            return Err(ConfigError::Invalid(format!(
                "quote validity of {} days must be within 1..={}",
                quotes.validity_days,
                pricing::MAX_QUOTE_VALIDITY_DAYS
            )));
        }
        quotes
            .limits
            .validate()
            .map_err(ConfigError::table("quotes.limits"))?;

        self.build_pricing_engine(partner).map(|_| ())
    }

    pub fn partner_tier_table(&self) -> Result<TierTable, ConfigError> {
        TierTable::new(self.tiers.partner_program.clone())
            .map_err(ConfigError::table("tiers.partner_program"))
    }

    pub fn landing_tier_table(&self) -> Result<TierTable, ConfigError> {
        TierTable::new(self.tiers.landing_calculator.clone())
            .map_err(ConfigError::table("tiers.landing_calculator"))
    }

    pub fn location_schedule(&self) -> Result<LocationSchedule, ConfigError> {
        LocationSchedule::new(self.locations.clone()).map_err(ConfigError::table("locations"))
    }

    pub fn risk_tables(&self) -> Result<RiskTables, ConfigError> {
        let quotes = &self.quotes;
        RiskTables::new(
            quotes.event_types.clone(),
            quotes.default_event_risk,
            quotes.coverage_risk,
            quotes.factor_bounds,
            quotes.multiplier_bounds,
        )
        .map_err(ConfigError::table("quotes.risk"))
    }

    pub fn volume_discounts(&self) -> Result<VolumeDiscountSchedule, ConfigError> {
        VolumeDiscountSchedule::new(self.quotes.volume_discounts.clone())
            .map_err(ConfigError::table("quotes.volume_discounts"))
    }

    /// Pricing engine with commission from the given partner tier table
    pub fn build_pricing_engine(&self, partner: TierTable) -> Result<PricingEngine, ConfigError> {
        PricingEngine::new(
            self.quotes.base_prices,
            self.risk_tables()?,
            self.volume_discounts()?,
            std::sync::Arc::new(partner),
        )
        .and_then(|engine| {
            engine.with_minimum_premium_fraction(self.quotes.minimum_premium_fraction)
        })
        .map_err(ConfigError::table("quotes"))
    }

    pub fn quote_validator(&self) -> QuoteValidator {
        QuoteValidator::new(self.quotes.limits.clone())
    }

    pub fn profile(&self, name: &str) -> Result<&EarningsProfile, ConfigError> {
        self.opt_in_profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    /// Active override for a partner, if any
    pub fn tier_override(&self, partner_id: &str) -> Option<&TierOverride> {
        self.tier_overrides.iter().find(|o| o.partner_id == partner_id)
    }
}
