//! Partner commission and quote pricing core
//!
//! Pure calculators for the partner program:
//! - Commission tier resolution from monthly participant volume
//! - Partner earnings projections
//! - Quote validation, risk assessment and pricing
//! - Underwriting risk scores and decisions
//!
//! Everything here is synchronous and free of I/O. Tables are built once,
//! validated, and shared read-only.

pub mod commission;
pub mod earnings;
pub mod error;
pub mod money;
pub mod periods;
pub mod quote;
pub mod tiers;
pub mod volume;

#[cfg(test)]
mod fixtures;

pub use commission::{calculate_commission, CommissionBreakdown};
pub use earnings::{
    EarningsCalculator, EarningsPoint, EarningsResult, LocationOption, LocationSchedule, OptInRate,
};
pub use error::{Error, Result, VolumeProblem};
pub use money::{format_currency, format_currency_cents, format_percentage, round_currency, round_rate, round_to};
pub use periods::{current_year_month, last_n_months, month_name};
pub use quote::{
    assess_underwriting, quick_risk_check, CoverageType, PricingEngine, PricingResult, QuoteInput,
    QuoteRecord, QuoteValidator, RiskAssessment, UnderwritingDecision, ValidatedQuote,
    ValidationReport,
};
pub use tiers::{CommissionTier, ResolvedTier, TierLookup, TierOverride, TierTable};
pub use volume::{parse_volume, sanitize_volume, volume_or_zero};
