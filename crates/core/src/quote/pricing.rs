//! Quote Pricing Engine
//!
//! premium = base price × participants × risk multiplier, less the partner
//! volume discount, floored at a fraction of the unadjusted premium.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::money::{round_currency, round_rate};
use crate::tiers::TierTable;
use super::risk::{RiskSubject, RiskTables};
use super::types::{
    CoverageRates, CoverageType, PricingBreakdown, PricingEstimate, PricingResult, RiskFactors,
    ValidatedQuote,
};

/// Default floor as a fraction of base premium
pub const MINIMUM_PREMIUM_FRACTION: f64 = 0.5;

/// Days ahead used for estimate dates
const ESTIMATE_LEAD_DAYS: i64 = 7;

/// Discount starting at a partner volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountStep {
    pub min_volume: u64,
    /// Fraction of the risk-adjusted premium (0.04 = 4%)
    pub rate: f64,
}

/// Volume discount by partner monthly volume
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VolumeDiscountSchedule {
    steps: Vec<DiscountStep>,
}

impl VolumeDiscountSchedule {
    /// Steps must ascend by volume and never decrease in rate
    pub fn new(steps: Vec<DiscountStep>) -> Result<Self> {
        let invalid = |message: String| -> Result<Self> {
            Err(Error::InvalidTable {
                table: "volume_discounts",
                message,
            })
        };

        for step in &steps {
            if !step.rate.is_finite() || !(0.0..1.0).contains(&step.rate) {
                return invalid(format!(
                    "rate {} at volume {} must be in [0, 1)",
                    step.rate, step.min_volume
                ));
            }
        }

        for pair in steps.windows(2) {
            if pair[1].min_volume <= pair[0].min_volume {
                return invalid(format!(
                    "volume {} does not ascend after {}",
                    pair[1].min_volume, pair[0].min_volume
                ));
            }
            if pair[1].rate < pair[0].rate {
                return invalid(format!(
                    "rate decreases at volume {}",
                    pair[1].min_volume
                ));
            }
        }

        Ok(Self { steps })
    }

    /// No discounts at any volume
    pub fn none() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn steps(&self) -> &[DiscountStep] {
        &self.steps
    }

    pub fn rate_for(&self, volume: u64) -> f64 {
        self.steps
            .iter()
            .rev()
            .find(|s| volume >= s.min_volume)
            .map(|s| s.rate)
            .unwrap_or(0.0)
    }
}

/// Prices validated quotes. Immutable; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    base_prices: CoverageRates,
    risk: RiskTables,
    discounts: VolumeDiscountSchedule,
    commission_tiers: Arc<TierTable>,
    minimum_premium_fraction: f64,
}

impl PricingEngine {
    pub fn new(
        base_prices: CoverageRates,
        risk: RiskTables,
        discounts: VolumeDiscountSchedule,
        commission_tiers: Arc<TierTable>,
    ) -> Result<Self> {
        if !base_prices.all_positive() {
            return Err(Error::InvalidTable {
                table: "base_prices",
                message: "base prices must be positive".to_string(),
            });
        }

        Ok(Self {
            base_prices,
            risk,
            discounts,
            commission_tiers,
            minimum_premium_fraction: MINIMUM_PREMIUM_FRACTION,
        })
    }

    pub fn with_minimum_premium_fraction(mut self, fraction: f64) -> Result<Self> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(Error::InvalidTable {
                table: "pricing",
                message: format!("minimum premium fraction {} must be in [0, 1]", fraction),
            });
        }
        self.minimum_premium_fraction = fraction;
        Ok(self)
    }

    pub fn risk_tables(&self) -> &RiskTables {
        &self.risk
    }

    pub fn base_price(&self, coverage: CoverageType) -> f64 {
        self.base_prices.get(coverage)
    }

    pub fn calculate_pricing(&self, quote: &ValidatedQuote) -> PricingResult {
        let result = self.price(
            &RiskSubject {
                event_type: quote.event_type(),
                coverage_type: quote.coverage_type(),
                participants: quote.participants(),
                event_date: quote.event_date(),
                duration_hours: quote.duration_hours(),
                location: quote.location(),
            },
            quote.partner_volume(),
        );

        tracing::debug!(
            event_type = quote.event_type(),
            coverage = %quote.coverage_type(),
            participants = quote.participants(),
            premium = result.premium,
            risk_multiplier = result.risk_multiplier,
            "Priced quote"
        );

        result
    }

    /// One result per coverage type, in `CoverageType::ALL` order
    pub fn calculate_multi_coverage(&self, quote: &ValidatedQuote) -> Vec<PricingResult> {
        CoverageType::ALL
            .iter()
            .map(|coverage| self.calculate_pricing(&quote.with_coverage(*coverage)))
            .collect()
    }

    /// Premium range per coverage type for an event a week out.
    ///
    /// The low end assumes a short indoor event, the high end a full-day
    /// remote event on Christmas day.
    pub fn pricing_estimates(
        &self,
        event_type: &str,
        participants: u32,
        now: DateTime<Utc>,
    ) -> Vec<PricingEstimate> {
        let participants = participants.max(1);
        let base_date = now + Duration::days(ESTIMATE_LEAD_DAYS);
        let peak_date = Utc
            .with_ymd_and_hms(base_date.year(), 12, 25, 12, 0, 0)
            .single()
            .unwrap_or(base_date);

        CoverageType::ALL
            .iter()
            .map(|coverage| {
                let subject = |event_date: DateTime<Utc>,
                               duration_hours: f64,
                               location: Option<&'static str>| RiskSubject {
                    event_type,
                    coverage_type: *coverage,
                    participants,
                    event_date,
                    duration_hours: Some(duration_hours),
                    location,
                };

                let min = self.price(&subject(base_date, 1.0, Some("indoor facility")), 0);
                let typical = self.price(&subject(base_date, 2.0, None), 0);
                let max = self.price(&subject(peak_date, 8.0, Some("remote wilderness")), 0);

                PricingEstimate {
                    coverage_type: *coverage,
                    min_price: min.premium,
                    typical: typical.premium,
                    max_price: max.premium,
                }
            })
            .collect()
    }

    fn price(&self, subject: &RiskSubject<'_>, partner_volume: u64) -> PricingResult {
        let participants = subject.participants.max(1);
        let base_price = self.base_prices.get(subject.coverage_type);
        let (factors, multiplier) = self.risk.assess(subject);

        let base_premium = base_price * f64::from(participants);
        let risk_adjusted = base_premium * multiplier;
        let volume_discount = risk_adjusted * self.discounts.rate_for(partner_volume);
        let floor = base_premium * self.minimum_premium_fraction;
        let discounted = risk_adjusted - volume_discount;
        let minimum_premium_applied = discounted < floor;
        let final_premium = if minimum_premium_applied { floor } else { discounted };

        let tier = self.commission_tiers.tier_for(partner_volume);
        let commission_rate = tier.rate();
        let premium = round_currency(final_premium);

        PricingResult {
            coverage_type: subject.coverage_type,
            premium,
            base_price,
            per_participant: round_currency(premium / f64::from(participants)),
            commission: round_currency(premium * commission_rate),
            commission_rate: round_rate(commission_rate),
            commission_tier: tier.name.clone(),
            risk_multiplier: round_rate(multiplier),
            risk_factors: rounded_factors(&factors),
            breakdown: PricingBreakdown {
                base_premium: round_currency(base_premium),
                risk_adjustment: round_currency(risk_adjusted - base_premium),
                volume_discount: round_currency(volume_discount),
                final_premium: premium,
                minimum_premium_applied,
            },
        }
    }
}

fn rounded_factors(factors: &RiskFactors) -> RiskFactors {
    RiskFactors {
        event_type_risk: round_rate(factors.event_type_risk),
        coverage_risk: round_rate(factors.coverage_risk),
        base_risk: round_rate(factors.base_risk),
        participant_risk: round_rate(factors.participant_risk),
        duration_risk: round_rate(factors.duration_risk),
        date_risk: round_rate(factors.date_risk),
        location_risk: round_rate(factors.location_risk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{discount_schedule, pricing_engine, quote_input, validator};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // Monday
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_discount_schedule() {
        let schedule = discount_schedule();

        assert_eq!(schedule.rate_for(0), 0.0);
        assert_eq!(schedule.rate_for(999), 0.0);
        assert_eq!(schedule.rate_for(1000), 0.02);
        assert_eq!(schedule.rate_for(4999), 0.04);
        assert_eq!(schedule.rate_for(30000), 0.10);
        assert_eq!(VolumeDiscountSchedule::none().rate_for(30000), 0.0);
    }

    #[test]
    fn test_discount_schedule_rejects_decreasing_rate() {
        let result = VolumeDiscountSchedule::new(vec![
            DiscountStep { min_volume: 1000, rate: 0.05 },
            DiscountStep { min_volume: 2000, rate: 0.02 },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_liability_yoga_pricing() {
        let engine = pricing_engine();
        // Wednesday in April, 20 people, 2 hours, indoor studio
        let mut input = quote_input(Utc.with_ymd_and_hms(2025, 4, 16, 10, 0, 0).unwrap());
        input.event_type = "yoga class".into();
        input.participants = 20.0;
        input.location = Some("Sunrise Yoga Studio".into());
        let quote = validator().validate(input, now()).unwrap();

        let result = engine.calculate_pricing(&quote);

        // 4.99 * 20 = 99.80; multiplier 0.8 * 0.95 * 0.9 = 0.684
        assert_eq!(result.base_price, 4.99);
        assert_eq!(result.breakdown.base_premium, 99.8);
        assert_eq!(result.risk_multiplier, 0.684);
        assert_eq!(result.premium, 68.26);
        assert_eq!(result.per_participant, 3.41);
        assert!(!result.breakdown.minimum_premium_applied);
        // partner volume 0 falls in the entry tier
        assert_eq!(result.commission_tier, "Bronze");
        assert_eq!(result.commission_rate, 0.4);
        assert_eq!(result.commission, 27.3);
    }

    #[test]
    fn test_volume_discount_and_commission_tier() {
        let engine = pricing_engine();
        let mut input = quote_input(Utc.with_ymd_and_hms(2025, 4, 16, 10, 0, 0).unwrap());
        input.partner_volume = Some(3000);
        let quote = validator().validate(input, now()).unwrap();

        let result = engine.calculate_pricing(&quote);

        // running 1.0, 10 people, 2h, no location: multiplier 1.0
        assert_eq!(result.breakdown.base_premium, 49.9);
        assert_eq!(result.breakdown.risk_adjustment, 0.0);
        // 4% of 49.90
        assert_eq!(result.breakdown.volume_discount, 2.0);
        assert_eq!(result.premium, 47.9);
        assert_eq!(result.commission_tier, "Gold");
        assert_eq!(result.commission, 23.95);
    }

    #[test]
    fn test_minimum_premium_floor() {
        let engine = pricing_engine().with_minimum_premium_fraction(0.9).unwrap();
        let mut input = quote_input(Utc.with_ymd_and_hms(2025, 4, 16, 10, 0, 0).unwrap());
        input.event_type = "yoga class".into();
        input.participants = 600.0;
        let quote = validator().validate(input, now()).unwrap();

        let result = engine.calculate_pricing(&quote);

        // 0.8 * 0.8 = 0.64 would undercut 90% of base
        assert!(result.breakdown.minimum_premium_applied);
        assert_eq!(result.premium, round_currency(4.99 * 600.0 * 0.9));
    }

    #[test]
    fn test_multi_coverage_orders_by_coverage() {
        let engine = pricing_engine();
        let input = quote_input(Utc.with_ymd_and_hms(2025, 4, 16, 10, 0, 0).unwrap());
        let quote = validator().validate(input, now()).unwrap();

        let results = engine.calculate_multi_coverage(&quote);

        let coverages: Vec<_> = results.iter().map(|r| r.coverage_type).collect();
        assert_eq!(coverages, CoverageType::ALL.to_vec());
        assert!(results[0].premium < results[1].premium);
        assert!(results[1].premium < results[2].premium);
    }

    #[test]
    fn test_pricing_estimates_are_ordered() {
        let engine = pricing_engine();
        let estimates = engine.pricing_estimates("crossfit", 100, now());

        assert_eq!(estimates.len(), 3);
        for estimate in &estimates {
            assert!(estimate.min_price < estimate.typical);
            assert!(estimate.typical < estimate.max_price);
        }
    }
}
