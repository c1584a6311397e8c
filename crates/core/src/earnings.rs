//! Partner Earnings Calculator
//!
//! Converts a monthly participant volume into covered participants via the
//! opt-in rate, then prices them at the tier resolved from the raw volume.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::money::{format_currency_cents, format_percentage, round_currency, round_to};
use crate::tiers::TierTable;
use crate::volume::sanitize_volume;

/// Volumes sampled for the earnings chart, including both sides of every
/// default tier boundary.
pub const EARNINGS_CURVE_SAMPLES: [u64; 22] = [
    0, 500, 999, 1000, 1500, 2000, 2499, 2500, 3000, 4000, 4999, 5000, 6000, 8000, 9999, 10000,
    15000, 20000, 24999, 25000, 35000, 50000,
];

/// Reported coverage of opted-in participants. Every opted-in participant
/// is fully covered today.
pub const FULL_COVERAGE_PERCENT: f64 = 100.0;

/// Fraction of participants assumed to purchase coverage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OptInRate(f64);

impl OptInRate {
    /// Every participant is covered
    pub const FULL: OptInRate = OptInRate(1.0);

    pub fn new(rate: f64) -> Result<Self> {
        if rate.is_finite() && (0.0..=1.0).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(Error::InvalidOptInRate(rate))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Covered participants for a raw count, rounded half-up
    pub fn covered(&self, participants: u64) -> u64 {
        round_to(participants as f64 * self.0, 0) as u64
    }
}

/// Per-participant bonus for multi-location partners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationOption {
    pub label: String,
    pub min_locations: u32,
    /// Inclusive; `None` for the last option
    #[serde(default)]
    pub max_locations: Option<u32>,
    pub bonus: f64,
}

/// Ordered location bonus bands starting at one location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LocationSchedule {
    options: Vec<LocationOption>,
}

impl LocationSchedule {
    pub fn new(options: Vec<LocationOption>) -> Result<Self> {
        let invalid = |message: String| -> Result<Self> {
            Err(Error::InvalidTable {
                table: "location",
                message,
            })
        };

        match options.first() {
            None => return invalid("at least one location option is required".to_string()),
            Some(first) if first.min_locations != 1 => {
                return invalid("the first option must start at 1 location".to_string())
            }
            _ => {}
        }

        for pair in options.windows(2) {
            let Some(max) = pair[0].max_locations else {
                return invalid(format!("open-ended option '{}' must be last", pair[0].label));
            };
            if max.checked_add(1) != Some(pair[1].min_locations) {
                return invalid(format!("'{}' does not follow '{}'", pair[1].label, pair[0].label));
            }
        }
        if options.iter().any(|o| !o.bonus.is_finite() || o.bonus < 0.0) {
            return invalid("bonuses must be non-negative numbers".to_string());
        }
        if options.last().map_or(false, |o| o.max_locations.is_some()) {
            return invalid("the last option must be open-ended".to_string());
        }

        Ok(Self { options })
    }

    /// Single band with no bonus
    pub fn flat() -> Self {
        Self {
            options: vec![LocationOption {
                label: "Any number of locations".to_string(),
                min_locations: 1,
                max_locations: None,
                bonus: 0.0,
            }],
        }
    }

    pub fn options(&self) -> &[LocationOption] {
        &self.options
    }

    /// Option covering `locations`; zero is treated as one location.
    pub fn option_for(&self, locations: u32) -> &LocationOption {
        let locations = locations.max(1);
        self.options
            .iter()
            .find(|o| locations >= o.min_locations && o.max_locations.map_or(true, |m| locations <= m))
            .unwrap_or(&self.options[0])
    }
}

/// Monthly earnings projection for a partner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsResult {
    /// volume × locations
    pub total_participants: u64,
    pub covered_participants: u64,
    pub tier_name: String,
    pub tier_percentage: f64,
    pub coverage_percentage: f64,
    pub opt_in_rate: f64,
    pub location_bonus: f64,
    /// Tier amount plus location bonus
    pub effective_per_participant: f64,
    pub monthly_earnings: f64,
    pub annual_earnings: f64,
}

/// One point on the earnings-by-volume chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsPoint {
    pub participants: u64,
    pub earnings: f64,
    pub tier_label: String,
}

/// Earnings calculator bound to one tier table and opt-in assumption
#[derive(Debug, Clone)]
pub struct EarningsCalculator {
    tiers: Arc<TierTable>,
    opt_in_rate: OptInRate,
    locations: LocationSchedule,
}

impl EarningsCalculator {
    pub fn new(tiers: Arc<TierTable>, opt_in_rate: OptInRate) -> Self {
        Self {
            tiers,
            opt_in_rate,
            locations: LocationSchedule::flat(),
        }
    }

    pub fn with_locations(mut self, locations: LocationSchedule) -> Self {
        self.locations = locations;
        self
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn opt_in_rate(&self) -> OptInRate {
        self.opt_in_rate
    }

    pub fn location_schedule(&self) -> &LocationSchedule {
        &self.locations
    }

    /// Earnings for a single location.
    pub fn calculate_earnings(&self, volume: u64) -> EarningsResult {
        self.calculate(volume, 1)
    }

    /// Earnings for `volume` participants at each of `locations` sites.
    ///
    /// Tier eligibility uses the total raw volume, not the covered count.
    pub fn calculate(&self, volume: u64, locations: u32) -> EarningsResult {
        let locations = locations.max(1);
        let total_participants = volume.saturating_mul(u64::from(locations));
        let covered_participants = self.opt_in_rate.covered(total_participants);

        let tier = self.tiers.tier_for(total_participants);
        let location_bonus = self.locations.option_for(locations).bonus;
        let effective_per_participant = round_currency(tier.per_participant + location_bonus);

        let monthly_earnings =
            round_currency(covered_participants as f64 * effective_per_participant);
        let annual_earnings = round_currency(monthly_earnings * 12.0);

        tracing::debug!(
            total_participants,
            covered_participants,
            tier = %tier.name,
            monthly_earnings,
            "Calculated partner earnings"
        );

        EarningsResult {
            total_participants,
            covered_participants,
            tier_name: tier.name.clone(),
            tier_percentage: tier.percentage,
            coverage_percentage: FULL_COVERAGE_PERCENT,
            opt_in_rate: self.opt_in_rate.value(),
            location_bonus,
            effective_per_participant,
            monthly_earnings,
            annual_earnings,
        }
    }

    /// Earnings from an unvalidated numeric volume; malformed values clamp to 0.
    pub fn calculate_raw(&self, raw_volume: f64, locations: u32) -> EarningsResult {
        self.calculate(sanitize_volume(raw_volume), locations)
    }

    /// Monthly commission for `volume` at an explicit opt-in rate and
    /// per-participant bonus, independent of the configured assumptions.
    pub fn monthly_commission(&self, volume: u64, opt_in_rate: OptInRate, bonus: f64) -> f64 {
        let covered = opt_in_rate.covered(volume);
        let tier = self.tiers.tier_for(volume);
        let bonus = if bonus.is_finite() { bonus.max(0.0) } else { 0.0 };
        round_currency(covered as f64 * (tier.per_participant + bonus))
    }

    /// Earnings at each sampled volume for the chart.
    pub fn earnings_curve(&self, locations: u32) -> Vec<EarningsPoint> {
        let bonus = self.locations.option_for(locations).bonus;

        EARNINGS_CURVE_SAMPLES
            .iter()
            .map(|&participants| {
                let tier = self.tiers.tier_for(participants);
                let per_participant = tier.per_participant + bonus;
                let covered = self.opt_in_rate.covered(participants);
                EarningsPoint {
                    participants,
                    earnings: round_currency(covered as f64 * per_participant),
                    tier_label: format!(
                        "{} tier ({}/participant)",
                        format_percentage(tier.percentage),
                        format_currency_cents(per_participant)
                    ),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{landing_tiers, location_schedule, partner_tiers};

    fn partner_calc(rate: f64) -> EarningsCalculator {
        EarningsCalculator::new(Arc::new(partner_tiers()), OptInRate::new(rate).unwrap())
    }

    #[test]
    fn test_wellness_silver_scenario() {
        let calc = partner_calc(0.95);
        let result = calc.calculate_earnings(1000);
        assert_eq!(result.covered_participants, 950);
        assert_eq!(result.tier_name, "Silver");
        assert_eq!(result.tier_percentage, 45.0);
        assert_eq!(result.monthly_earnings, 950.0 * 18.0);
        assert_eq!(result.annual_earnings, 950.0 * 18.0 * 12.0);
        assert_eq!(result.coverage_percentage, 100.0);
    }

    #[test]
    fn test_zero_volume_earns_nothing() {
        let calc = partner_calc(1.0);
        let result = calc.calculate_earnings(0);
        assert_eq!(result.monthly_earnings, 0.0);
        assert_eq!(result.tier_name, "Bronze");
    }

    #[test]
    fn test_earnings_non_negative_and_cent_precision() {
        let calc = partner_calc(0.65);
        for volume in (0..20_000).step_by(137) {
            let result = calc.calculate_earnings(volume);
            assert!(result.monthly_earnings >= 0.0);
            let cents = result.monthly_earnings * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_covered_rounds_half_up() {
        // 1 × 0.5 = 0.5 → 1
        let calc = EarningsCalculator::new(Arc::new(landing_tiers()), OptInRate::new(0.5).unwrap());
        assert_eq!(calc.calculate_earnings(1).covered_participants, 1);
        assert_eq!(calc.calculate_earnings(3).covered_participants, 2);
    }

    #[test]
    fn test_tier_uses_raw_volume() {
        // 1000 raw → Silver even though only 650 are covered
        let calc = partner_calc(0.65);
        let result = calc.calculate_earnings(1000);
        assert_eq!(result.covered_participants, 650);
        assert_eq!(result.tier_name, "Silver");
    }

    #[test]
    fn test_location_bonus() {
        let calc = EarningsCalculator::new(Arc::new(landing_tiers()), OptInRate::new(0.65).unwrap())
            .with_locations(location_schedule());

        let result = calc.calculate(1000, 3);
        assert_eq!(result.total_participants, 3000);
        assert_eq!(result.location_bonus, 0.5);
        assert_eq!(result.covered_participants, 1950);
        // 3000 falls in the 30% tier at $12
        assert_eq!(result.effective_per_participant, 12.5);
        assert_eq!(result.monthly_earnings, 1950.0 * 12.5);

        let result = calc.calculate(2000, 8);
        assert_eq!(result.total_participants, 16000);
        assert_eq!(result.location_bonus, 1.0);
        assert_eq!(result.monthly_earnings, 10400.0 * 15.0);
    }

    #[test]
    fn test_zero_locations_treated_as_one() {
        let calc = partner_calc(1.0);
        assert_eq!(calc.calculate(800, 0).total_participants, 800);
    }

    #[test]
    fn test_location_schedule_lookup() {
        let schedule = location_schedule();
        assert_eq!(schedule.option_for(1).bonus, 0.0);
        assert_eq!(schedule.option_for(3).label, "2-5 Locations");
        assert_eq!(schedule.option_for(8).bonus, 1.0);
        assert_eq!(schedule.option_for(18).bonus, 1.5);
        assert_eq!(schedule.option_for(30).bonus, 2.0);
        assert_eq!(schedule.option_for(0).bonus, 0.0);
    }

    #[test]
    fn test_location_schedule_rejects_gap() {
        let result = LocationSchedule::new(vec![
            LocationOption {
                label: "1".to_string(),
                min_locations: 1,
                max_locations: Some(1),
                bonus: 0.0,
            },
            LocationOption {
                label: "3+".to_string(),
                min_locations: 3,
                max_locations: None,
                bonus: 1.0,
            },
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_location_schedule_rejects_option_after_maximum() {
        let result = LocationSchedule::new(vec![
            LocationOption {
                label: "Any".to_string(),
                min_locations: 1,
                max_locations: Some(u32::MAX),
                bonus: 0.0,
            },
            LocationOption {
                label: "More".to_string(),
                min_locations: 0,
                max_locations: None,
                bonus: 1.0,
            },
        ]);
        assert!(matches!(result, Err(Error::InvalidTable { table: "location", .. })));
    }

    #[test]
    fn test_opt_in_rate_bounds() {
        assert!(OptInRate::new(0.0).is_ok());
        assert!(OptInRate::new(1.0).is_ok());
        assert!(matches!(OptInRate::new(1.2), Err(Error::InvalidOptInRate(_))));
        assert!(OptInRate::new(-0.1).is_err());
        assert!(OptInRate::new(f64::NAN).is_err());
    }

    #[test]
    fn test_monthly_commission() {
        let calc = partner_calc(1.0);
        let base = calc.monthly_commission(1000, OptInRate::new(0.5).unwrap(), 0.0);
        assert_eq!(base, 500.0 * 18.0);
        let with_bonus = calc.monthly_commission(1000, OptInRate::new(0.5).unwrap(), 2.0);
        assert_eq!(with_bonus - base, 500.0 * 2.0);
    }

    #[test]
    fn test_earnings_curve_monotonic() {
        let calc = EarningsCalculator::new(Arc::new(landing_tiers()), OptInRate::new(0.65).unwrap())
            .with_locations(location_schedule());
        let curve = calc.earnings_curve(1);
        assert_eq!(curve.len(), EARNINGS_CURVE_SAMPLES.len());
        for pair in curve.windows(2) {
            assert!(pair[1].earnings >= pair[0].earnings);
        }

        let boosted = calc.earnings_curve(8);
        let at = |points: &[EarningsPoint]| {
            points.iter().find(|p| p.participants == 5000).map(|p| p.earnings).unwrap()
        };
        assert!(at(&boosted) > at(&curve));
    }

    #[test]
    fn test_calculate_raw_clamps() {
        let calc = partner_calc(1.0);
        assert_eq!(calc.calculate_raw(f64::NAN, 1).monthly_earnings, 0.0);
        assert_eq!(calc.calculate_raw(-40.0, 1).total_participants, 0);
    }
}
