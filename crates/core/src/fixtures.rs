//! Shared test tables

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::earnings::{LocationOption, LocationSchedule};
use crate::quote::{
    CoverageRates, DiscountStep, EventTypeRisk, PricingEngine, QuoteInput, QuoteLimits,
    QuoteValidator, RiskBounds, RiskTables, VolumeDiscountSchedule,
};
use crate::tiers::{CommissionTier, TierTable};

pub fn tier(name: &str, min: u64, max: Option<u64>, percentage: f64, per: f64) -> CommissionTier {
    CommissionTier {
        name: name.to_string(),
        min_volume: min,
        max_volume: max,
        percentage,
        per_participant: per,
        flat_bonus: 0.0,
    }
}

fn with_bonus(mut t: CommissionTier, bonus: f64) -> CommissionTier {
    t.flat_bonus = bonus;
    t
}

pub fn partner_tiers() -> TierTable {
    TierTable::new(vec![
        tier("Bronze", 500, Some(999), 40.0, 16.0),
        with_bonus(tier("Silver", 1000, Some(2499), 45.0, 18.0), 10.0),
        with_bonus(tier("Gold", 2500, Some(4999), 50.0, 20.0), 25.0),
        with_bonus(tier("Platinum", 5000, None, 55.0, 22.0), 50.0),
    ])
    .unwrap()
}

pub fn landing_tiers() -> TierTable {
    TierTable::new(vec![
        tier("Tier 1", 0, Some(999), 25.0, 10.0),
        tier("Tier 2", 1000, Some(2499), 27.5, 11.0),
        tier("Tier 3", 2500, Some(4999), 30.0, 12.0),
        tier("Tier 4", 5000, Some(9999), 32.5, 13.0),
        tier("Tier 5", 10000, Some(24999), 35.0, 14.0),
        tier("Tier 6", 25000, None, 37.5, 15.0),
    ])
    .unwrap()
}

fn location(label: &str, min: u32, max: Option<u32>, bonus: f64) -> LocationOption {
    LocationOption {
        label: label.to_string(),
        min_locations: min,
        max_locations: max,
        bonus,
    }
}

pub fn location_schedule() -> LocationSchedule {
    LocationSchedule::new(vec![
        location("1 Location", 1, Some(1), 0.0),
        location("2-5 Locations", 2, Some(5), 0.5),
        location("6-10 Locations", 6, Some(10), 1.0),
        location("11-25 Locations", 11, Some(25), 1.5),
        location("26+ Locations", 26, None, 2.0),
    ])
    .unwrap()
}

pub fn risk_tables() -> RiskTables {
    let event_types = [
        ("gym session", 0.85),
        ("yoga class", 0.8),
        ("pilates", 0.8),
        ("spin class", 0.9),
        ("swimming", 0.9),
        ("walking group", 0.8),
        ("crossfit", 1.2),
        ("boot camp", 1.15),
        ("running", 1.0),
        ("cycling", 1.1),
        ("5k race", 1.1),
        ("10k race", 1.15),
        ("half marathon", 1.2),
        ("marathon", 1.3),
        ("rock climbing", 1.4),
        ("bouldering", 1.35),
        ("kayaking", 1.3),
        ("paddle boarding", 1.25),
        ("obstacle course", 1.45),
        ("trail running", 1.35),
        ("mountain biking", 1.5),
        ("zip line", 1.7),
        ("white water rafting", 1.8),
        ("skiing", 1.75),
        ("snowboarding", 1.75),
        ("skydiving", 2.0),
        ("paragliding", 1.9),
    ]
    .into_iter()
    .map(|(activity, risk)| EventTypeRisk {
        activity: activity.to_string(),
        risk,
    })
    .collect();

    RiskTables::new(
        event_types,
        1.0,
        CoverageRates {
            liability: 1.0,
            equipment: 1.15,
            cancellation: 1.3,
        },
        RiskBounds { min: 0.7, max: 2.0 },
        RiskBounds { min: 0.5, max: 3.0 },
    )
    .unwrap()
}

pub fn discount_schedule() -> VolumeDiscountSchedule {
    VolumeDiscountSchedule::new(vec![
        DiscountStep { min_volume: 1000, rate: 0.02 },
        DiscountStep { min_volume: 2500, rate: 0.04 },
        DiscountStep { min_volume: 5000, rate: 0.06 },
        DiscountStep { min_volume: 10000, rate: 0.08 },
        DiscountStep { min_volume: 25000, rate: 0.10 },
    ])
    .unwrap()
}

pub fn pricing_engine() -> PricingEngine {
    PricingEngine::new(
        CoverageRates {
            liability: 4.99,
            equipment: 9.99,
            cancellation: 14.99,
        },
        risk_tables(),
        discount_schedule(),
        Arc::new(partner_tiers()),
    )
    .unwrap()
}

pub fn validator() -> QuoteValidator {
    QuoteValidator::new(QuoteLimits::default())
}

/// Ten runners, liability, two hours, no optional details
pub fn quote_input(event_date: DateTime<Utc>) -> QuoteInput {
    QuoteInput {
        event_type: "running".to_string(),
        coverage_type: "liability".to_string(),
        participants: 10.0,
        event_date: Some(event_date),
        duration_hours: Some(2.0),
        ..QuoteInput::default()
    }
}
