//! Built-in business tables
//!
//! Defaults for every table the engines read. `config/base/pricing.yaml`
//! mirrors these values; a deployment overrides them there or through
//! `PARTNER_COMMISSION__*` environment variables.

/// Partner program tiers: (name, min, max, percent, per participant, flat bonus)
///
/// Per-participant amounts are the tier percentage of a $40 reference
/// premium.
pub mod partner_program {
    pub const REFERENCE_PREMIUM: f64 = 40.0;

    pub const TIERS: [(&str, u64, Option<u64>, f64, f64, f64); 4] = [
        ("Bronze", 500, Some(999), 40.0, 16.0, 0.0),
        ("Silver", 1000, Some(2499), 45.0, 18.0, 10.0),
        ("Gold", 2500, Some(4999), 50.0, 20.0, 25.0),
        ("Platinum", 5000, None, 55.0, 22.0, 50.0),
    ];
}

/// Public landing page calculator tiers, starting at zero volume
pub mod landing_calculator {
    pub const TIERS: [(&str, u64, Option<u64>, f64, f64); 6] = [
        ("Tier 1", 0, Some(999), 25.0, 10.0),
        ("Tier 2", 1000, Some(2499), 27.5, 11.0),
        ("Tier 3", 2500, Some(4999), 30.0, 12.0),
        ("Tier 4", 5000, Some(9999), 32.5, 13.0),
        ("Tier 5", 10000, Some(24999), 35.0, 14.0),
        ("Tier 6", 25000, None, 37.5, 15.0),
    ];
}

/// Share of participants expected to buy coverage, per earnings surface
pub mod opt_in {
    pub const PARTNER_DASHBOARD: &str = "partner_dashboard";
    pub const WELLNESS: &str = "wellness";
    pub const LANDING_CALCULATOR: &str = "landing_calculator";

    pub const PARTNER_DASHBOARD_RATE: f64 = 1.0;
    pub const WELLNESS_RATE: f64 = 0.95;
    pub const LANDING_CALCULATOR_RATE: f64 = 0.65;

    pub const DEFAULT_PROFILE: &str = PARTNER_DASHBOARD;
}

/// Per-participant bonus by number of partner locations
pub mod locations {
    pub const OPTIONS: [(&str, u32, Option<u32>, f64); 5] = [
        ("1 Location", 1, Some(1), 0.0),
        ("2-5 Locations", 2, Some(5), 0.5),
        ("6-10 Locations", 6, Some(10), 1.0),
        ("11-25 Locations", 11, Some(25), 1.5),
        ("26+ Locations", 26, None, 2.0),
    ];
}

/// Quote pricing tables
pub mod pricing {
    /// Base price per participant (liability, equipment, cancellation)
    pub const BASE_LIABILITY: f64 = 4.99;
    pub const BASE_EQUIPMENT: f64 = 9.99;
    pub const BASE_CANCELLATION: f64 = 14.99;

    pub const COVERAGE_RISK_LIABILITY: f64 = 1.0;
    pub const COVERAGE_RISK_EQUIPMENT: f64 = 1.15;
    pub const COVERAGE_RISK_CANCELLATION: f64 = 1.3;

    /// Unknown activities
    pub const DEFAULT_EVENT_RISK: f64 = 1.0;

    pub const FACTOR_MIN: f64 = 0.7;
    pub const FACTOR_MAX: f64 = 2.0;
    pub const MULTIPLIER_MIN: f64 = 0.5;
    pub const MULTIPLIER_MAX: f64 = 3.0;

    pub const MINIMUM_PREMIUM_FRACTION: f64 = 0.5;

    /// Days a quote stays open
    pub const QUOTE_VALIDITY_DAYS: i64 = 30;

    /// Longest configurable quote validity
    pub const MAX_QUOTE_VALIDITY_DAYS: i64 = 3650;

    /// Activity risk, matched in order (exact first, then partial)
    pub const EVENT_TYPES: [(&str, f64); 27] = [
        // low
        ("gym session", 0.85),
        ("yoga class", 0.8),
        ("pilates", 0.8),
        ("spin class", 0.9),
        ("swimming", 0.9),
        ("walking group", 0.8),
        // medium
        ("crossfit", 1.2),
        ("boot camp", 1.15),
        ("running", 1.0),
        ("cycling", 1.1),
        ("5k race", 1.1),
        ("10k race", 1.15),
        ("half marathon", 1.2),
        ("marathon", 1.3),
        // high
        ("rock climbing", 1.4),
        ("bouldering", 1.35),
        ("kayaking", 1.3),
        ("paddle boarding", 1.25),
        ("obstacle course", 1.45),
        ("trail running", 1.35),
        ("mountain biking", 1.5),
        // very high
        ("zip line", 1.7),
        ("white water rafting", 1.8),
        ("skiing", 1.75),
        ("snowboarding", 1.75),
        ("skydiving", 2.0),
        ("paragliding", 1.9),
    ];

    /// Volume discount by partner monthly volume: (min volume, rate)
    pub const VOLUME_DISCOUNTS: [(u64, f64); 5] = [
        (1000, 0.02),
        (2500, 0.04),
        (5000, 0.06),
        (10000, 0.08),
        (25000, 0.10),
    ];
}
