//! Quote domain types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use super::validation::ValidationIssue;

/// Coverage products offered on a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageType {
    Liability,
    Equipment,
    Cancellation,
}

impl CoverageType {
    pub const ALL: [CoverageType; 3] = [Self::Liability, Self::Equipment, Self::Cancellation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liability => "liability",
            Self::Equipment => "equipment",
            Self::Cancellation => "cancellation",
        }
    }
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoverageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liability" => Ok(Self::Liability),
            "equipment" => Ok(Self::Equipment),
            "cancellation" => Ok(Self::Cancellation),
            _ => Err(Error::UnknownCoverageType(s.to_string())),
        }
    }
}

/// One value per coverage type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageRates {
    pub liability: f64,
    pub equipment: f64,
    pub cancellation: f64,
}

impl CoverageRates {
    pub fn get(&self, coverage: CoverageType) -> f64 {
        match coverage {
            CoverageType::Liability => self.liability,
            CoverageType::Equipment => self.equipment,
            CoverageType::Cancellation => self.cancellation,
        }
    }

    pub(crate) fn all_positive(&self) -> bool {
        CoverageType::ALL
            .iter()
            .all(|c| self.get(*c).is_finite() && self.get(*c) > 0.0)
    }
}

/// Quote request as submitted, before validation.
///
/// Numeric fields stay loosely typed so the validator can report
/// field-level problems instead of failing at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteInput {
    pub event_type: String,
    pub coverage_type: String,
    pub participants: f64,
    /// `None` when missing or unparseable
    pub event_date: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub location: Option<String>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub event_details: Option<Map<String, Value>>,
    /// Partner's monthly participant volume, for discount and commission
    pub partner_volume: Option<u64>,
}

/// A quote that passed every hard validation rule.
///
/// Only `QuoteValidator::validate` can construct one, so pricing is
/// unreachable for input with validation errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedQuote {
    pub(crate) event_type: String,
    pub(crate) coverage_type: CoverageType,
    pub(crate) participants: u32,
    pub(crate) event_date: DateTime<Utc>,
    pub(crate) duration_hours: Option<f64>,
    pub(crate) location: Option<String>,
    pub(crate) customer_email: Option<String>,
    pub(crate) customer_name: Option<String>,
    pub(crate) partner_volume: u64,
    pub(crate) event_details: Option<Map<String, Value>>,
    pub(crate) warnings: Vec<ValidationIssue>,
}

impl ValidatedQuote {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn coverage_type(&self) -> CoverageType {
        self.coverage_type
    }

    pub fn participants(&self) -> u32 {
        self.participants
    }

    pub fn event_date(&self) -> DateTime<Utc> {
        self.event_date
    }

    pub fn duration_hours(&self) -> Option<f64> {
        self.duration_hours
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn partner_volume(&self) -> u64 {
        self.partner_volume
    }

    /// Free-form details from the request form
    pub fn event_details(&self) -> Option<&Map<String, Value>> {
        self.event_details.as_ref()
    }

    /// Soft findings the caller may want to confirm with the user
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    /// Same quote priced under another coverage type
    pub fn with_coverage(&self, coverage_type: CoverageType) -> Self {
        Self {
            coverage_type,
            ..self.clone()
        }
    }
}

/// Individual risk multipliers behind a price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub event_type_risk: f64,
    pub coverage_risk: f64,
    /// event type × coverage
    pub base_risk: f64,
    pub participant_risk: f64,
    pub duration_risk: f64,
    pub date_risk: f64,
    pub location_risk: f64,
}

/// How the final premium was reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub base_premium: f64,
    pub risk_adjustment: f64,
    pub volume_discount: f64,
    pub final_premium: f64,
    /// Final premium was raised to the minimum premium floor
    pub minimum_premium_applied: bool,
}

/// Priced quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub coverage_type: CoverageType,
    pub premium: f64,
    /// Base price per participant before risk
    pub base_price: f64,
    pub per_participant: f64,
    pub commission: f64,
    /// Fraction of premium paid as commission (0.45 = 45%)
    pub commission_rate: f64,
    pub commission_tier: String,
    pub risk_multiplier: f64,
    pub risk_factors: RiskFactors,
    pub breakdown: PricingBreakdown,
}

/// Premium range for one coverage type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingEstimate {
    pub coverage_type: CoverageType,
    pub min_price: f64,
    pub typical: f64,
    pub max_price: f64,
}
