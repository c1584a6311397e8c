//! Risk factors for quote pricing
//!
//! Every factor is a multiplier around 1.0. The event-type and coverage
//! factors come from configurable tables; participant, duration, date and
//! location factors follow fixed schedules.

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::types::{CoverageRates, CoverageType, RiskFactors};

/// Duration assumed when the quote does not state one
pub const DEFAULT_DURATION_HOURS: f64 = 2.0;

const INDOOR_KEYWORDS: [&str; 4] = ["gym", "studio", "facility", "indoor"];
const OUTDOOR_KEYWORDS: [&str; 3] = ["park", "field", "track"];
const REMOTE_KEYWORDS: [&str; 4] = ["trail", "mountain", "wilderness", "backcountry"];

/// Risk multiplier for one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeRisk {
    pub activity: String,
    pub risk: f64,
}

/// Inclusive clamp range for a multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBounds {
    pub min: f64,
    pub max: f64,
}

impl RiskBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

/// Tables and bounds the risk model reads from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskTables {
    event_types: Vec<EventTypeRisk>,
    default_event_risk: f64,
    coverage: CoverageRates,
    factor_bounds: RiskBounds,
    multiplier_bounds: RiskBounds,
}

impl RiskTables {
    /// Event types are matched in the given order, so list more specific
    /// activities before the generic ones they contain.
    pub fn new(
        event_types: Vec<EventTypeRisk>,
        default_event_risk: f64,
        coverage: CoverageRates,
        factor_bounds: RiskBounds,
        multiplier_bounds: RiskBounds,
    ) -> Result<Self> {
        let invalid = |message: String| -> Result<Self> {
            Err(Error::InvalidTable {
                table: "risk",
                message,
            })
        };

        if let Some(bad) = event_types
            .iter()
            .find(|e| e.activity.trim().is_empty() || !e.risk.is_finite() || e.risk <= 0.0)
        {
            return invalid(format!("invalid event type entry '{}'", bad.activity));
        }
        if !default_event_risk.is_finite() || default_event_risk <= 0.0 {
            return invalid(format!("default event risk {} must be positive", default_event_risk));
        }
        if !coverage.all_positive() {
            return invalid("coverage risk factors must be positive".to_string());
        }
        if !factor_bounds.is_valid() || !multiplier_bounds.is_valid() {
            return invalid("risk bounds must be positive with min <= max".to_string());
        }

        let event_types = event_types
            .into_iter()
            .map(|e| EventTypeRisk {
                activity: e.activity.trim().to_lowercase(),
                risk: e.risk,
            })
            .collect();

        Ok(Self {
            event_types,
            default_event_risk,
            coverage,
            factor_bounds,
            multiplier_bounds,
        })
    }

    pub fn event_types(&self) -> &[EventTypeRisk] {
        &self.event_types
    }

    pub fn factor_bounds(&self) -> RiskBounds {
        self.factor_bounds
    }

    pub fn multiplier_bounds(&self) -> RiskBounds {
        self.multiplier_bounds
    }

    /// Exact activity match first, then the first table entry whose
    /// activity appears in the event type or contains it.
    pub fn event_type_risk(&self, event_type: &str) -> f64 {
        let normalized = event_type.trim().to_lowercase();
        if normalized.is_empty() {
            return self.default_event_risk;
        }

        if let Some(exact) = self.event_types.iter().find(|e| e.activity == normalized) {
            return exact.risk;
        }

        self.event_types
            .iter()
            .find(|e| normalized.contains(&e.activity) || e.activity.contains(&normalized))
            .map(|e| e.risk)
            .unwrap_or(self.default_event_risk)
    }

    pub fn coverage_risk(&self, coverage: CoverageType) -> f64 {
        self.coverage.get(coverage)
    }

    /// Clamped factors for a quote and the composite multiplier
    pub fn assess(&self, subject: &RiskSubject<'_>) -> (RiskFactors, f64) {
        let clamp = |v: f64| self.factor_bounds.clamp(v);

        let event_type_risk = clamp(self.event_type_risk(subject.event_type));
        let coverage_risk = clamp(self.coverage_risk(subject.coverage_type));
        let factors = RiskFactors {
            event_type_risk,
            coverage_risk,
            base_risk: event_type_risk * coverage_risk,
            participant_risk: clamp(participant_risk(subject.participants)),
            duration_risk: clamp(duration_risk(
                subject.duration_hours.unwrap_or(DEFAULT_DURATION_HOURS),
            )),
            date_risk: clamp(date_risk(subject.event_date)),
            location_risk: clamp(location_risk(subject.location)),
        };

        let multiplier = self.multiplier_bounds.clamp(
            factors.base_risk
                * factors.participant_risk
                * factors.duration_risk
                * factors.date_risk
                * factors.location_risk,
        );

        (factors, multiplier)
    }
}

/// The quote attributes the risk model looks at
#[derive(Debug, Clone, Copy)]
pub struct RiskSubject<'a> {
    pub event_type: &'a str,
    pub coverage_type: CoverageType,
    pub participants: u32,
    pub event_date: DateTime<Utc>,
    pub duration_hours: Option<f64>,
    pub location: Option<&'a str>,
}

/// Larger groups get a per-head discount
pub fn participant_risk(participants: u32) -> f64 {
    match participants {
        0..=10 => 1.0,
        11..=50 => 0.95,
        51..=100 => 0.9,
        101..=500 => 0.85,
        _ => 0.8,
    }
}

pub fn duration_risk(hours: f64) -> f64 {
    if !hours.is_finite() || hours <= 1.0 {
        0.9
    } else if hours <= 2.0 {
        1.0
    } else if hours <= 4.0 {
        1.1
    } else if hours <= 8.0 {
        1.2
    } else {
        1.3
    }
}

/// Weekend and seasonal loadings, evaluated in UTC
pub fn date_risk(date: DateTime<Utc>) -> f64 {
    let mut risk = 1.0;

    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        risk += 0.05;
    }

    match date.month() {
        12 | 1 | 2 => risk += 0.1,
        6..=8 => risk += 0.05,
        _ => {}
    }

    risk
}

pub fn location_risk(location: Option<&str>) -> f64 {
    let Some(location) = location else {
        return 1.0;
    };
    let location = location.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| location.contains(k));

    if mentions(&INDOOR_KEYWORDS) {
        0.9
    } else if mentions(&OUTDOOR_KEYWORDS) {
        1.0
    } else if mentions(&REMOTE_KEYWORDS) {
        1.2
    } else {
        1.0
    }
}
