//! Quote validation
//!
//! Hard rules produce errors and block pricing. Soft rules produce warnings
//! that travel with the validated quote.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::record::{QuoteRecord, QuoteStatus};
use crate::error::Error;
use super::types::{CoverageType, QuoteInput, ValidatedQuote};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static TEST_ENTRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^test|demo|sample").unwrap());

/// Longest notice window any limit may use (ten years)
pub const MAX_NOTICE_HOURS: i64 = 24 * 3650;

/// Furthest ahead an event may be booked
pub const MAX_ADVANCE_DAYS: i64 = 3650;

const EQUIPMENT_DETAIL_KEYS: [&str; 4] = [
    "equipmentType",
    "equipment_type",
    "equipmentValue",
    "equipment_value",
];

/// Machine-readable reason for a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    EventTypeRequired,
    EventTypeTooShort,
    EventTypeTooLong,
    EventTypeTest,
    EventDateInvalid,
    EventDatePast,
    EventDateTooSoon,
    EventDateTooFar,
    EventDateShortNotice,
    EventDateWeekend,
    ParticipantsInvalid,
    ParticipantsNotInteger,
    ParticipantsTooFew,
    ParticipantsTooMany,
    ParticipantsLargeEvent,
    ParticipantsSingle,
    CoverageTypeRequired,
    CoverageTypeInvalid,
    DurationInvalid,
    DurationTooShort,
    DurationTooLong,
    DurationVeryShort,
    DurationExtended,
    LocationTooShort,
    LocationTooLong,
    LocationRemote,
    EmailInvalid,
    EmailTooLong,
    NameTooShort,
    NameTooLong,
    CombinationHighRiskLargeGroup,
    CombinationEquipmentNoDetails,
    CombinationCancellationShortNotice,
    CombinationLongDurationSmallGroup,
    QuoteInvalidStatus,
    QuoteExpired,
    CustomerEmailRequired,
    CustomerNameRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
    pub code: IssueCode,
}

/// Errors and warnings from one validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|i| i.code == code)
    }

    pub fn has_warning(&self, code: IssueCode) -> bool {
        self.warnings.iter().any(|i| i.code == code)
    }

    pub fn summary(&self) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return "All validations passed".to_string();
        }

        let mut parts = Vec::new();
        if !self.errors.is_empty() {
            parts.push(format!("{} error(s)", self.errors.len()));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("{} warning(s)", self.warnings.len()));
        }
        parts.join(", ")
    }

    fn error(&mut self, field: &'static str, code: IssueCode, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field,
            message: message.into(),
            code,
        });
    }

    fn warn(&mut self, field: &'static str, code: IssueCode, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field,
            message: message.into(),
            code,
        });
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Manual underwriting decision with the reasons behind it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManualReview {
    pub required: bool,
    pub reasons: Vec<String>,
}

/// Bounds and keyword lists the validator enforces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteLimits {
    pub min_participants: u32,
    pub max_participants: u32,
    pub min_duration_hours: f64,
    pub max_duration_hours: f64,
    pub min_advance_hours: i64,
    pub max_advance_days: i64,
    pub min_event_type_len: usize,
    pub max_event_type_len: usize,
    pub min_location_len: usize,
    pub max_location_len: usize,
    pub max_email_len: usize,
    pub min_name_len: usize,
    pub max_name_len: usize,
    pub short_notice_hours: i64,
    pub cancellation_notice_hours: i64,
    pub large_event_participants: u32,
    pub high_risk_group_size: u32,
    pub high_risk_activities: Vec<String>,
    pub remote_keywords: Vec<String>,
    pub manual_review_participants: u32,
    pub manual_review_notice_hours: i64,
    pub manual_review_activities: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for QuoteLimits {
    fn default() -> Self {
        Self {
            min_participants: 1,
            max_participants: 10_000,
            min_duration_hours: 0.5,
            max_duration_hours: 24.0,
            min_advance_hours: 4,
            max_advance_days: 365,
            min_event_type_len: 2,
            max_event_type_len: 100,
            min_location_len: 2,
            max_location_len: 200,
            max_email_len: 255,
            min_name_len: 2,
            max_name_len: 100,
            short_notice_hours: 24,
            cancellation_notice_hours: 48,
            large_event_participants: 1000,
            high_risk_group_size: 50,
            high_risk_activities: strings(&[
                "skydiving",
                "paragliding",
                "bungee",
                "white water",
                "cliff diving",
                "base jumping",
            ]),
            remote_keywords: strings(&["remote", "wilderness", "backcountry", "offshore"]),
            manual_review_participants: 2000,
            manual_review_notice_hours: 12,
            manual_review_activities: strings(&["skydiving", "paragliding", "bungee", "base jumping"]),
        }
    }
}

impl QuoteLimits {
    /// Reject limits that are inconsistent or too large for date arithmetic
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |message: String| -> crate::Result<()> {
            Err(Error::InvalidTable {
                table: "quote limits",
                message,
            })
        };

        if self.min_participants == 0 || self.min_participants > self.max_participants {
            return invalid(format!(
                "participant limits {}..{} are inconsistent",
                self.min_participants, self.max_participants
            ));
        }
        if !(self.min_duration_hours > 0.0 && self.min_duration_hours <= self.max_duration_hours) {
            return invalid(format!(
                "duration limits {}..{} are inconsistent",
                self.min_duration_hours, self.max_duration_hours
            ));
        }
        for (name, hours) in [
            ("min_advance_hours", self.min_advance_hours),
            ("short_notice_hours", self.short_notice_hours),
            ("cancellation_notice_hours", self.cancellation_notice_hours),
            ("manual_review_notice_hours", self.manual_review_notice_hours),
        ] {
            if !(0..=MAX_NOTICE_HOURS).contains(&hours) {
                return invalid(format!("{} must be within 0..={}", name, MAX_NOTICE_HOURS));
            }
        }
        if !(1..=MAX_ADVANCE_DAYS).contains(&self.max_advance_days) {
            return invalid(format!("max_advance_days must be within 1..={}", MAX_ADVANCE_DAYS));
        }
        if Duration::hours(self.min_advance_hours) > Duration::days(self.max_advance_days) {
            return invalid("min_advance_hours exceeds max_advance_days".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct QuoteValidator {
    limits: QuoteLimits,
}

impl QuoteValidator {
    pub fn new(limits: QuoteLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &QuoteLimits {
        &self.limits
    }

    /// Run every rule and return all findings
    pub fn check(&self, input: &QuoteInput, now: DateTime<Utc>) -> ValidationReport {
        let mut report = ValidationReport::default();

        self.check_event_type(&input.event_type, &mut report);
        self.check_event_date(input.event_date, now, &mut report);
        self.check_participants(input.participants, &mut report);
        check_coverage_type(&input.coverage_type, &mut report);
        if let Some(duration) = input.duration_hours {
            self.check_duration(duration, &mut report);
        }
        if let Some(location) = input.location.as_deref() {
            self.check_location(location, &mut report);
        }
        if let Some(email) = input.customer_email.as_deref() {
            self.check_email(email, &mut report);
        }
        if let Some(name) = input.customer_name.as_deref() {
            self.check_name(name, &mut report);
        }
        self.check_combinations(input, now, &mut report);

        report
    }

    /// Validate and convert into a quote the pricing engine accepts
    pub fn validate(
        &self,
        input: QuoteInput,
        now: DateTime<Utc>,
    ) -> Result<ValidatedQuote, ValidationReport> {
        let report = self.check(&input, now);
        if !report.is_valid() {
            tracing::debug!(summary = %report, "Quote failed validation");
            return Err(report);
        }

        let (Some(event_date), Ok(coverage_type)) =
            (input.event_date, input.coverage_type.parse::<CoverageType>())
        else {
            return Err(report);
        };

        Ok(ValidatedQuote {
            event_type: input.event_type.trim().to_string(),
            coverage_type,
            participants: input.participants as u32,
            event_date,
            duration_hours: input.duration_hours,
            location: trimmed(input.location),
            customer_email: trimmed(input.customer_email),
            customer_name: trimmed(input.customer_name),
            partner_volume: input.partner_volume.unwrap_or(0),
            event_details: input.event_details,
            warnings: report.warnings,
        })
    }

    pub fn requires_manual_review(&self, input: &QuoteInput, now: DateTime<Utc>) -> ManualReview {
        let limits = &self.limits;
        let mut reasons = Vec::new();

        if input.participants > f64::from(limits.manual_review_participants) {
            reasons.push(format!(
                "Large event ({} participants)",
                input.participants
            ));
        }

        let event_type = input.event_type.to_lowercase();
        if contains_any(&event_type, &limits.manual_review_activities) {
            reasons.push("High-risk activity".to_string());
        }

        if let Some(date) = input.event_date {
            if date - now < Duration::hours(limits.manual_review_notice_hours) {
                reasons.push("Very short notice".to_string());
            }
        }

        if let Some(location) = &input.location {
            if contains_any(&location.to_lowercase(), &limits.remote_keywords) {
                reasons.push("Remote location".to_string());
            }
        }

        ManualReview {
            required: !reasons.is_empty(),
            reasons,
        }
    }

    /// Whether a stored quote can be converted into a policy
    pub fn validate_quote_for_policy(
        &self,
        record: &QuoteRecord,
        now: DateTime<Utc>,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        if record.status != QuoteStatus::Pending {
            report.error(
                "status",
                IssueCode::QuoteInvalidStatus,
                "Only pending quotes can be converted to policies",
            );
        }
        if record.expires_at < now {
            report.error("expiresAt", IssueCode::QuoteExpired, "Quote has expired");
        }
        if record.customer_email.as_deref().map_or(true, str::is_empty) {
            report.error(
                "customerEmail",
                IssueCode::CustomerEmailRequired,
                "Customer email is required to convert to policy",
            );
        }
        if record.customer_name.as_deref().map_or(true, str::is_empty) {
            report.error(
                "customerName",
                IssueCode::CustomerNameRequired,
                "Customer name is required to convert to policy",
            );
        }

        report
    }

    fn check_event_type(&self, event_type: &str, report: &mut ValidationReport) {
        if event_type.is_empty() {
            report.error("eventType", IssueCode::EventTypeRequired, "Event type is required");
            return;
        }

        let trimmed = event_type.trim();
        let len = trimmed.chars().count();
        if len < self.limits.min_event_type_len {
            report.error(
                "eventType",
                IssueCode::EventTypeTooShort,
                format!(
                    "Event type must be at least {} characters",
                    self.limits.min_event_type_len
                ),
            );
        }
        if len > self.limits.max_event_type_len {
            report.error(
                "eventType",
                IssueCode::EventTypeTooLong,
                format!(
                    "Event type must not exceed {} characters",
                    self.limits.max_event_type_len
                ),
            );
        }
        if TEST_ENTRY_PATTERN.is_match(trimmed) {
            report.warn(
                "eventType",
                IssueCode::EventTypeTest,
                "Event type appears to be a test entry",
            );
        }
    }

    fn check_event_date(
        &self,
        event_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        report: &mut ValidationReport,
    ) {
        let Some(date) = event_date else {
            report.error("eventDate", IssueCode::EventDateInvalid, "Valid event date is required");
            return;
        };

        if date < now {
            report.error(
                "eventDate",
                IssueCode::EventDatePast,
                "Event date cannot be in the past",
            );
            return;
        }

        let limits = &self.limits;
        let lead = date - now;
        if lead < Duration::hours(limits.min_advance_hours) {
            report.error(
                "eventDate",
                IssueCode::EventDateTooSoon,
                format!(
                    "Event must be at least {} hours in advance",
                    limits.min_advance_hours
                ),
            );
        }
        if lead > Duration::days(limits.max_advance_days) {
            report.error(
                "eventDate",
                IssueCode::EventDateTooFar,
                format!(
                    "Event date cannot be more than {} days in advance",
                    limits.max_advance_days
                ),
            );
        }
        if lead < Duration::hours(limits.short_notice_hours) {
            report.warn(
                "eventDate",
                IssueCode::EventDateShortNotice,
                format!(
                    "Event is within {} hours - expedited processing required",
                    limits.short_notice_hours
                ),
            );
        }
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            report.warn(
                "eventDate",
                IssueCode::EventDateWeekend,
                "Weekend event - may have higher participation",
            );
        }
    }

    fn check_participants(&self, participants: f64, report: &mut ValidationReport) {
        if !participants.is_finite() {
            report.error(
                "participants",
                IssueCode::ParticipantsInvalid,
                "Valid participant count is required",
            );
            return;
        }

        let limits = &self.limits;
        if participants.fract() != 0.0 {
            report.error(
                "participants",
                IssueCode::ParticipantsNotInteger,
                "Participant count must be a whole number",
            );
        }
        if participants < f64::from(limits.min_participants) {
            report.error(
                "participants",
                IssueCode::ParticipantsTooFew,
                format!("Minimum {} participant required", limits.min_participants),
            );
        }
        if participants > f64::from(limits.max_participants) {
            report.error(
                "participants",
                IssueCode::ParticipantsTooMany,
                format!("Maximum {} participants allowed", limits.max_participants),
            );
        }
        if participants > f64::from(limits.large_event_participants) {
            report.warn(
                "participants",
                IssueCode::ParticipantsLargeEvent,
                "Large event - may require additional underwriting review",
            );
        }
        if participants == 1.0 {
            report.warn(
                "participants",
                IssueCode::ParticipantsSingle,
                "Single participant event - verify this is correct",
            );
        }
    }

    fn check_duration(&self, duration: f64, report: &mut ValidationReport) {
        if !duration.is_finite() {
            report.error("duration", IssueCode::DurationInvalid, "Duration must be a valid number");
            return;
        }

        let limits = &self.limits;
        if duration < limits.min_duration_hours {
            report.error(
                "duration",
                IssueCode::DurationTooShort,
                format!("Duration must be at least {} hours", limits.min_duration_hours),
            );
        }
        if duration > limits.max_duration_hours {
            report.error(
                "duration",
                IssueCode::DurationTooLong,
                format!("Duration cannot exceed {} hours", limits.max_duration_hours),
            );
        }
        if duration < 1.0 {
            report.warn(
                "duration",
                IssueCode::DurationVeryShort,
                "Very short duration - verify this is correct",
            );
        }
        if duration >= 8.0 {
            report.warn(
                "duration",
                IssueCode::DurationExtended,
                "Full-day or multi-day event - extended coverage",
            );
        }
    }

    fn check_location(&self, location: &str, report: &mut ValidationReport) {
        let limits = &self.limits;
        let trimmed = location.trim();
        let len = trimmed.chars().count();

        if len < limits.min_location_len {
            report.error(
                "location",
                IssueCode::LocationTooShort,
                format!("Location must be at least {} characters", limits.min_location_len),
            );
        }
        if len > limits.max_location_len {
            report.error(
                "location",
                IssueCode::LocationTooLong,
                format!("Location must not exceed {} characters", limits.max_location_len),
            );
        }
        if contains_any(&trimmed.to_lowercase(), &limits.remote_keywords) {
            report.warn(
                "location",
                IssueCode::LocationRemote,
                "Remote location - may require additional safety measures",
            );
        }
    }

    fn check_email(&self, email: &str, report: &mut ValidationReport) {
        if !EMAIL_PATTERN.is_match(email) {
            report.error("customerEmail", IssueCode::EmailInvalid, "Invalid email address format");
        }
        if email.chars().count() > self.limits.max_email_len {
            report.error("customerEmail", IssueCode::EmailTooLong, "Email address is too long");
        }
    }

    fn check_name(&self, name: &str, report: &mut ValidationReport) {
        let limits = &self.limits;
        let len = name.trim().chars().count();

        if len < limits.min_name_len {
            report.error(
                "customerName",
                IssueCode::NameTooShort,
                format!("Customer name must be at least {} characters", limits.min_name_len),
            );
        }
        if len > limits.max_name_len {
            report.error(
                "customerName",
                IssueCode::NameTooLong,
                format!("Customer name must not exceed {} characters", limits.max_name_len),
            );
        }
    }

    fn check_combinations(&self, input: &QuoteInput, now: DateTime<Utc>, report: &mut ValidationReport) {
        let limits = &self.limits;
        let coverage = input.coverage_type.parse::<CoverageType>().ok();

        if contains_any(&input.event_type.to_lowercase(), &limits.high_risk_activities)
            && input.participants > f64::from(limits.high_risk_group_size)
        {
            report.warn(
                "eventType",
                IssueCode::CombinationHighRiskLargeGroup,
                "High-risk activity with large group - may require manual underwriting",
            );
        }

        if coverage == Some(CoverageType::Equipment) {
            if let Some(details) = &input.event_details {
                let has_details = EQUIPMENT_DETAIL_KEYS
                    .iter()
                    .any(|key| details.get(*key).is_some_and(is_present));
                if !has_details {
                    report.warn(
                        "eventDetails",
                        IssueCode::CombinationEquipmentNoDetails,
                        "Equipment coverage selected but no equipment details provided",
                    );
                }
            }
        }

        if coverage == Some(CoverageType::Cancellation) {
            if let Some(date) = input.event_date {
                if date - now < Duration::hours(limits.cancellation_notice_hours) {
                    report.warn(
                        "coverageType",
                        IssueCode::CombinationCancellationShortNotice,
                        format!(
                            "Cancellation coverage less than {} hours before event",
                            limits.cancellation_notice_hours
                        ),
                    );
                }
            }
        }

        if input.duration_hours.is_some_and(|d| d > 8.0) && input.participants < 5.0 {
            report.warn(
                "duration",
                IssueCode::CombinationLongDurationSmallGroup,
                "Extended duration for small group - verify event details",
            );
        }
    }
}

fn check_coverage_type(coverage_type: &str, report: &mut ValidationReport) {
    if coverage_type.is_empty() {
        report.error("coverageType", IssueCode::CoverageTypeRequired, "Coverage type is required");
        return;
    }

    if coverage_type.parse::<CoverageType>().is_err() {
        let names: Vec<_> = CoverageType::ALL.iter().map(|c| c.as_str()).collect();
        report.error(
            "coverageType",
            IssueCode::CoverageTypeInvalid,
            format!("Coverage type must be one of: {}", names.join(", ")),
        );
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => true,
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
