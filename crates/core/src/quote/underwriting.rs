//! Underwriting risk assessment
//!
//! Scores a quote from 0 to 100, starting at a neutral 50 and moving with
//! each category finding, then maps the score to a risk level and an
//! underwriting decision. Separate from the pricing multipliers in `risk`:
//! this decides whether a quote may be bound, not what it costs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{CoverageType, ValidatedQuote};

pub const BASE_SCORE: i32 = 50;

/// Lower bounds of the medium, high and very-high risk levels
pub const MEDIUM_RISK_SCORE: u8 = 50;
pub const HIGH_RISK_SCORE: u8 = 70;
pub const VERY_HIGH_RISK_SCORE: u8 = 90;

/// Highest score approved without review
pub const AUTO_APPROVE_MAX_SCORE: u8 = 60;
/// Scores from here up always need review
pub const REVIEW_REQUIRED_SCORE: u8 = 80;
/// Scores from here up are declined
pub const DECLINE_SCORE: u8 = 90;
/// Negative findings this severe decline on their own
pub const CRITICAL_SEVERITY: u8 = 9;

/// Quick check: high-risk activities are capped at this group size
pub const QUICK_CHECK_HIGH_RISK_GROUP: u32 = 100;
/// Quick check: events above this always go to manual underwriting
pub const QUICK_CHECK_MAX_PARTICIPANTS: u32 = 5000;

const HIGH_RISK_ACTIVITIES: [&str; 7] = [
    "skydiving",
    "paragliding",
    "bungee jumping",
    "white water rafting",
    "base jumping",
    "hang gliding",
    "cliff diving",
];

const MEDIUM_RISK_ACTIVITIES: [&str; 8] = [
    "rock climbing",
    "mountain biking",
    "skiing",
    "snowboarding",
    "zip line",
    "obstacle course",
    "trail running",
    "kayaking",
];

const LOW_RISK_ACTIVITIES: [&str; 7] = [
    "yoga",
    "pilates",
    "gym session",
    "walking",
    "swimming",
    "cycling",
    "spin class",
];

const INDOOR_KEYWORDS: [&str; 3] = ["indoor", "facility", "gym"];
const REMOTE_KEYWORDS: [&str; 3] = ["wilderness", "remote", "backcountry"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= VERY_HIGH_RISK_SCORE => Self::VeryHigh,
            s if s >= HIGH_RISK_SCORE => Self::High,
            s if s >= MEDIUM_RISK_SCORE => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnderwritingDecision {
    AutoApprove,
    ReviewRequired,
    Decline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorImpact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    ActivityType,
    ParticipantCount,
    EventDate,
    Duration,
    Location,
    PartnerHistory,
    RiskMitigation,
    Organizer,
    CoverageType,
}

/// One finding behind the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingFactor {
    pub category: RiskCategory,
    pub impact: FactorImpact,
    /// 0-10
    pub severity: u8,
    pub description: String,
    /// Points added to (or taken off) the score
    pub score_impact: i32,
}

impl UnderwritingFactor {
    fn new(
        category: RiskCategory,
        impact: FactorImpact,
        severity: u8,
        score_impact: i32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            impact,
            severity,
            description: description.into(),
            score_impact,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.impact == FactorImpact::Negative && self.severity >= CRITICAL_SEVERITY
    }
}

/// Claims record of the partner issuing the quote
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerHistory {
    #[serde(alias = "totalQuotes")]
    pub total_quotes: u64,
    #[serde(alias = "totalPolicies")]
    pub total_policies: u64,
    #[serde(alias = "claimsCount")]
    pub claims_count: u64,
    /// Claims per policy, 0.0-1.0
    #[serde(alias = "claimsRate")]
    pub claims_rate: f64,
}

/// Safety measures the organizer declared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyMeasures {
    pub has_waivers: bool,
    pub has_insurance: bool,
    pub has_medical_staff: bool,
    pub has_emergency_plan: bool,
    pub is_first_time: bool,
}

impl SafetyMeasures {
    /// Read the flags from free-form event details, accepting camelCase
    /// or snake_case keys. `None` when no flag is present.
    pub fn from_details(details: &Map<String, Value>) -> Option<Self> {
        let flag = |camel: &str, snake: &str| {
            details
                .get(camel)
                .or_else(|| details.get(snake))
                .and_then(Value::as_bool)
        };

        let flags = [
            flag("hasWaivers", "has_waivers"),
            flag("hasInsurance", "has_insurance"),
            flag("hasMedicalStaff", "has_medical_staff"),
            flag("hasEmergencyPlan", "has_emergency_plan"),
            flag("isFirstTime", "is_first_time"),
        ];
        if flags.iter().all(Option::is_none) {
            return None;
        }

        let [waivers, insurance, medical, plan, first_time] = flags.map(|f| f.unwrap_or(false));
        Some(Self {
            has_waivers: waivers,
            has_insurance: insurance,
            has_medical_staff: medical,
            has_emergency_plan: plan,
            is_first_time: first_time,
        })
    }
}

/// Everything the underwriting score looks at
#[derive(Debug, Clone)]
pub struct UnderwritingSubject<'a> {
    pub event_type: &'a str,
    pub coverage_type: CoverageType,
    pub participants: u32,
    pub event_date: DateTime<Utc>,
    pub duration_hours: Option<f64>,
    pub location: Option<&'a str>,
    pub partner_history: Option<PartnerHistory>,
    pub safety: Option<SafetyMeasures>,
}

impl<'a> UnderwritingSubject<'a> {
    /// Safety measures are read from the quote's event details
    pub fn from_quote(quote: &'a ValidatedQuote) -> Self {
        Self {
            event_type: quote.event_type(),
            coverage_type: quote.coverage_type(),
            participants: quote.participants(),
            event_date: quote.event_date(),
            duration_hours: quote.duration_hours(),
            location: quote.location(),
            partner_history: None,
            safety: quote.event_details().and_then(SafetyMeasures::from_details),
        }
    }

    pub fn with_partner_history(mut self, history: PartnerHistory) -> Self {
        self.partner_history = Some(history);
        self
    }

    pub fn with_safety(mut self, safety: SafetyMeasures) -> Self {
        self.safety = Some(safety);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk: RiskLevel,
    /// 0-100
    pub risk_score: u8,
    pub decision: UnderwritingDecision,
    pub factors: Vec<UnderwritingFactor>,
    pub recommendations: Vec<String>,
    pub requires_review: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decline_reasons: Vec<String>,
}

/// Score a quote and decide how it should be underwritten
pub fn assess_underwriting(subject: &UnderwritingSubject<'_>, now: DateTime<Utc>) -> RiskAssessment {
    let mut factors = vec![
        activity_factor(subject.event_type),
        participant_factor(subject.participants),
        date_factor(subject.event_date, now),
    ];
    if let Some(hours) = subject.duration_hours.filter(|h| *h > 0.0) {
        factors.push(duration_factor(hours));
    }
    if let Some(location) = subject.location.filter(|l| !l.is_empty()) {
        factors.push(location_factor(location));
    }
    if let Some(history) = &subject.partner_history {
        factors.push(partner_history_factor(history));
    }
    if let Some(safety) = &subject.safety {
        factors.extend(mitigation_factors(safety));
    }
    factors.push(coverage_factor(subject.coverage_type));

    let raw: i32 = BASE_SCORE + factors.iter().map(|f| f.score_impact).sum::<i32>();
    let risk_score = raw.clamp(0, 100) as u8;

    let decision = decide(risk_score, &factors);
    let recommendations = recommendations(subject, &factors, now);
    let decline_reasons = decline_reasons(risk_score, &factors);

    tracing::debug!(
        event_type = subject.event_type,
        risk_score,
        ?decision,
        "Assessed underwriting risk"
    );

    RiskAssessment {
        overall_risk: RiskLevel::from_score(risk_score),
        risk_score,
        decision,
        factors,
        recommendations,
        requires_review: decision == UnderwritingDecision::ReviewRequired,
        decline_reasons,
    }
}

/// Decision for a score; any critical finding declines regardless of score
pub fn decide(score: u8, factors: &[UnderwritingFactor]) -> UnderwritingDecision {
    if score >= DECLINE_SCORE || factors.iter().any(UnderwritingFactor::is_critical) {
        UnderwritingDecision::Decline
    } else if score >= REVIEW_REQUIRED_SCORE {
        UnderwritingDecision::ReviewRequired
    } else if score <= AUTO_APPROVE_MAX_SCORE {
        UnderwritingDecision::AutoApprove
    } else {
        UnderwritingDecision::ReviewRequired
    }
}

/// Outcome of the pre-screen run before a full quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickRiskCheck {
    pub acceptable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl QuickRiskCheck {
    fn rejected(reason: &str) -> Self {
        Self {
            acceptable: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Cheap pre-screen for obvious declines
pub fn quick_risk_check(
    event_type: &str,
    participants: u32,
    event_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> QuickRiskCheck {
    if event_date < now {
        return QuickRiskCheck::rejected("Event date is in the past");
    }
    if is_high_risk_activity(event_type) && participants > QUICK_CHECK_HIGH_RISK_GROUP {
        return QuickRiskCheck::rejected(
            "High-risk activity with large participant count requires manual review",
        );
    }
    if participants > QUICK_CHECK_MAX_PARTICIPANTS {
        return QuickRiskCheck::rejected("Events over 5,000 participants require manual underwriting");
    }

    QuickRiskCheck {
        acceptable: true,
        reason: None,
    }
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn is_high_risk_activity(event_type: &str) -> bool {
    matches_any(&event_type.to_lowercase(), &HIGH_RISK_ACTIVITIES)
}

/// Whole days until the event, rounded down; negative once it has started
fn days_until(event_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (event_date - now).num_seconds();
    seconds.div_euclid(86_400)
}

fn activity_factor(event_type: &str) -> UnderwritingFactor {
    use FactorImpact::*;
    let normalized = event_type.to_lowercase();
    let category = RiskCategory::ActivityType;

    if matches_any(&normalized, &HIGH_RISK_ACTIVITIES) {
        UnderwritingFactor::new(
            category,
            Negative,
            8,
            25,
            format!("{} is classified as a high-risk activity", event_type),
        )
    } else if matches_any(&normalized, &MEDIUM_RISK_ACTIVITIES) {
        UnderwritingFactor::new(
            category,
            Neutral,
            5,
            10,
            format!("{} has moderate risk characteristics", event_type),
        )
    } else if matches_any(&normalized, &LOW_RISK_ACTIVITIES) {
        UnderwritingFactor::new(
            category,
            Positive,
            3,
            -10,
            format!("{} is a low-risk activity", event_type),
        )
    } else {
        UnderwritingFactor::new(
            category,
            Neutral,
            5,
            5,
            format!("{} has unclassified risk level", event_type),
        )
    }
}

fn participant_factor(participants: u32) -> UnderwritingFactor {
    use FactorImpact::*;
    let category = RiskCategory::ParticipantCount;

    match participants {
        n if n > 1000 => UnderwritingFactor::new(
            category,
            Negative,
            6,
            10,
            format!("Large event with {} participants increases complexity", n),
        ),
        n if n > 500 => UnderwritingFactor::new(
            category,
            Neutral,
            4,
            5,
            format!("{} participants - medium-scale event", n),
        ),
        n if n < 10 => UnderwritingFactor::new(
            category,
            Positive,
            2,
            -5,
            format!("Small group ({}) allows better supervision", n),
        ),
        n => UnderwritingFactor::new(
            category,
            Neutral,
            3,
            0,
            format!("{} participants - standard event size", n),
        ),
    }
}

fn date_factor(event_date: DateTime<Utc>, now: DateTime<Utc>) -> UnderwritingFactor {
    use FactorImpact::*;
    let category = RiskCategory::EventDate;

    match days_until(event_date, now) {
        d if d < 0 => UnderwritingFactor::new(category, Negative, 10, 50, "Event date is in the past"),
        d if d < 1 => UnderwritingFactor::new(
            category,
            Negative,
            7,
            15,
            "Event is within 24 hours - limited underwriting time",
        ),
        d if d < 7 => UnderwritingFactor::new(category, Neutral, 4, 5, "Event is within one week"),
        d => UnderwritingFactor::new(
            category,
            Positive,
            2,
            -5,
            format!("Event is {} days away - adequate preparation time", d),
        ),
    }
}

fn duration_factor(hours: f64) -> UnderwritingFactor {
    use FactorImpact::*;
    let category = RiskCategory::Duration;

    if hours > 12.0 {
        UnderwritingFactor::new(
            category,
            Negative,
            6,
            10,
            format!("Extended duration ({} hours) increases exposure", hours),
        )
    } else if hours > 6.0 {
        UnderwritingFactor::new(category, Neutral, 4, 5, format!("Full-day event ({} hours)", hours))
    } else {
        UnderwritingFactor::new(
            category,
            Positive,
            2,
            -3,
            format!("Short duration ({} hours) limits exposure", hours),
        )
    }
}

fn location_factor(location: &str) -> UnderwritingFactor {
    use FactorImpact::*;
    let normalized = location.to_lowercase();
    let category = RiskCategory::Location;

    if matches_any(&normalized, &INDOOR_KEYWORDS) {
        UnderwritingFactor::new(category, Positive, 3, -8, "Controlled indoor environment")
    } else if matches_any(&normalized, &REMOTE_KEYWORDS) {
        UnderwritingFactor::new(
            category,
            Negative,
            7,
            15,
            "Remote location with limited emergency access",
        )
    } else {
        UnderwritingFactor::new(category, Neutral, 4, 3, "Outdoor location")
    }
}

fn partner_history_factor(history: &PartnerHistory) -> UnderwritingFactor {
    use FactorImpact::*;
    let category = RiskCategory::PartnerHistory;
    let rate = history.claims_rate * 100.0;

    if history.total_policies == 0 {
        UnderwritingFactor::new(category, Neutral, 5, 5, "New partner with no claims history")
    } else if history.claims_rate > 0.05 {
        UnderwritingFactor::new(category, Negative, 8, 20, format!("High claims rate ({:.1}%)", rate))
    } else if history.claims_rate > 0.02 {
        UnderwritingFactor::new(category, Neutral, 5, 5, format!("Moderate claims rate ({:.1}%)", rate))
    } else {
        UnderwritingFactor::new(
            category,
            Positive,
            3,
            -10,
            format!("Excellent claims record ({:.1}%)", rate),
        )
    }
}

fn mitigation_factors(safety: &SafetyMeasures) -> Vec<UnderwritingFactor> {
    use FactorImpact::*;
    let mitigation = RiskCategory::RiskMitigation;
    let mut factors = Vec::new();

    if safety.has_waivers {
        factors.push(UnderwritingFactor::new(mitigation, Positive, 3, -5, "Liability waivers in place"));
    }
    if safety.has_medical_staff {
        factors.push(UnderwritingFactor::new(mitigation, Positive, 4, -8, "Medical staff on-site"));
    }
    if safety.has_emergency_plan {
        factors.push(UnderwritingFactor::new(
            mitigation,
            Positive,
            3,
            -5,
            "Emergency response plan documented",
        ));
    }
    if safety.is_first_time {
        factors.push(UnderwritingFactor::new(
            RiskCategory::Organizer,
            Negative,
            5,
            10,
            "First-time event organizer",
        ));
    }

    factors
}

fn coverage_factor(coverage: CoverageType) -> UnderwritingFactor {
    use FactorImpact::*;
    let category = RiskCategory::CoverageType;

    match coverage {
        CoverageType::Cancellation => UnderwritingFactor::new(
            category,
            Neutral,
            6,
            8,
            "Cancellation coverage has complex claim scenarios",
        ),
        CoverageType::Equipment => {
            UnderwritingFactor::new(category, Neutral, 4, 3, "Equipment coverage - moderate complexity")
        }
        CoverageType::Liability => {
            UnderwritingFactor::new(category, Neutral, 3, 0, "General liability coverage")
        }
    }
}

fn recommendations(
    subject: &UnderwritingSubject<'_>,
    factors: &[UnderwritingFactor],
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();

    if factors
        .iter()
        .any(|f| f.category == RiskCategory::ActivityType && f.severity >= 7)
    {
        out.push("Require additional safety documentation and emergency protocols");
        out.push("Verify organizer has appropriate permits and certifications");
    }
    if subject.participants > 500 {
        out.push("Verify adequate medical staff and emergency response capacity");
        out.push("Require detailed safety plan and crowd management procedures");
    }
    if days_until(subject.event_date, now) < 7 {
        out.push("Expedited underwriting review required");
        out.push("Verify all safety measures are already in place");
    }
    if subject
        .location
        .is_some_and(|l| l.to_lowercase().contains("remote"))
    {
        out.push("Confirm emergency evacuation plan and communication systems");
        out.push("Verify satellite phone or emergency beacon availability");
    }
    if subject.safety.is_some_and(|s| s.is_first_time) {
        out.push("Require proof of event insurance and liability coverage");
        out.push("Consider requiring co-organizer with experience");
    }

    out.into_iter().map(str::to_string).collect()
}

fn decline_reasons(score: u8, factors: &[UnderwritingFactor]) -> Vec<String> {
    let mut reasons: Vec<String> = factors
        .iter()
        .filter(|f| f.is_critical())
        .map(|f| f.description.clone())
        .collect();

    if score >= DECLINE_SCORE && reasons.is_empty() {
        reasons.push("Overall risk score exceeds acceptable threshold".to_string());
    }
    reasons
}
