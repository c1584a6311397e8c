//! Quote validation, risk assessment, underwriting and pricing

pub mod pricing;
pub mod record;
pub mod risk;
pub mod types;
pub mod underwriting;
pub mod validation;

pub use pricing::{DiscountStep, PricingEngine, VolumeDiscountSchedule, MINIMUM_PREMIUM_FRACTION};
pub use record::{QuoteRecord, QuoteStatus, QUOTE_VALIDITY_DAYS};
pub use risk::{EventTypeRisk, RiskBounds, RiskSubject, RiskTables, DEFAULT_DURATION_HOURS};
pub use types::{
    CoverageRates, CoverageType, PricingBreakdown, PricingEstimate, PricingResult, QuoteInput,
    RiskFactors, ValidatedQuote,
};
pub use underwriting::{
    assess_underwriting, quick_risk_check, FactorImpact, PartnerHistory, QuickRiskCheck,
    RiskAssessment, RiskCategory, RiskLevel, SafetyMeasures, UnderwritingDecision,
    UnderwritingFactor, UnderwritingSubject,
};
pub use validation::{
    IssueCode, ManualReview, QuoteLimits, QuoteValidator, ValidationIssue, ValidationReport,
    MAX_ADVANCE_DAYS, MAX_NOTICE_HOURS,
};
