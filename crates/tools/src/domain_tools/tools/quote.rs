//! Quote Tools
//!
//! Validate quote requests, price validated quotes, and give premium ranges
//! for an event type before the form is complete.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use partner_commission_config::QuoteDomainView;
use partner_commission_core::quote::{QuoteRecord, UnderwritingSubject};
use partner_commission_core::{
    assess_underwriting, format_currency_cents, quick_risk_check, CoverageType,
};

use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};
use crate::params;

/// Default head count for estimates
const ESTIMATE_PARTICIPANTS: u32 = 100;

fn coverage_names() -> Vec<String> {
    CoverageType::ALL.iter().map(|c| c.as_str().to_string()).collect()
}

/// Input properties shared by validation and pricing
pub(crate) fn quote_input_schema() -> InputSchema {
    InputSchema::object()
        .property("event_type", PropertySchema::string("Activity, e.g. 'yoga class'"), true)
        .property(
            "coverage_type",
            PropertySchema::enum_type("Coverage product", coverage_names()),
            true,
        )
        .property(
            "participants",
            PropertySchema::integer("Number of participants").with_range(1.0, 10_000.0),
            true,
        )
        .property("event_date", PropertySchema::string("Event start (ISO 8601)"), true)
        .property(
            "duration_hours",
            PropertySchema::number("Event length in hours (default 2)").with_range(0.5, 24.0),
            false,
        )
        .property("location", PropertySchema::string("Venue description"), false)
        .property("customer_email", PropertySchema::string("Customer email"), false)
        .property("customer_name", PropertySchema::string("Customer name"), false)
        .property(
            "partner_volume",
            PropertySchema::number("Partner monthly participant volume"),
            false,
        )
        .property("as_of", PropertySchema::string("Evaluation time (ISO 8601)"), false)
}

pub struct ValidateQuoteTool {
    view: Arc<QuoteDomainView>,
}

impl ValidateQuoteTool {
    pub fn new(view: Arc<QuoteDomainView>) -> Self {
        Self { view }
    }
}

#[async_trait]
impl Tool for ValidateQuoteTool {
    fn name(&self) -> &str {
        "validate_quote"
    }

    fn description(&self) -> &str {
        "Check a quote request against underwriting rules without pricing it"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: quote_input_schema(),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let quote = params::quote_input(&input)?;
        let now = params::as_of(&input)?;

        let validator = self.view.validator();
        let report = validator.check(&quote, now);
        let review = validator.requires_manual_review(&quote, now);
        let quick_check = quote
            .event_date
            .filter(|_| quote.participants.is_finite() && quote.participants >= 0.0)
            .map(|date| quick_risk_check(&quote.event_type, quote.participants as u32, date, now));

        Ok(ToolOutput::json(json!({
            "valid": report.is_valid(),
            "errors": report.errors,
            "warnings": report.warnings,
            "summary": report.summary(),
            "manual_review": review,
            "quick_check": quick_check,
        })))
    }
}

pub struct CalculateQuotePricingTool {
    view: Arc<QuoteDomainView>,
}

impl CalculateQuotePricingTool {
    pub fn new(view: Arc<QuoteDomainView>) -> Self {
        Self { view }
    }
}

#[async_trait]
impl Tool for CalculateQuotePricingTool {
    fn name(&self) -> &str {
        "calculate_quote_pricing"
    }

    fn description(&self) -> &str {
        "Validate and price an insurance quote for an event"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: quote_input_schema()
                .property(
                    "partner_id",
                    PropertySchema::string("Partner the quote is issued for"),
                    false,
                )
                .property(
                    "all_coverages",
                    PropertySchema::boolean("Also price every other coverage type"),
                    false,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let raw = params::quote_input(&input)?;
        let now = params::as_of(&input)?;
        let partner_id = params::optional_str(&input, &["partner_id", "partnerId"]).map(str::to_string);
        let all_coverages = input
            .get("all_coverages")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let validator = self.view.validator();
        let review = validator.requires_manual_review(&raw, now);
        let quote = match validator.validate(raw, now) {
            Ok(quote) => quote,
            Err(report) => {
                return Ok(ToolOutput::error_json(json!({
                    "valid": false,
                    "errors": report.errors,
                    "warnings": report.warnings,
                    "summary": report.summary(),
                })));
            }
        };

        let engine = self.view.engine();
        let pricing = engine.calculate_pricing(&quote);
        let underwriting = assess_underwriting(&UnderwritingSubject::from_quote(&quote), now);
        let alternatives = if all_coverages {
            Some(engine.calculate_multi_coverage(&quote))
        } else {
            None
        };

        let message = format!(
            "{} coverage for {} participants: {} ({} per participant).",
            pricing.coverage_type,
            quote.participants(),
            format_currency_cents(pricing.premium),
            format_currency_cents(pricing.per_participant)
        );
        let record = QuoteRecord::with_validity(&quote, pricing, partner_id, now, self.view.validity());

        tracing::info!(
            quote_id = %record.id,
            coverage = %record.coverage_type,
            premium = record.pricing.premium,
            "Quote priced"
        );

        Ok(ToolOutput::json(json!({
            "valid": true,
            "quote": record,
            "warnings": quote.warnings(),
            "manual_review": review,
            "underwriting": underwriting,
            "coverages": alternatives,
            "message": message,
        })))
    }
}

pub struct EstimateQuoteRangesTool {
    view: Arc<QuoteDomainView>,
}

impl EstimateQuoteRangesTool {
    pub fn new(view: Arc<QuoteDomainView>) -> Self {
        Self { view }
    }
}

#[async_trait]
impl Tool for EstimateQuoteRangesTool {
    fn name(&self) -> &str {
        "estimate_quote_ranges"
    }

    fn description(&self) -> &str {
        "Low, typical and high premium for each coverage type for an activity"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("event_type", PropertySchema::string("Activity"), true)
                .property(
                    "participants",
                    PropertySchema::integer("Number of participants (default 100)"),
                    false,
                )
                .property("as_of", PropertySchema::string("Evaluation time (ISO 8601)"), false),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let event_type = params::optional_str(&input, &["event_type", "eventType"])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ToolError::invalid_params("event_type is required"))?;
        let participants = params::count(&input, &["participants"], ESTIMATE_PARTICIPANTS)?;
        if participants == 0 {
            return Err(ToolError::invalid_params("participants must be at least 1"));
        }
        let now = params::as_of(&input)?;

        let estimates = self.view.engine().pricing_estimates(event_type, participants, now);

        Ok(ToolOutput::json(json!({
            "event_type": event_type,
            "participants": participants,
            "estimates": estimates,
        })))
    }
}
