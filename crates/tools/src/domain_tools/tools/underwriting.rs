//! Underwriting Risk Tool
//!
//! Scores a validated quote and returns the underwriting decision with the
//! findings behind it.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use partner_commission_config::QuoteDomainView;
use partner_commission_core::assess_underwriting;
use partner_commission_core::quote::{PartnerHistory, SafetyMeasures, UnderwritingSubject};

use super::quote::quote_input_schema;
use crate::mcp::{PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};
use crate::params;

const TOOL_NAME: &str = "assess_quote_risk";

pub struct AssessQuoteRiskTool {
    view: Arc<QuoteDomainView>,
}

impl AssessQuoteRiskTool {
    pub fn new(view: Arc<QuoteDomainView>) -> Self {
        Self { view }
    }
}

fn parse_object<T: serde::de::DeserializeOwned>(
    input: &Value,
    keys: &[&str],
) -> Result<Option<T>, ToolError> {
    params::field(input, keys)
        .map(|value| {
            serde_json::from_value(value.clone())
                .map_err(|e| ToolError::invalid_params(format!("{}: {}", keys[0], e)))
        })
        .transpose()
}

#[async_trait]
impl Tool for AssessQuoteRiskTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Score underwriting risk for a quote and decide whether it can be auto-approved"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: self.description().to_string(),
            input_schema: quote_input_schema()
                .property(
                    "partner_history",
                    PropertySchema::object(
                        "Claims record: total_quotes, total_policies, claims_count, claims_rate",
                    ),
                    false,
                )
                .property(
                    "safety_measures",
                    PropertySchema::object(
                        "Declared safety flags, overriding any in event_details",
                    ),
                    false,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let raw = params::quote_input(&input)?;
        let now = params::as_of(&input)?;
        let history: Option<PartnerHistory> =
            parse_object(&input, &["partner_history", "partnerHistory"])?;
        let safety: Option<SafetyMeasures> =
            parse_object(&input, &["safety_measures", "safetyMeasures"])?;

        let quote = match self.view.validator().validate(raw, now) {
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

        let mut subject = UnderwritingSubject::from_quote(&quote);
        if let Some(history) = history {
            subject = subject.with_partner_history(history);
        }
        if let Some(safety) = safety {
            subject = subject.with_safety(safety);
        }
        let assessment = assess_underwriting(&subject, now);

        Ok(ToolOutput::json(json!({
            "valid": true,
            "assessment": assessment,
            "message": format!(
                "Risk score {} ({:?}): {:?}.",
                assessment.risk_score, assessment.overall_risk, assessment.decision
            ),
        })))
    }
}
