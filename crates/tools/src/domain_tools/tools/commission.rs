//! Commission Tool
//!
//! Commission owed on premium written at the partner's tier.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use partner_commission_config::EarningsDomainView;
use partner_commission_core::{calculate_commission, format_currency_cents};

use super::commission_tier::tier_json;
use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};
use crate::params;

const TOOL_NAME: &str = "calculate_commission";

pub struct CalculateCommissionTool {
    view: Arc<EarningsDomainView>,
}

impl CalculateCommissionTool {
    pub fn new(view: Arc<EarningsDomainView>) -> Self {
        Self { view }
    }
}

#[async_trait]
impl Tool for CalculateCommissionTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Calculate partner commission on written premium"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("premium", PropertySchema::number("Total premium written"), true)
                .property(
                    "volume",
                    PropertySchema::number("Monthly participant volume used for the tier"),
                    true,
                )
                .property(
                    "policy_count",
                    PropertySchema::integer("Policies sold, for the flat bonus (default 1)"),
                    false,
                )
                .property("partner_id", PropertySchema::string("Partner for tier overrides"), false)
                .property("as_of", PropertySchema::string("Evaluation time (ISO 8601)"), false),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let premium = params::number(&input, &["premium"])?;
        if !premium.is_finite() || premium < 0.0 {
            return Err(ToolError::invalid_params("premium must be a non-negative number"));
        }
        let volume = params::volume(&input, &["volume", "monthly_volume"])?;
        let policy_count = params::count(&input, &["policy_count", "policyCount"], 1)?;
        let now = params::as_of(&input)?;

        let resolved = match params::optional_str(&input, &["partner_id", "partnerId"]) {
            Some(partner_id) => self.view.resolve_for_partner(partner_id, volume, now),
            None => self.view.partner_tiers().resolve_for_partner(volume, None, now),
        };
        let breakdown = calculate_commission(premium, resolved.tier, policy_count);

        Ok(ToolOutput::json(json!({
            "tier": tier_json(resolved.tier),
            "is_override": resolved.is_override,
            "policy_count": policy_count,
            "commission": breakdown,
            "message": format!(
                "Commission of {} at the {} tier.",
                format_currency_cents(breakdown.total_commission),
                resolved.tier.name
            ),
        })))
    }
}
