//! Earnings Calculator Tool
//!
//! Project monthly and annual partner earnings for a participant volume
//! under a named opt-in profile.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use partner_commission_config::EarningsDomainView;
use partner_commission_core::{format_currency, format_percentage};

use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};
use crate::params;

const TOOL_NAME: &str = "calculate_earnings";

pub struct CalculateEarningsTool {
    view: Arc<EarningsDomainView>,
}

impl CalculateEarningsTool {
    pub fn new(view: Arc<EarningsDomainView>) -> Self {
        Self { view }
    }
}

#[async_trait]
impl Tool for CalculateEarningsTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Estimate partner earnings from monthly participant volume"
    }

    fn schema(&self) -> ToolSchema {
        let profiles = self
            .view
            .profile_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "volume",
                    PropertySchema::number("Monthly participants per location").with_range(0.0, 1e9),
                    true,
                )
                .property(
                    "profile",
                    PropertySchema::enum_type("Earnings profile (opt-in assumptions)", profiles),
                    false,
                )
                .property(
                    "locations",
                    PropertySchema::integer("Number of partner locations (default 1)"),
                    false,
                )
                .property(
                    "include_curve",
                    PropertySchema::boolean("Include earnings at sampled volumes for charting"),
                    false,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let volume = params::volume(&input, &["volume", "monthly_volume"])?;
        let locations = params::count(&input, &["locations"], 1)?;
        let profile = params::optional_str(&input, &["profile"]);
        let include_curve = input
            .get("include_curve")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let calculator = self
            .view
            .calculator(profile)
            .map_err(|e| ToolError::invalid_params(e.to_string()))?;
        let result = calculator.calculate(volume, locations);

        let mut output = json!({
            "profile": profile.unwrap_or(self.view.default_profile()),
            "earnings": result,
            "display": {
                "monthly": format_currency(result.monthly_earnings),
                "annual": format_currency(result.annual_earnings),
                "tier_percentage": format_percentage(result.tier_percentage),
            },
            "message": format!(
                "{} covered participants at the {} tier earn about {} per month ({} per year).",
                result.covered_participants,
                result.tier_name,
                format_currency(result.monthly_earnings),
                format_currency(result.annual_earnings)
            ),
        });

        if include_curve {
            output["curve"] = json!(calculator.earnings_curve(locations));
        }

        Ok(ToolOutput::json(output))
    }
}
