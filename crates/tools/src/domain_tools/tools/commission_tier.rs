//! Commission Tier Tool
//!
//! Resolve a partner's commission tier from monthly participant volume,
//! with progress toward the next tier for the dashboard.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use partner_commission_config::EarningsDomainView;
use partner_commission_core::{format_currency_cents, format_percentage, CommissionTier};

use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};
use crate::params;

const TOOL_NAME: &str = "resolve_commission_tier";

pub struct ResolveCommissionTierTool {
    view: Arc<EarningsDomainView>,
}

impl ResolveCommissionTierTool {
    pub fn new(view: Arc<EarningsDomainView>) -> Self {
        Self { view }
    }
}

pub(crate) fn tier_json(tier: &CommissionTier) -> Value {
    json!({
        "name": tier.name,
        "range": tier.range_label(),
        "min_volume": tier.min_volume,
        "max_volume": tier.max_volume,
        "percentage": tier.percentage,
        "per_participant": tier.per_participant,
        "flat_bonus": tier.flat_bonus,
    })
}

#[async_trait]
impl Tool for ResolveCommissionTierTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Resolve the commission tier for a monthly participant volume"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "volume",
                    PropertySchema::number("Monthly participant volume").with_range(0.0, 1e9),
                    true,
                )
                .property(
                    "partner_id",
                    PropertySchema::string("Partner whose manual tier override should apply"),
                    false,
                )
                .property(
                    "as_of",
                    PropertySchema::string("Evaluation time for override expiry (ISO 8601)"),
                    false,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let volume = params::volume(&input, &["volume", "monthly_volume"])?;
        let now = params::as_of(&input)?;
        let volume_lookup = self.view.resolve_tier(volume);

        let (lookup, is_override, override_reason) =
            match params::optional_str(&input, &["partner_id", "partnerId"]) {
                Some(partner_id) => {
                    let resolved = self.view.resolve_for_partner(partner_id, volume, now);
                    if resolved.is_override {
                        let lookup = self
                            .view
                            .partner_tiers()
                            .resolve_from_tier(resolved.tier, volume);
                        (lookup, true, resolved.override_reason)
                    } else {
                        (volume_lookup.clone(), false, None)
                    }
                }
                None => (volume_lookup.clone(), false, None),
            };
        let effective = lookup.current_tier;

        let message = match lookup.next_tier {
            Some(next) => format!(
                "{} tier at {}. {} more participants to reach {} ({}).",
                effective.name,
                format_percentage(effective.percentage),
                lookup.participants_to_next,
                next.name,
                format_percentage(next.percentage)
            ),
            None => format!(
                "{} tier at {} ({} per participant). This is the top tier.",
                effective.name,
                format_percentage(effective.percentage),
                format_currency_cents(effective.per_participant)
            ),
        };

        Ok(ToolOutput::json(json!({
            "volume": lookup.volume,
            "tier": tier_json(effective),
            "volume_tier": volume_lookup.current_tier.name,
            "next_tier": lookup.next_tier.map(tier_json),
            "participants_to_next": lookup.participants_to_next,
            "percentage_increase": lookup.percentage_increase,
            "progress_percent": lookup.progress_to_next(),
            "below_minimum": volume_lookup.below_minimum,
            "is_top_tier": lookup.is_top_tier(),
            "is_override": is_override,
            "override_reason": override_reason,
            "message": message,
        })))
    }
}
