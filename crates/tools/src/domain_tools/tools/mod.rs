//! Partner program tool implementations
//!
//! Each tool is in its own module for better maintainability.

mod commission;
mod commission_tier;
mod earnings;
mod quote;
mod underwriting;

pub use commission::CalculateCommissionTool;
pub use commission_tier::ResolveCommissionTierTool;
pub use earnings::CalculateEarningsTool;
pub use quote::{CalculateQuotePricingTool, EstimateQuoteRangesTool, ValidateQuoteTool};
pub use underwriting::AssessQuoteRiskTool;
