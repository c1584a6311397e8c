//! Tool surface for the partner commission and quote pricing engines
//!
//! Tools take loosely typed JSON from forms and API calls, parse it,
//! validate it, and hand typed values to the core engines.

pub mod domain_tools;
pub mod mcp;
pub mod params;
pub mod registry;

pub use domain_tools::{
    AssessQuoteRiskTool, CalculateCommissionTool, CalculateEarningsTool, CalculateQuotePricingTool,
    EstimateQuoteRangesTool, ResolveCommissionTierTool, ValidateQuoteTool,
};
pub use mcp::{ContentBlock, InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};
pub use registry::{create_default_registry, create_registry, ToolExecutor, ToolRegistry};
