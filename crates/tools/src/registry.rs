//! Tool registry
//!
//! Name-keyed collection of tools with a single `execute` entry point for
//! the API layer.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use partner_commission_config::{ConfigError, EarningsDomainView, PricingDomainConfig, QuoteDomainView};

use crate::domain_tools::{
    AssessQuoteRiskTool, CalculateCommissionTool, CalculateEarningsTool, CalculateQuotePricingTool,
    EstimateQuoteRangesTool, ResolveCommissionTierTool, ValidateQuoteTool,
};
use crate::mcp::{Tool, ToolError, ToolOutput, ToolSchema};

/// Something that can list and run tools by name
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, name: &str, input: Value) -> Result<ToolOutput, ToolError>;

    fn list_tools(&self) -> Vec<ToolSchema>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any tool already registered under the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::warn!(tool = %name, "Replaced existing tool registration");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, name: &str, input: Value) -> Result<ToolOutput, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::not_found(name))?;

        let result = tool.execute(input).await;
        if let Err(e) = &result {
            tracing::debug!(tool = name, error = %e, "Tool call failed");
        }
        result
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }
}

/// Registry with every partner program tool, built from one configuration
pub fn create_registry(config: Arc<PricingDomainConfig>) -> Result<ToolRegistry, ConfigError> {
    let earnings = Arc::new(EarningsDomainView::new(config.clone())?);
    let quotes = Arc::new(QuoteDomainView::new(config)?);

    let mut registry = ToolRegistry::new();
    registry.register(ResolveCommissionTierTool::new(earnings.clone()));
    registry.register(CalculateEarningsTool::new(earnings.clone()));
    registry.register(CalculateCommissionTool::new(earnings));
    registry.register(ValidateQuoteTool::new(quotes.clone()));
    registry.register(CalculateQuotePricingTool::new(quotes.clone()));
    registry.register(AssessQuoteRiskTool::new(quotes.clone()));
    registry.register(EstimateQuoteRangesTool::new(quotes));

    tracing::info!(tools = registry.len(), "Registered partner program tools");
    Ok(registry)
}

/// Registry over the process-wide configuration
pub fn create_default_registry() -> Result<ToolRegistry, ConfigError> {
    create_registry(partner_commission_config::pricing_config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_all_tools() {
        let registry = create_registry(Arc::new(PricingDomainConfig::default())).unwrap();

        assert_eq!(
            registry.names(),
            vec![
                "assess_quote_risk",
                "calculate_commission",
                "calculate_earnings",
                "calculate_quote_pricing",
                "estimate_quote_ranges",
                "resolve_commission_tier",
                "validate_quote",
            ]
        );

        let schemas = registry.list_tools();
        assert_eq!(schemas.len(), 7);
        assert!(schemas.iter().all(|s| s.input_schema.schema_type == "object"));
    }

    #[test]
    fn test_registry_rejects_invalid_config() {
        let mut config = PricingDomainConfig::default();
        config.tiers.partner_program.clear();
        assert!(create_registry(Arc::new(config)).is_err());

        let mut config = PricingDomainConfig::default();
        config.quotes.validity_days = 100_000_000;
        assert!(create_registry(Arc::new(config)).is_err());
    }
}
