//! Tool protocol types
//!
//! Tools take a JSON object, return JSON content, and describe their input
//! with a JSON-schema style `ToolSchema`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Tool callable from the API or UI layer
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn schema(&self) -> ToolSchema;

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError>;
}

/// Tool description for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: HashMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: HashMap::new(),
            required: Vec::new(),
        }
    }

    pub fn property(mut self, name: &str, schema: PropertySchema, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub prop_type: String,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl PropertySchema {
    fn typed(prop_type: &str, description: &str) -> Self {
        Self {
            prop_type: prop_type.to_string(),
            description: description.to_string(),
            enum_values: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(description: &str) -> Self {
        Self::typed("string", description)
    }

    pub fn number(description: &str) -> Self {
        Self::typed("number", description)
    }

    pub fn integer(description: &str) -> Self {
        Self::typed("integer", description)
    }

    pub fn boolean(description: &str) -> Self {
        Self::typed("boolean", description)
    }

    pub fn object(description: &str) -> Self {
        Self::typed("object", description)
    }

    pub fn enum_type(description: &str, values: Vec<String>) -> Self {
        Self {
            enum_values: Some(values),
            ..Self::typed("string", description)
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// Tool result content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn json(value: Value) -> Self {
        Self::text(value.to_string())
    }

    /// Structured result the caller must treat as a failure, such as a
    /// rejected quote with its validation report.
    pub fn error_json(value: Value) -> Self {
        Self {
            is_error: true,
            ..Self::json(value)
        }
    }

    /// First text block parsed as JSON
    pub fn to_json(&self) -> Option<Value> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => serde_json::from_str(text).ok(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// JSON-RPC error code
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidParams(_) => -32602,
            Self::NotFound(_) => -32601,
            Self::Internal(_) => -32603,
        }
    }
}
