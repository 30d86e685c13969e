//! Tool descriptor value object.

use super::CatalogueDomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A tool as reported by a downstream service.
///
/// The schema is kept opaque here; translation happens when the federated
/// catalogue is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_schema: Option<Value>,
}

impl ToolDescriptor {
    /// Creates a tool descriptor.
    ///
    /// The name is kept verbatim because calls are forwarded under it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueDomainError::EmptyToolName`] when the name is
    /// blank.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Option<Value>,
    ) -> Result<Self, CatalogueDomainError> {
        let tool_name = name.into();
        if tool_name.trim().is_empty() {
            return Err(CatalogueDomainError::EmptyToolName);
        }

        Ok(Self {
            name: tool_name,
            description: description.into(),
            input_schema,
        })
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared parameter schema.
    #[must_use]
    pub const fn input_schema(&self) -> Option<&Value> {
        self.input_schema.as_ref()
    }
}

/// Removes tools whose name repeats an earlier tool.
///
/// Returns the kept tools in their original order and the names of the
/// dropped duplicates.
#[must_use]
pub fn dedupe_tools(tools: Vec<ToolDescriptor>) -> (Vec<ToolDescriptor>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut dropped = Vec::new();
    let kept = tools
        .into_iter()
        .filter(|tool| {
            if seen.insert(tool.name.clone()) {
                true
            } else {
                dropped.push(tool.name.clone());
                false
            }
        })
        .collect();
    (kept, dropped)
}
