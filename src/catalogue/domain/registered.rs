//! Federated tool entries derived from active services.

use super::{ServiceName, ServiceUrl, ToolDescriptor};
use crate::schema::{InputShape, SchemaTranslationError, translate};
use serde_json::{Value, json};

/// Separator between the service name and the tool name.
pub const TOOL_NAME_SEPARATOR: char = '.';

/// Argument contract of a federated tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInputSchema {
    /// Arguments are validated against a translated shape.
    Typed(InputShape),
    /// Any argument object is accepted.
    Untyped,
}

impl ToolInputSchema {
    /// Derives the argument contract from a declared schema.
    ///
    /// An absent schema, or one whose root is not an object, yields
    /// [`ToolInputSchema::Untyped`].
    ///
    /// # Errors
    ///
    /// Returns the translation error when an object schema is malformed or
    /// too deep to translate.
    pub fn from_declared(schema: Option<&Value>) -> Result<Self, SchemaTranslationError> {
        let Some(declared) = schema else {
            return Ok(Self::Untyped);
        };
        match translate(declared) {
            Ok(shape) => Ok(Self::Typed(shape)),
            Err(err) if err.allows_untyped_fallback() => Ok(Self::Untyped),
            Err(err) => Err(err),
        }
    }

    /// Renders the contract as a JSON Schema object.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::Typed(shape) => shape.to_json_schema(),
            Self::Untyped => json!({ "type": "object" }),
        }
    }
}

/// A tool as exposed by the gateway under its federated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTool {
    name: String,
    description: String,
    input_schema: ToolInputSchema,
    service_name: ServiceName,
    service_url: ServiceUrl,
    original_tool_name: String,
}

impl RegisteredTool {
    /// Builds the federated entry for `tool` owned by the given service.
    ///
    /// # Errors
    ///
    /// Returns the translation error when the tool's schema cannot be
    /// translated and no untyped fallback applies.
    pub fn federate(
        service_name: &ServiceName,
        service_url: &ServiceUrl,
        tool: &ToolDescriptor,
    ) -> Result<Self, SchemaTranslationError> {
        let input_schema = ToolInputSchema::from_declared(tool.input_schema())?;
        Ok(Self {
            name: format!("{service_name}{TOOL_NAME_SEPARATOR}{}", tool.name()),
            description: tool.description().to_owned(),
            input_schema,
            service_name: service_name.clone(),
            service_url: service_url.clone(),
            original_tool_name: tool.name().to_owned(),
        })
    }

    /// Returns the federated name, `{service}.{tool}`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the argument contract.
    #[must_use]
    pub const fn input_schema(&self) -> &ToolInputSchema {
        &self.input_schema
    }

    /// Returns the owning service name.
    #[must_use]
    pub const fn service_name(&self) -> &ServiceName {
        &self.service_name
    }

    /// Returns the owning service url.
    #[must_use]
    pub const fn service_url(&self) -> &ServiceUrl {
        &self.service_url
    }

    /// Returns the tool name as known to the downstream service.
    #[must_use]
    pub fn original_tool_name(&self) -> &str {
        &self.original_tool_name
    }
}
