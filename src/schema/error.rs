//! Errors produced while translating schemas and validating arguments.

use thiserror::Error;

/// Reasons a declared tool schema cannot be translated into a typed shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaTranslationError {
    /// The root schema does not declare `type: "object"`.
    #[error("root schema must declare type 'object' (found {})", .declared.as_deref().unwrap_or("no type"))]
    NotAnObject {
        /// Declared root type, when one was present.
        declared: Option<String>,
    },

    /// The schema nests deeper than the supported limit.
    #[error("schema nesting exceeds {limit} levels at '{path}'")]
    DepthExceeded {
        /// Maximum supported depth.
        limit: usize,
        /// Path of the node that crossed the limit.
        path: String,
    },

    /// A `properties` member is present but is not a JSON object.
    #[error("'properties' at '{path}' must be an object")]
    MalformedProperties {
        /// Path of the offending object schema.
        path: String,
    },

    /// A `required` member is present but is not an array.
    #[error("'required' at '{path}' must be an array of property names")]
    MalformedRequired {
        /// Path of the offending object schema.
        path: String,
    },
}

impl SchemaTranslationError {
    /// Returns whether the tool may still be exposed with an untyped
    /// argument bag after this failure.
    #[must_use]
    pub const fn allows_untyped_fallback(&self) -> bool {
        matches!(self, Self::NotAnObject { .. })
    }
}

/// A single argument validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentIssue {
    /// Dotted path of the offending value; empty for the argument root.
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ArgumentIssue {
    /// Creates a validation issue.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// All validation failures found in one argument object.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid arguments: {}", render_issues(.issues))]
pub struct ArgumentErrors {
    issues: Vec<ArgumentIssue>,
}

impl ArgumentErrors {
    /// Wraps a non-empty list of issues.
    #[must_use]
    pub const fn new(issues: Vec<ArgumentIssue>) -> Self {
        Self { issues }
    }

    /// Returns the individual issues in discovery order.
    #[must_use]
    pub fn issues(&self) -> &[ArgumentIssue] {
        &self.issues
    }
}

fn render_issues(issues: &[ArgumentIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                issue.message.clone()
            } else {
                format!("{}: {}", issue.path, issue.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
