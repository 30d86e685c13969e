//! Translation of tool parameter schemas into argument validators.
//!
//! Downstream services describe tool parameters with a loosely-typed subset
//! of JSON Schema. The gateway re-exposes every tool through its own MCP
//! endpoint and validates inbound arguments before forwarding, so each
//! declared schema is translated once, at catalogue build time, into an
//! [`InputShape`]:
//!
//! - [`SchemaNode`] is the parsed form of a schema: a closed, recursive
//!   tagged union that rejects malformed `properties` or `required` members
//!   and bounds nesting at [`MAX_SCHEMA_DEPTH`].
//! - [`translate`] maps a parsed object schema onto validators by structural
//!   pattern match.
//! - [`InputShape::validate`] checks an argument object and reports every
//!   issue with its path.
//!
//! Translation is pure and deterministic; translating the same schema twice
//! yields equal shapes.

mod error;
mod node;
mod shape;
mod translate;

pub use error::{ArgumentErrors, ArgumentIssue, SchemaTranslationError};
pub use node::{MAX_SCHEMA_DEPTH, ObjectSchema, SchemaKind, SchemaNode};
pub use shape::{FieldValidator, InputShape, ShapeField, ValidatorKind};
pub use translate::translate;

#[cfg(test)]
mod tests;
