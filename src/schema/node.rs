//! Parsed representation of the supported JSON-Schema subset.

use super::SchemaTranslationError;
use serde_json::{Map, Value};

/// Maximum nesting depth accepted when parsing a schema.
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// One node of a parsed parameter schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    description: Option<String>,
    kind: SchemaKind,
}

/// Structural kind of a [`SchemaNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    /// `type: "string"`.
    String,
    /// `type: "number"` or `type: "integer"`.
    Number,
    /// `type: "boolean"`.
    Boolean,
    /// `type: "array"` with optional item schema.
    Array(Option<Box<SchemaNode>>),
    /// `type: "object"`.
    Object(ObjectSchema),
    /// Any other declared type, or none at all.
    Unknown {
        /// Declared type name when the schema carried a string `type`.
        declared: Option<String>,
    },
}

/// Members of an object schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSchema {
    properties: Option<Vec<(String, SchemaNode)>>,
    required: Vec<String>,
}

impl SchemaNode {
    /// Parses a schema value.
    ///
    /// Values that are not JSON objects, or that declare no recognised
    /// `type`, parse as [`SchemaKind::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaTranslationError`] when nesting exceeds
    /// [`MAX_SCHEMA_DEPTH`] or an object schema carries malformed
    /// `properties` or `required` members.
    pub fn parse(value: &Value) -> Result<Self, SchemaTranslationError> {
        Self::parse_at(value, 0, "")
    }

    fn parse_at(value: &Value, depth: usize, path: &str) -> Result<Self, SchemaTranslationError> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(SchemaTranslationError::DepthExceeded {
                limit: MAX_SCHEMA_DEPTH,
                path: display_path(path),
            });
        }

        let description = value
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let declared = value.get("type").and_then(Value::as_str);

        let kind = match declared {
            Some("string") => SchemaKind::String,
            Some("number" | "integer") => SchemaKind::Number,
            Some("boolean") => SchemaKind::Boolean,
            Some("array") => {
                let items_path = format!("{path}[]");
                let items = value
                    .get("items")
                    .map(|items| Self::parse_at(items, depth + 1, &items_path).map(Box::new))
                    .transpose()?;
                SchemaKind::Array(items)
            }
            Some("object") => SchemaKind::Object(ObjectSchema::parse_at(value, depth, path)?),
            other => SchemaKind::Unknown {
                declared: other.map(str::to_owned),
            },
        };

        Ok(Self { description, kind })
    }

    /// Returns the attached description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the structural kind of this node.
    #[must_use]
    pub const fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// Consumes the node, returning its description and kind.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, SchemaKind) {
        (self.description, self.kind)
    }
}

impl ObjectSchema {
    fn parse_at(value: &Value, depth: usize, path: &str) -> Result<Self, SchemaTranslationError> {
        let properties = match value.get("properties") {
            None | Some(Value::Null) => None,
            Some(Value::Object(members)) => Some(parse_properties(members, depth, path)?),
            Some(_) => {
                return Err(SchemaTranslationError::MalformedProperties {
                    path: display_path(path),
                });
            }
        };

        let required = match value.get("required") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            Some(_) => {
                return Err(SchemaTranslationError::MalformedRequired {
                    path: display_path(path),
                });
            }
        };

        Ok(Self {
            properties,
            required,
        })
    }

    /// Returns declared properties in declaration order, or `None` when the
    /// schema declares no `properties` member.
    #[must_use]
    pub fn properties(&self) -> Option<&[(String, SchemaNode)]> {
        self.properties.as_deref()
    }

    /// Returns whether `name` is listed in `required`.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }

    /// Moves the declared properties out, leaving `required` in place.
    pub const fn take_properties(&mut self) -> Option<Vec<(String, SchemaNode)>> {
        self.properties.take()
    }
}

fn parse_properties(
    members: &Map<String, Value>,
    depth: usize,
    path: &str,
) -> Result<Vec<(String, SchemaNode)>, SchemaTranslationError> {
    members
        .iter()
        .map(|(name, member)| {
            let member_path = join_path(path, name);
            SchemaNode::parse_at(member, depth + 1, &member_path).map(|node| (name.clone(), node))
        })
        .collect()
}

pub(super) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}.{name}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        String::from("<root>")
    } else {
        path.to_owned()
    }
}
