//! Typed argument validators produced by schema translation.

use super::node::join_path;
use super::{ArgumentErrors, ArgumentIssue};
use serde_json::{Map, Value, json};

/// Validator for a tool's argument object.
///
/// Fields keep the declaration order of the source schema. Keys that the
/// shape does not mention are accepted unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputShape {
    fields: Vec<ShapeField>,
}

/// A named field of an [`InputShape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeField {
    name: String,
    validator: FieldValidator,
    required: bool,
}

/// Validator for one value, with its optional description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidator {
    kind: ValidatorKind,
    description: Option<String>,
}

/// Structural check applied by a [`FieldValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorKind {
    /// Accepts JSON strings.
    String,
    /// Accepts JSON numbers, integral or not.
    Number,
    /// Accepts JSON booleans.
    Boolean,
    /// Accepts arrays whose every element passes the item validator.
    Array(Box<FieldValidator>),
    /// Accepts objects matching a nested shape.
    Object(InputShape),
    /// Accepts any JSON object.
    Passthrough,
    /// Accepts any value.
    Any,
}

impl ValidatorKind {
    const fn expected(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) | Self::Passthrough => "object",
            Self::Any => "any",
        }
    }
}

impl InputShape {
    /// Creates a shape from ordered fields.
    #[must_use]
    pub const fn new(fields: Vec<ShapeField>) -> Self {
        Self { fields }
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[ShapeField] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ShapeField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Validates an argument object against this shape.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentErrors`] listing every failing path when the value
    /// is not an object, a required field is absent, or a present field has
    /// the wrong type.
    pub fn validate(&self, arguments: &Value) -> Result<(), ArgumentErrors> {
        let mut issues = Vec::new();
        self.check_object(arguments, "", &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ArgumentErrors::new(issues))
        }
    }

    /// Renders the shape as a JSON Schema object.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.validator.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.as_str())
            .collect();

        let mut schema = json!({ "type": "object", "properties": properties });
        if !required.is_empty()
            && let Some(object) = schema.as_object_mut()
        {
            object.insert(String::from("required"), json!(required));
        }
        schema
    }

    fn check_object(&self, value: &Value, path: &str, issues: &mut Vec<ArgumentIssue>) {
        let Some(members) = value.as_object() else {
            issues.push(mismatch(path, "object", value));
            return;
        };

        for field in &self.fields {
            let field_path = join_path(path, &field.name);
            match members.get(&field.name) {
                Some(member) => field.validator.check(member, &field_path, issues),
                None if field.required => {
                    issues.push(ArgumentIssue::new(field_path, "required field is missing"));
                }
                None => {}
            }
        }
    }
}

impl ShapeField {
    /// Creates a field.
    #[must_use]
    pub fn new(name: impl Into<String>, validator: FieldValidator, required: bool) -> Self {
        Self {
            name: name.into(),
            validator,
            required,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value validator.
    #[must_use]
    pub const fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    /// Returns whether the field must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

impl FieldValidator {
    /// Creates a validator.
    #[must_use]
    pub const fn new(kind: ValidatorKind, description: Option<String>) -> Self {
        Self { kind, description }
    }

    /// Creates a validator accepting any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(ValidatorKind::Any, None)
    }

    /// Returns the structural check.
    #[must_use]
    pub const fn kind(&self) -> &ValidatorKind {
        &self.kind
    }

    /// Returns the attached description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn check(&self, value: &Value, path: &str, issues: &mut Vec<ArgumentIssue>) {
        let matches = match &self.kind {
            ValidatorKind::String => value.is_string(),
            ValidatorKind::Number => value.is_number(),
            ValidatorKind::Boolean => value.is_boolean(),
            ValidatorKind::Passthrough => value.is_object(),
            ValidatorKind::Any => true,
            ValidatorKind::Object(shape) => {
                shape.check_object(value, path, issues);
                return;
            }
            ValidatorKind::Array(items) => {
                let Some(elements) = value.as_array() else {
                    issues.push(mismatch(path, "array", value));
                    return;
                };
                for (index, element) in elements.iter().enumerate() {
                    items.check(element, &format!("{path}[{index}]"), issues);
                }
                return;
            }
        };

        if !matches {
            issues.push(mismatch(path, self.kind.expected(), value));
        }
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = match &self.kind {
            ValidatorKind::String => json!({ "type": "string" }),
            ValidatorKind::Number => json!({ "type": "number" }),
            ValidatorKind::Boolean => json!({ "type": "boolean" }),
            ValidatorKind::Array(items) => json!({ "type": "array", "items": items.to_json_schema() }),
            ValidatorKind::Object(shape) => shape.to_json_schema(),
            ValidatorKind::Passthrough => json!({ "type": "object" }),
            ValidatorKind::Any => json!({}),
        };
        if let Some(description) = &self.description
            && let Some(object) = schema.as_object_mut()
        {
            object.insert(String::from("description"), json!(description));
        }
        schema
    }
}

fn mismatch(path: &str, expected: &str, actual: &Value) -> ArgumentIssue {
    ArgumentIssue::new(
        path,
        format!("expected {expected}, received {}", json_type_name(actual)),
    )
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
