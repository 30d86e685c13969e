//! Structural translation from parsed schemas to validators.

use super::{
    FieldValidator, InputShape, ObjectSchema, SchemaKind, SchemaNode, SchemaTranslationError,
    ShapeField, ValidatorKind,
};
use serde_json::Value;

/// Translates a tool's declared parameter schema into an [`InputShape`].
///
/// The resulting shape has exactly one field per entry of the root
/// `properties`, in declaration order. A field is required only when its
/// name appears in `required`; names in `required` without a matching
/// property are ignored.
///
/// # Errors
///
/// Returns [`SchemaTranslationError::NotAnObject`] when the root does not
/// declare `type: "object"`, and the parse errors of [`SchemaNode::parse`]
/// otherwise.
pub fn translate(schema: &Value) -> Result<InputShape, SchemaTranslationError> {
    let declared = schema.get("type").and_then(Value::as_str);
    if declared != Some("object") {
        return Err(SchemaTranslationError::NotAnObject {
            declared: declared.map(str::to_owned),
        });
    }

    let (_, kind) = SchemaNode::parse(schema)?.into_parts();
    match kind {
        SchemaKind::Object(object) => Ok(shape_from_object(object)),
        _ => Err(SchemaTranslationError::NotAnObject {
            declared: declared.map(str::to_owned),
        }),
    }
}

fn shape_from_object(mut object: ObjectSchema) -> InputShape {
    let fields = object
        .take_properties()
        .unwrap_or_default()
        .into_iter()
        .map(|(name, node)| {
            let is_required = object.is_required(&name);
            ShapeField::new(name, validator_for(node), is_required)
        })
        .collect();
    InputShape::new(fields)
}

fn validator_for(node: SchemaNode) -> FieldValidator {
    let (description, kind) = node.into_parts();
    let validator_kind = match kind {
        SchemaKind::String => ValidatorKind::String,
        SchemaKind::Number => ValidatorKind::Number,
        SchemaKind::Boolean => ValidatorKind::Boolean,
        SchemaKind::Array(items) => ValidatorKind::Array(Box::new(
            items.map_or_else(FieldValidator::any, |item| validator_for(*item)),
        )),
        SchemaKind::Object(object) if object.properties().is_some() => {
            ValidatorKind::Object(shape_from_object(object))
        }
        SchemaKind::Object(_) => ValidatorKind::Passthrough,
        SchemaKind::Unknown { .. } => ValidatorKind::Any,
    };
    FieldValidator::new(validator_kind, description)
}
