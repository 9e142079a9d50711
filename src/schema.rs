//! Declarative response-shape validation.
//!
//! Every backend response type declares a `Shape` describing the JSON it
//! expects. [`validate`] checks a decoded payload against that shape before
//! any application code sees it, so malformed responses fail loudly at the
//! boundary instead of surfacing as half-populated values. Validation is
//! all-or-nothing per response.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Payload failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response shape mismatch at {path}: expected {expected}, found {found}")]
pub struct SchemaMismatch {
    /// Location of the offending value, e.g. `$.locations[2].postal_code`.
    pub path: String,
    /// Type the shape called for.
    pub expected: &'static str,
    /// What was actually there ("absent" for a missing required field).
    pub found: String,
}

/// Structural descriptor for a JSON value.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    String,
    Number,
    Bool,
    Object(&'static [Field]),
    Array(&'static Shape),
}

/// One named field inside an object shape.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    name: &'static str,
    shape: Shape,
    mode: FieldMode,
}

#[derive(Debug, Clone, Copy)]
enum FieldMode {
    Required,
    /// Sequence the backend serializes as `null` (or omits entirely) when
    /// empty; consumers see an empty ordered sequence either way.
    NullableSeq,
}

impl Field {
    pub const fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            mode: FieldMode::Required,
        }
    }

    pub const fn nullable_seq(name: &'static str, element: &'static Shape) -> Self {
        Self {
            name,
            shape: Shape::Array(element),
            mode: FieldMode::NullableSeq,
        }
    }
}

/// Response types that carry their own shape descriptor.
pub trait Validated: DeserializeOwned {
    const SHAPE: Shape;
}

/// Check `raw` against `T::SHAPE`, then convert it to `T`.
///
/// Pure function of the raw value and the shape; no partial results.
pub fn validate<T: Validated>(raw: Value) -> Result<T, SchemaMismatch> {
    check(&T::SHAPE, &raw, "$")?;
    serde_json::from_value(raw).map_err(|err| SchemaMismatch {
        path: "$".to_string(),
        expected: std::any::type_name::<T>(),
        found: err.to_string(),
    })
}

fn check(shape: &Shape, value: &Value, path: &str) -> Result<(), SchemaMismatch> {
    match shape {
        Shape::String if value.is_string() => Ok(()),
        Shape::Number if value.is_number() => Ok(()),
        Shape::Bool if value.is_boolean() => Ok(()),
        Shape::Array(element) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch("array", value, path))?;
            for (idx, item) in items.iter().enumerate() {
                check(element, item, &format!("{path}[{idx}]"))?;
            }
            Ok(())
        }
        Shape::Object(fields) => {
            let map = value
                .as_object()
                .ok_or_else(|| mismatch("object", value, path))?;
            for field in *fields {
                let field_path = format!("{path}.{}", field.name);
                match (map.get(field.name), field.mode) {
                    (Some(v), FieldMode::NullableSeq) if v.is_null() => {}
                    (Some(v), _) => check(&field.shape, v, &field_path)?,
                    (None, FieldMode::NullableSeq) => {}
                    (None, FieldMode::Required) => {
                        return Err(SchemaMismatch {
                            path: field_path,
                            expected: type_label(&field.shape),
                            found: "absent".to_string(),
                        });
                    }
                }
            }
            Ok(())
        }
        _ => Err(mismatch(type_label(shape), value, path)),
    }
}

fn mismatch(expected: &'static str, value: &Value, path: &str) -> SchemaMismatch {
    SchemaMismatch {
        path: path.to_string(),
        expected,
        found: json_type(value).to_string(),
    }
}

fn type_label(shape: &Shape) -> &'static str {
    match shape {
        Shape::String => "string",
        Shape::Number => "number",
        Shape::Bool => "boolean",
        Shape::Object(_) => "object",
        Shape::Array(_) => "array",
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
