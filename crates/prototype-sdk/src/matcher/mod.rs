//! Structural matching of raw payloads against registered shapes.
//!
//! [`ShapeDescriptor`] pairs a [`Schema`] with the serde decode function of
//! the concrete Rust type. Both are captured once, at registration, so
//! matching a payload is a pure function of the descriptor and the payload.
//!
//! A match fails (the shape is disqualified) when a value cannot convert to
//! the declared type, when the shape's validation hook rejects the decoded
//! value, or when a mandatory field resolves to its zero value.

mod fields;
mod required;

use std::any::Any;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::PrototypeError;
use crate::schema::{Field, Schema, Shape};

type DecodeFn = fn(&Schema, &Map<String, Value>) -> Result<MatchOutcome, PrototypeError>;

/// Registration-time descriptor for one shape.
pub struct ShapeDescriptor {
    schema: Schema,
    decode: DecodeFn,
    serde_fields: Option<&'static [&'static str]>,
}

impl ShapeDescriptor {
    /// Builds the descriptor for a shape type.
    #[must_use]
    pub fn of<S: Shape>() -> Self {
        Self {
            schema: S::schema(),
            decode: decode_shape::<S>,
            serde_fields: fields::struct_fields::<S>(),
        }
    }

    /// Returns the first top-level schema key the shape's type never
    /// deserializes.
    ///
    /// Only checked when serde exposes the type's field list.
    pub(crate) fn unknown_field(&self) -> Option<&str> {
        let known = self.serde_fields?;
        self.schema
            .fields()
            .iter()
            .map(Field::key)
            .find(|key| !known.iter().any(|name| name == key))
    }

    /// Returns the shape's schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the shape name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.schema.name()
    }
}

impl fmt::Debug for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeDescriptor")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// A payload successfully decoded as some shape.
///
/// Holds the typed value together with its re-encoded JSON object, which is
/// the source of truth for the keys the shape consumed.
pub struct Decoded {
    shape: String,
    value: Box<dyn Any>,
    json: Map<String, Value>,
}

impl Decoded {
    /// Returns the name of the shape that decoded the payload.
    #[must_use]
    pub const fn shape(&self) -> &str {
        self.shape.as_str()
    }

    /// Returns the re-encoded JSON object.
    #[must_use]
    pub const fn json(&self) -> &Map<String, Value> {
        &self.json
    }

    /// Returns the typed value when it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoded")
            .field("shape", &self.shape)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}

/// Why a shape did not match a payload.
///
/// Disqualifications are expected during resolution and never surface as
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disqualification {
    /// A value could not be converted to the declared type.
    Decode {
        /// Decoder message.
        message: String,
    },
    /// The shape's validation hook rejected the decoded value.
    Validation {
        /// Reason returned by the hook.
        reason: String,
    },
    /// A mandatory field held its zero value.
    RequiredField {
        /// Dotted path of the field.
        field: String,
    },
    /// Keys with non-zero values were left unexplained.
    Leftover {
        /// Unexplained keys in key order.
        keys: Vec<String>,
    },
}

impl fmt::Display for Disqualification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { message } => write!(f, "decode failed: {message}"),
            Self::Validation { reason } => write!(f, "validation failed: {reason}"),
            Self::RequiredField { field } => write!(f, "required field {field:?} is unset"),
            Self::Leftover { keys } => write!(f, "unexplained keys: {}", keys.join(", ")),
        }
    }
}

/// Result of matching one shape against one payload.
#[derive(Debug)]
pub enum MatchOutcome {
    /// The payload satisfied the shape.
    Matched(Decoded),
    /// The payload did not satisfy the shape.
    Disqualified(Disqualification),
}

/// Tests whether `raw` satisfies the shape described by `descriptor`.
///
/// The payload is never mutated. A shape without mandatory fields or a
/// validation hook always matches, possibly capturing no keys at all.
///
/// # Errors
///
/// Returns [`PrototypeError::Reencode`] when a decoded value cannot be
/// serialised back into a JSON object; this is a defect in the shape type,
/// not a property of the payload.
pub fn match_shape(
    descriptor: &ShapeDescriptor,
    raw: &Map<String, Value>,
) -> Result<MatchOutcome, PrototypeError> {
    (descriptor.decode)(&descriptor.schema, raw)
}

fn decode_shape<S: Shape>(
    schema: &Schema,
    raw: &Map<String, Value>,
) -> Result<MatchOutcome, PrototypeError> {
    let value: S = match serde_json::from_value(Value::Object(raw.clone())) {
        Ok(value) => value,
        Err(error) => {
            return Ok(MatchOutcome::Disqualified(Disqualification::Decode {
                message: error.to_string(),
            }));
        }
    };

    if let Err(reason) = value.validate() {
        return Ok(MatchOutcome::Disqualified(Disqualification::Validation {
            reason,
        }));
    }

    let encoded = serde_json::to_value(&value).map_err(|error| PrototypeError::Reencode {
        shape: schema.name().to_owned(),
        message: error.to_string(),
    })?;
    let Value::Object(json) = encoded else {
        return Err(PrototypeError::Reencode {
            shape: schema.name().to_owned(),
            message: String::from("shape did not serialise to a JSON object"),
        });
    };

    if let Err(field) = required::validate(schema, &json) {
        return Ok(MatchOutcome::Disqualified(
            Disqualification::RequiredField { field },
        ));
    }

    Ok(MatchOutcome::Matched(Decoded {
        shape: schema.name().to_owned(),
        value: Box::new(value),
        json,
    }))
}

#[cfg(test)]
mod tests;
