//! Explicit structural descriptors for object and request shapes.
//!
//! A [`Schema`] lists the JSON keys a shape declares and which of them are
//! mandatory. Schemas are built once, through [`SchemaBuilder`], when a shape
//! is registered; nothing is derived by inspecting Rust types at runtime.
//! The serde decode function for the concrete type is captured alongside the
//! schema by the matcher, so type conversion and required-field checks share
//! one registration-time descriptor.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A structural type that an incoming payload may match.
///
/// Implementors must tolerate unknown keys when deserialising (do not use
/// `#[serde(deny_unknown_fields)]`): object shapes are decoded against the
/// whole payload, which also carries the keys destined for the request.
///
/// # Example
///
/// ```
/// use prototype_sdk::{Schema, Shape};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Repository {
///     uri: String,
///     private_key: String,
/// }
///
/// impl Shape for Repository {
///     fn schema() -> Schema {
///         Schema::builder("Repository")
///             .required("uri")
///             .optional("private_key")
///             .build()
///     }
/// }
///
/// assert_eq!(Repository::schema().name(), "Repository");
/// ```
pub trait Shape: Serialize + DeserializeOwned + 'static {
    /// Returns the structural descriptor for this shape.
    ///
    /// Keys are the names serde uses for the type's fields. Registration
    /// rejects a top-level key that a plain derived struct does not
    /// deserialize; shapes with flattened fields are not checked.
    fn schema() -> Schema;

    /// Shape-level validation hook run after a successful decode.
    ///
    /// Returning an error disqualifies the shape for the payload being
    /// resolved; it is never reported to the caller.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the decoded value is unacceptable.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Declared structure of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Starts building a schema for the named shape.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Returns the shape name used in diagnostics and ambiguity reports.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a declared field by JSON key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Returns the keys of every mandatory field, including nested ones as
    /// dotted paths.
    #[must_use]
    pub fn required_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_required(self, "", &mut keys);
        keys
    }
}

fn collect_required(schema: &Schema, prefix: &str, keys: &mut Vec<String>) {
    for field in &schema.fields {
        let path = format!("{prefix}{}", field.key);
        if field.required {
            keys.push(path.clone());
        }
        if let Some(nested) = &field.nested {
            collect_required(nested, &format!("{path}."), keys);
        }
    }
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    key: String,
    required: bool,
    nested: Option<Schema>,
}

impl Field {
    /// Returns the JSON key.
    #[must_use]
    pub const fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns whether the field must hold a non-zero value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the schema of a nested shape held by this field.
    #[must_use]
    pub const fn nested(&self) -> Option<&Schema> {
        self.nested.as_ref()
    }
}

/// Builder for [`Schema`].
///
/// Declaring the same key twice keeps the latest declaration, so an embedded
/// shape's field can be tightened by the embedding shape.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Declares a mandatory scalar field.
    #[must_use]
    pub fn required(self, key: impl Into<String>) -> Self {
        self.push(Field {
            key: key.into(),
            required: true,
            nested: None,
        })
    }

    /// Declares an optional scalar field.
    #[must_use]
    pub fn optional(self, key: impl Into<String>) -> Self {
        self.push(Field {
            key: key.into(),
            required: false,
            nested: None,
        })
    }

    /// Declares an optional field holding another shape (or a list of them).
    ///
    /// The nested shape's own mandatory fields are validated whenever the
    /// field is present.
    #[must_use]
    pub fn nested(self, key: impl Into<String>, schema: Schema) -> Self {
        self.push(Field {
            key: key.into(),
            required: false,
            nested: Some(schema),
        })
    }

    /// Declares a mandatory field holding another shape.
    #[must_use]
    pub fn required_nested(self, key: impl Into<String>, schema: Schema) -> Self {
        self.push(Field {
            key: key.into(),
            required: true,
            nested: Some(schema),
        })
    }

    /// Flattens another shape's fields into this one.
    ///
    /// Use this for types that embed another shape with `#[serde(flatten)]`.
    #[must_use]
    pub fn embed(self, schema: Schema) -> Self {
        schema.fields.into_iter().fold(self, Self::push)
    }

    /// Finishes the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            fields: self.fields,
        }
    }

    fn push(mut self, field: Field) -> Self {
        self.fields.retain(|existing| existing.key != field.key);
        self.fields.push(field);
        self
    }
}
