//! Wire types exchanged with the pipeline runtime.
//!
//! The runtime launches the prototype once per request and writes a single
//! JSON [`PrototypeRequest`] to stdin. Without a message argument the
//! prototype answers with one [`InfoResponse`]; with a message argument it
//! answers with a stream of [`MessageResponse`] values, one per line. Both
//! are written to the file named by `response_path`, never to stdout.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::HandlerError;

/// Version of the prototype interface implemented by this crate.
pub const INTERFACE_VERSION: &str = "1.0";

/// Request read from stdin for both introspection and message invocation.
///
/// # Example
///
/// ```
/// use prototype_sdk::PrototypeRequest;
///
/// let request: PrototypeRequest = serde_json::from_str(
///     r#"{"object": {"uri": "https://example.com/repo.git"}, "response_path": "/tmp/out"}"#,
/// )
/// .expect("valid request");
/// assert_eq!(request.response_path().as_str(), "/tmp/out");
/// assert!(request.object().contains_key("uri"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrototypeRequest {
    #[serde(default)]
    object: Map<String, Value>,
    response_path: Utf8PathBuf,
}

impl PrototypeRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(object: Map<String, Value>, response_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            object,
            response_path: response_path.into(),
        }
    }

    /// Returns the object to act on.
    #[must_use]
    pub const fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    /// Returns the path the response must be written to.
    #[must_use]
    pub fn response_path(&self) -> &Utf8Path {
        self.response_path.as_path()
    }
}

/// Response to an introspection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    interface_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    messages: Vec<MessageInfo>,
}

impl InfoResponse {
    /// Creates a response for the current interface version.
    #[must_use]
    pub fn new(icon: Option<String>, messages: Vec<MessageInfo>) -> Self {
        Self {
            interface_version: INTERFACE_VERSION.to_owned(),
            icon,
            messages,
        }
    }

    /// Returns the interface version.
    #[must_use]
    pub const fn interface_version(&self) -> &str {
        self.interface_version.as_str()
    }

    /// Returns the icon identifier, e.g. `mdi:git`.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Returns the applicable messages.
    #[must_use]
    pub fn messages(&self) -> &[MessageInfo] {
        &self.messages
    }

    /// Returns the names of the applicable messages in listing order.
    #[must_use]
    pub fn message_names(&self) -> Vec<&str> {
        self.messages.iter().map(MessageInfo::name).collect()
    }
}

/// One applicable message in an [`InfoResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<Config>,
}

impl MessageInfo {
    /// Creates an entry without configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
        }
    }

    /// Attaches the computed configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Returns the message name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the computed configuration, if the message declares one.
    #[must_use]
    pub const fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }
}

/// A result object produced by a message handler.
///
/// The object may contain literal data and [`Artifact`](crate::Artifact)
/// markers.
///
/// # Example
///
/// ```
/// use prototype_sdk::MessageResponse;
///
/// let response = MessageResponse::new(&serde_json::json!({"ref": "abcdef"}))
///     .expect("serialisable")
///     .with_metadata("author", "someone");
/// assert_eq!(response.object()["ref"], "abcdef");
/// assert_eq!(response.metadata().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    object: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    metadata: Vec<MetadataField>,
}

impl MessageResponse {
    /// Serialises any result object into a response.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] if the object cannot be serialised.
    pub fn new<T: Serialize + ?Sized>(object: &T) -> Result<Self, HandlerError> {
        Ok(Self::from_value(serde_json::to_value(object)?))
    }

    /// Wraps an already-encoded result object.
    #[must_use]
    pub const fn from_value(object: Value) -> Self {
        Self {
            object,
            metadata: Vec::new(),
        }
    }

    /// Appends a metadata field shown to the user.
    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataField::new(name, value));
        self
    }

    /// Returns the result object.
    #[must_use]
    pub const fn object(&self) -> &Value {
        &self.object
    }

    /// Returns the metadata fields.
    #[must_use]
    pub fn metadata(&self) -> &[MetadataField] {
        &self.metadata
    }
}

/// A named piece of metadata attached to a result object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    name: String,
    value: String,
}

impl MetadataField {
    /// Creates a metadata field.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the field value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.value.as_str()
    }
}
