//! Domain errors raised while resolving and dispatching prototype messages.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.
//!
//! Shape disqualifications are deliberately absent from [`PrototypeError`]:
//! a payload failing to decode as some shape is how resolution works, so the
//! resolver records those internally and only logs them.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a prototype invocation.
#[derive(Debug, Error)]
pub enum PrototypeError {
    /// No registered object shape and message explained the payload.
    #[error("no object satisfied payload for message '{message}'")]
    NoMatch {
        /// Message that was invoked.
        message: String,
    },

    /// More than one (object, message, request) combination explained the
    /// payload.
    #[error("object is ambiguous for message '{message}': satisfies shapes {}", .shapes.join(", "))]
    Ambiguous {
        /// Message that was invoked.
        message: String,
        /// Every shape that satisfied the payload, in registration order.
        shapes: Vec<String>,
    },

    /// The payload matched object shapes, none of which declare the message.
    #[error("message '{message}' is not supported by object shape(s) {}", .objects.join(", "))]
    UnsupportedMessage {
        /// Message that was invoked.
        message: String,
        /// Shapes that matched the payload.
        objects: Vec<String>,
    },

    /// The bound handler failed.
    #[error("message '{message}' failed: {source}")]
    Handler {
        /// Message whose handler failed.
        message: String,
        /// Error returned by the handler.
        #[source]
        source: HandlerError,
    },

    /// A decoded shape could not be serialised back into a JSON object.
    #[error("shape '{shape}' could not be re-encoded: {message}")]
    Reencode {
        /// Shape name.
        shape: String,
        /// Description of the encoding failure.
        message: String,
    },

    /// The command-line arguments could not be parsed.
    #[error("invalid arguments: {message}")]
    Usage {
        /// Rendered argument parser message.
        message: String,
    },

    /// The request read from stdin was not valid JSON for the protocol.
    #[error("invalid json request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    /// The response file could not be opened.
    #[error("failed to open response file '{path}': {source}")]
    OpenResponse {
        /// Response path from the request.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Writing to the response file failed.
    #[error("failed to write response file '{path}': {source}")]
    WriteResponse {
        /// Response path from the request.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A response value could not be encoded as JSON.
    #[error("failed to encode response: {0}")]
    EncodeResponse(#[source] serde_json::Error),
}

/// Errors detected while assembling the schema registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// An object shape declared an empty name.
    #[error("object shape names must not be empty")]
    EmptyShapeName,

    /// Two object shapes share a name.
    #[error("object shape '{shape}' is already registered")]
    DuplicateShape {
        /// Shape name.
        shape: String,
    },

    /// A message declared an empty name.
    #[error("object shape '{shape}' declares a message with an empty name")]
    EmptyMessageName {
        /// Shape declaring the message.
        shape: String,
    },

    /// A schema names a key its shape's type does not deserialize.
    #[error("shape '{shape}' declares field '{field}' that its type does not deserialize")]
    UnknownField {
        /// Shape whose schema names the key.
        shape: String,
        /// Key missing from the type.
        field: String,
    },

    /// A shape declared the same message twice.
    #[error("object shape '{shape}' declares message '{message}' more than once")]
    DuplicateMessage {
        /// Shape declaring the message.
        shape: String,
        /// Duplicated message name.
        message: String,
    },
}

/// Error returned by message handlers and configuration descriptors.
///
/// # Example
///
/// ```
/// use prototype_sdk::HandlerError;
///
/// let error = HandlerError::new("remote rejected push");
/// assert_eq!(error.to_string(), "remote rejected push");
/// ```
#[derive(Debug)]
pub struct HandlerError {
    message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    /// Creates an error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    #[must_use]
    pub fn with_cause(
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {cause}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_cause("failed to encode result object", error)
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(error: std::io::Error) -> Self {
        Self::with_cause("I/O failure", error)
    }
}
