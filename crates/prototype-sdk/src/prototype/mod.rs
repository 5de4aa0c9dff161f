//! The assembled prototype: registry, dispatcher and icon.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::dispatch::Dispatcher;
use crate::error::{PrototypeError, RegistrationError};
use crate::protocol::{InfoResponse, MessageInfo, MessageResponse};
use crate::registry::{ObjectDef, Registry, RegistryBuilder};
use crate::resolver::{RESOLVE_TARGET, Resolution, resolve};
use crate::schema::Shape;

/// A prototype: every object shape it understands and the messages each
/// supports.
///
/// # Example
///
/// ```
/// use prototype_sdk::{Message, ObjectDef, Prototype, Schema, Shape};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Greeting {
///     name: String,
/// }
///
/// impl Shape for Greeting {
///     fn schema() -> Schema {
///         Schema::builder("Greeting").required("name").build()
///     }
/// }
///
/// let prototype = Prototype::builder()
///     .icon("mdi:hand-wave")
///     .object(ObjectDef::<Greeting>::new().message(Message::new("wave", |_: &Greeting| {
///         Ok(Vec::new())
///     })))
///     .build()
///     .expect("registration succeeds");
///
/// let raw = json!({"name": "ada"}).as_object().cloned().unwrap_or_default();
/// let info = prototype.info(&raw).expect("introspection succeeds");
/// assert_eq!(info.response().message_names(), ["wave"]);
/// ```
pub struct Prototype {
    icon: Option<String>,
    registry: Registry,
    dispatcher: Dispatcher,
}

impl std::fmt::Debug for Prototype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prototype")
            .field("icon", &self.icon)
            .field("shapes", &self.registry.shape_names())
            .finish_non_exhaustive()
    }
}

impl Prototype {
    /// Starts declaring a prototype.
    #[must_use]
    pub fn builder() -> PrototypeBuilder {
        PrototypeBuilder::default()
    }

    /// Returns the icon identifier reported during introspection.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Returns the schema registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the handler table.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Resolves a payload; see [`resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::Reencode`] when a shape type cannot
    /// serialise its own decoded value.
    pub fn resolve(
        &self,
        raw: &Map<String, Value>,
        message: Option<&str>,
    ) -> Result<Resolution<'_>, PrototypeError> {
        resolve(&self.registry, raw, message)
    }

    /// Runs `message` against a payload.
    ///
    /// Exactly one candidate must explain the payload; its handler is called
    /// once.
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::NoMatch`], [`PrototypeError::Ambiguous`] or
    /// [`PrototypeError::UnsupportedMessage`] when resolution does not yield
    /// a single candidate, and [`PrototypeError::Handler`] when the handler
    /// fails.
    pub fn run(
        &self,
        message: &str,
        raw: &Map<String, Value>,
    ) -> Result<Vec<MessageResponse>, PrototypeError> {
        let candidate = self.resolve(raw, Some(message))?.into_single(message)?;
        self.dispatcher.invoke(&candidate)
    }

    /// Lists the messages a payload supports.
    ///
    /// Every candidate contributes one entry, in resolution order. A
    /// candidate whose configuration descriptor fails is left out of the
    /// response and reported in [`InfoOutcome::diagnostics`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::Reencode`] when a shape type cannot
    /// serialise its own decoded value.
    pub fn info(&self, raw: &Map<String, Value>) -> Result<InfoOutcome, PrototypeError> {
        let resolution = self.resolve(raw, None)?;
        let mut messages = Vec::new();
        let mut diagnostics = Vec::new();

        for candidate in resolution.candidates() {
            let info = MessageInfo::new(candidate.message());
            match candidate.config() {
                None => messages.push(info),
                Some(Ok(config)) => messages.push(info.with_config(config)),
                Some(Err(error)) => {
                    warn!(
                        target: RESOLVE_TARGET,
                        shape = candidate.shape(),
                        message = candidate.message(),
                        reason = %error,
                        "configuration descriptor failed; message omitted"
                    );
                    diagnostics.push(ConfigDiagnostic {
                        shape: candidate.shape().to_owned(),
                        message: candidate.message().to_owned(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        debug!(
            target: RESOLVE_TARGET,
            listed = messages.len(),
            omitted = diagnostics.len(),
            "introspection complete"
        );
        Ok(InfoOutcome {
            response: InfoResponse::new(self.icon.clone(), messages),
            diagnostics,
        })
    }
}

/// Introspection result together with its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoOutcome {
    response: InfoResponse,
    diagnostics: Vec<ConfigDiagnostic>,
}

impl InfoOutcome {
    /// Returns the response written to the pipeline runtime.
    #[must_use]
    pub const fn response(&self) -> &InfoResponse {
        &self.response
    }

    /// Returns the configuration failures that removed entries.
    #[must_use]
    pub fn diagnostics(&self) -> &[ConfigDiagnostic] {
        &self.diagnostics
    }

    /// Consumes the outcome, returning the response.
    #[must_use]
    pub fn into_response(self) -> InfoResponse {
        self.response
    }
}

/// A configuration descriptor failure observed during introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    shape: String,
    message: String,
    reason: String,
}

impl ConfigDiagnostic {
    /// Returns the shape of the omitted candidate.
    #[must_use]
    pub const fn shape(&self) -> &str {
        self.shape.as_str()
    }

    /// Returns the message of the omitted candidate.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the rendered descriptor error.
    #[must_use]
    pub const fn reason(&self) -> &str {
        self.reason.as_str()
    }
}

/// Builder for [`Prototype`].
#[derive(Default)]
pub struct PrototypeBuilder {
    icon: Option<String>,
    registry: RegistryBuilder,
}

impl PrototypeBuilder {
    /// Sets the icon identifier, such as `mdi:git`.
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Registers an object shape after those already registered.
    #[must_use]
    pub fn object<O: Shape>(mut self, object: ObjectDef<O>) -> Self {
        self.registry = self.registry.object(object);
        self
    }

    /// Freezes the declarations.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] for empty or duplicated shape and
    /// message names.
    pub fn build(self) -> Result<Prototype, RegistrationError> {
        let (registry, dispatcher) = self.registry.build()?;
        Ok(Prototype {
            icon: self.icon,
            registry,
            dispatcher,
        })
    }
}
