//! Schema registry: object shapes and the messages they support.
//!
//! Host programs declare each object shape with an [`ObjectDef`] and attach
//! [`Message`]s to it. Handler arity is fixed when the message is declared:
//! [`Message::new`] binds a handler taking only the object, while
//! [`Message::with_request`] binds one taking the object and a decoded
//! request. Either way the handler is wrapped once in a fixed-signature
//! adapter, so dispatch never inspects handler types at call time.
//!
//! The registry is assembled once by [`RegistryBuilder`] and is read-only
//! afterwards. Object shapes keep the order in which they were registered,
//! and messages keep their declaration order within a shape.

use std::collections::HashSet;
use std::marker::PhantomData;

use crate::config::Config;
use crate::dispatch::{Dispatcher, ErasedHandler, MessageKey};
use crate::error::{HandlerError, RegistrationError};
use crate::matcher::{Decoded, ShapeDescriptor};
use crate::protocol::MessageResponse;
use crate::schema::Shape;

/// Outcome of a message handler.
pub type HandlerResult = Result<Vec<MessageResponse>, HandlerError>;

type TypedHandler<O> = Box<dyn Fn(&O, Option<&Decoded>) -> HandlerResult>;
type TypedConfig<O> = Box<dyn Fn(&O, Option<&Decoded>) -> Result<Config, HandlerError>>;
pub(crate) type ErasedConfig = Box<dyn Fn(&Decoded, Option<&Decoded>) -> Result<Config, HandlerError>>;

/// Registration index of an object shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

impl ShapeId {
    /// Returns the zero-based registration index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A message an object shape supports.
///
/// # Example
///
/// ```
/// use prototype_sdk::{Message, ObjectDef, Schema, Shape};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Image {
///     context: String,
/// }
///
/// impl Shape for Image {
///     fn schema() -> Schema {
///         Schema::builder("Image").required("context").build()
///     }
/// }
///
/// let object = ObjectDef::<Image>::new().message(Message::new("build", |_: &Image| Ok(Vec::new())));
/// assert_eq!(object.message_names(), ["build"]);
/// ```
pub struct Message<O> {
    name: String,
    request: Option<ShapeDescriptor>,
    handler: TypedHandler<O>,
    config: Option<TypedConfig<O>>,
}

impl<O: Shape> Message<O> {
    /// Declares a message whose handler receives only the object.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&O) -> HandlerResult + 'static,
    {
        Self {
            name: name.into(),
            request: None,
            handler: Box::new(move |object: &O, _: Option<&Decoded>| handler(object)),
            config: None,
        }
    }

    /// Declares a message whose handler also receives a decoded request.
    ///
    /// The request shape `R` is matched against whatever the object shape did
    /// not consume.
    #[must_use]
    pub fn with_request<R, F>(name: impl Into<String>, handler: F) -> RequestMessage<O, R>
    where
        R: Shape,
        F: Fn(&O, &R) -> HandlerResult + 'static,
    {
        RequestMessage {
            name: name.into(),
            handler: Box::new(handler),
            config: None,
            request: PhantomData,
        }
    }

    /// Attaches a configuration descriptor.
    #[must_use]
    pub fn with_config<F>(mut self, config: F) -> Self
    where
        F: Fn(&O) -> Result<Config, HandlerError> + 'static,
    {
        self.config = Some(Box::new(move |object: &O, _: Option<&Decoded>| config(object)));
        self
    }

    /// Returns the message name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns `true` when the message declares a request shape.
    #[must_use]
    pub const fn takes_request(&self) -> bool {
        self.request.is_some()
    }
}

/// A message declared with a request shape, before it joins its object.
///
/// Converts into [`Message`] when passed to [`ObjectDef::message`].
pub struct RequestMessage<O, R> {
    name: String,
    handler: Box<dyn Fn(&O, &R) -> HandlerResult>,
    config: Option<Box<dyn Fn(&O, &R) -> Result<Config, HandlerError>>>,
    request: PhantomData<fn() -> R>,
}

impl<O: Shape, R: Shape> RequestMessage<O, R> {
    /// Attaches a configuration descriptor computed from object and request.
    #[must_use]
    pub fn with_config<F>(mut self, config: F) -> Self
    where
        F: Fn(&O, &R) -> Result<Config, HandlerError> + 'static,
    {
        self.config = Some(Box::new(config));
        self
    }
}

impl<O: Shape, R: Shape> From<RequestMessage<O, R>> for Message<O> {
    fn from(message: RequestMessage<O, R>) -> Self {
        let typed = message.handler;
        let config = message.config.map(|config| -> TypedConfig<O> {
            Box::new(move |object: &O, request: Option<&Decoded>| -> Result<Config, HandlerError> {
                config(object, request_as::<R>(request)?)
            })
        });
        Self {
            name: message.name,
            request: Some(ShapeDescriptor::of::<R>()),
            handler: Box::new(move |object: &O, request: Option<&Decoded>| -> HandlerResult {
                typed(object, request_as::<R>(request)?)
            }),
            config,
        }
    }
}

fn request_as<R: 'static>(request: Option<&Decoded>) -> Result<&R, HandlerError> {
    request
        .and_then(Decoded::downcast_ref::<R>)
        .ok_or_else(|| {
            HandlerError::new(format!(
                "request was not decoded as {}",
                std::any::type_name::<R>()
            ))
        })
}

fn object_as<O: 'static>(object: &Decoded) -> Result<&O, HandlerError> {
    object.downcast_ref::<O>().ok_or_else(|| {
        HandlerError::new(format!(
            "object '{}' was not decoded as {}",
            object.shape(),
            std::any::type_name::<O>()
        ))
    })
}

/// Declaration of one object shape and its messages.
pub struct ObjectDef<O> {
    messages: Vec<Message<O>>,
}

impl<O: Shape> Default for ObjectDef<O> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
        }
    }
}

impl<O: Shape> ObjectDef<O> {
    /// Declares an object shape with no messages yet.
    ///
    /// A shape without messages still takes part in resolution: it can make
    /// a payload ambiguous or explain it during introspection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message.
    #[must_use]
    pub fn message(mut self, message: impl Into<Message<O>>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Returns the declared message names in order.
    #[must_use]
    pub fn message_names(&self) -> Vec<&str> {
        self.messages.iter().map(Message::name).collect()
    }
}

/// A registered object shape.
pub(crate) struct ObjectEntry {
    id: ShapeId,
    descriptor: ShapeDescriptor,
    messages: Vec<MessageEntry>,
}

impl ObjectEntry {
    pub(crate) const fn id(&self) -> ShapeId {
        self.id
    }

    pub(crate) const fn descriptor(&self) -> &ShapeDescriptor {
        &self.descriptor
    }

    pub(crate) const fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub(crate) fn messages(&self) -> &[MessageEntry] {
        &self.messages
    }

    pub(crate) fn supports(&self, message: &str) -> bool {
        self.messages.iter().any(|entry| entry.name == message)
    }
}

/// A registered message, minus its handler (which lives in the dispatcher).
pub(crate) struct MessageEntry {
    name: String,
    request: Option<ShapeDescriptor>,
    config: Option<ErasedConfig>,
}

impl MessageEntry {
    pub(crate) const fn name(&self) -> &str {
        self.name.as_str()
    }

    pub(crate) const fn request(&self) -> Option<&ShapeDescriptor> {
        self.request.as_ref()
    }

    pub(crate) const fn config(&self) -> Option<&ErasedConfig> {
        self.config.as_ref()
    }
}

/// Read-only schema registry.
pub struct Registry {
    objects: Vec<ObjectEntry>,
}

impl Registry {
    /// Returns the number of registered object shapes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` when no object shapes are registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the shape names in registration order.
    #[must_use]
    pub fn shape_names(&self) -> Vec<&str> {
        self.objects.iter().map(ObjectEntry::name).collect()
    }

    /// Returns the messages declared by a shape, in declaration order.
    #[must_use]
    pub fn message_names(&self, shape: &str) -> Option<Vec<&str>> {
        self.objects
            .iter()
            .find(|entry| entry.name() == shape)
            .map(|entry| entry.messages.iter().map(MessageEntry::name).collect())
    }

    pub(crate) fn objects(&self) -> &[ObjectEntry] {
        &self.objects
    }
}

struct PendingObject {
    descriptor: ShapeDescriptor,
    messages: Vec<(MessageEntry, ErasedHandler)>,
}

/// Builder assembling a [`Registry`] and its [`Dispatcher`].
#[derive(Default)]
pub struct RegistryBuilder {
    objects: Vec<PendingObject>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object shape after those already registered.
    #[must_use]
    pub fn object<O: Shape>(mut self, object: ObjectDef<O>) -> Self {
        let messages = object.messages.into_iter().map(erase::<O>).collect();
        self.objects.push(PendingObject {
            descriptor: ShapeDescriptor::of::<O>(),
            messages,
        });
        self
    }

    /// Validates the declarations and freezes them.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] for empty or duplicated shape names, for
    /// empty or duplicated message names within a shape, and for schema keys
    /// that a shape's type does not deserialize.
    pub fn build(self) -> Result<(Registry, Dispatcher), RegistrationError> {
        let mut shape_names = HashSet::new();
        let mut objects = Vec::with_capacity(self.objects.len());
        let mut dispatcher = Dispatcher::default();

        for (index, pending) in self.objects.into_iter().enumerate() {
            let id = ShapeId(index);
            let shape = pending.descriptor.name().to_owned();
            if shape.trim().is_empty() {
                return Err(RegistrationError::EmptyShapeName);
            }
            if !shape_names.insert(shape.clone()) {
                return Err(RegistrationError::DuplicateShape { shape });
            }
            check_fields(&pending.descriptor)?;

            let mut message_names = HashSet::new();
            let mut messages = Vec::with_capacity(pending.messages.len());
            for (entry, handler) in pending.messages {
                if entry.name.trim().is_empty() {
                    return Err(RegistrationError::EmptyMessageName { shape });
                }
                if !message_names.insert(entry.name.clone()) {
                    return Err(RegistrationError::DuplicateMessage {
                        shape,
                        message: entry.name,
                    });
                }
                if let Some(request) = &entry.request {
                    check_fields(request)?;
                }
                dispatcher.bind(MessageKey::new(id, entry.name.clone()), handler);
                messages.push(entry);
            }

            objects.push(ObjectEntry {
                id,
                descriptor: pending.descriptor,
                messages,
            });
        }

        Ok((Registry { objects }, dispatcher))
    }
}

fn check_fields(descriptor: &ShapeDescriptor) -> Result<(), RegistrationError> {
    match descriptor.unknown_field() {
        Some(field) => Err(RegistrationError::UnknownField {
            shape: descriptor.name().to_owned(),
            field: field.to_owned(),
        }),
        None => Ok(()),
    }
}

fn erase<O: Shape>(message: Message<O>) -> (MessageEntry, ErasedHandler) {
    let typed = message.handler;
    let handler: ErasedHandler =
        Box::new(move |object: &Decoded, request: Option<&Decoded>| -> HandlerResult {
            typed(object_as::<O>(object)?, request)
        });
    let config = message.config.map(|config| -> ErasedConfig {
        Box::new(move |object: &Decoded, request: Option<&Decoded>| -> Result<Config, HandlerError> {
            config(object_as::<O>(object)?, request)
        })
    });
    let entry = MessageEntry {
        name: message.name,
        request: message.request,
        config,
    };
    (entry, handler)
}
