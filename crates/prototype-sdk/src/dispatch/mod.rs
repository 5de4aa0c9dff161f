//! Handler table keyed by object shape and message name.
//!
//! The dispatcher is built alongside the registry and holds the
//! fixed-signature adapter for every registered message. Invoking a resolved
//! candidate is a single table lookup followed by the adapter call.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::PrototypeError;
use crate::matcher::Decoded;
use crate::protocol::MessageResponse;
use crate::registry::{HandlerResult, ShapeId};
use crate::resolver::Candidate;

/// Tracing target for dispatch.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

pub(crate) type ErasedHandler = Box<dyn Fn(&Decoded, Option<&Decoded>) -> HandlerResult>;

/// Key of one handler in the dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MessageKey {
    shape: ShapeId,
    message: String,
}

impl MessageKey {
    pub(crate) fn new(shape: ShapeId, message: impl Into<String>) -> Self {
        Self {
            shape,
            message: message.into(),
        }
    }
}

/// Routes resolved candidates to their handlers.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<MessageKey, ErasedHandler>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Dispatcher {
    pub(crate) fn bind(&mut self, key: MessageKey, handler: ErasedHandler) {
        self.handlers.insert(key, handler);
    }

    /// Returns the number of bound handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invokes the handler bound to a resolved candidate.
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::UnsupportedMessage`] when no handler is
    /// bound for the candidate, and [`PrototypeError::Handler`] when the
    /// handler itself fails.
    pub fn invoke(
        &self,
        candidate: &Candidate<'_>,
    ) -> Result<Vec<MessageResponse>, PrototypeError> {
        let key = MessageKey::new(candidate.shape_id(), candidate.message());
        let Some(handler) = self.handlers.get(&key) else {
            return Err(PrototypeError::UnsupportedMessage {
                message: candidate.message().to_owned(),
                objects: vec![candidate.shape().to_owned()],
            });
        };

        debug!(
            target: DISPATCH_TARGET,
            shape = candidate.shape(),
            message = candidate.message(),
            "invoking handler"
        );
        handler(candidate.object(), candidate.request()).map_err(|source| {
            PrototypeError::Handler {
                message: candidate.message().to_owned(),
                source,
            }
        })
    }
}
