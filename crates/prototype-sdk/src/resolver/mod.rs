//! Invocation resolution: which (object, message, request) combinations
//! explain a raw payload.
//!
//! Object shapes are tried in registration order and messages in declaration
//! order, so the candidate list for a given registry and payload is always
//! the same. A candidate survives only when every non-zero key of the
//! payload is consumed, either by the object shape or by the message's
//! request shape.
//!
//! [`resolve`] returns every candidate. Choosing one is left to
//! [`Resolution::into_single`], which enforces the exactly-one policy of a
//! concrete message invocation.

use std::borrow::Cow;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::Config;
use crate::diff;
use crate::error::{HandlerError, PrototypeError};
use crate::matcher::{Decoded, Disqualification, MatchOutcome, match_shape};
use crate::registry::{MessageEntry, ObjectEntry, Registry, ShapeId};

/// Tracing target for resolution.
pub(crate) const RESOLVE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::resolver");

/// A fully validated (object, message, request) match for one payload.
pub struct Candidate<'r> {
    object: Rc<Decoded>,
    request: Option<Decoded>,
    entry: &'r ObjectEntry,
    message: &'r MessageEntry,
}

impl Candidate<'_> {
    /// Returns the registration index of the matched shape.
    #[must_use]
    pub const fn shape_id(&self) -> ShapeId {
        self.entry.id()
    }

    /// Returns the matched shape name.
    #[must_use]
    pub const fn shape(&self) -> &str {
        self.entry.name()
    }

    /// Returns the message name.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.name()
    }

    /// Returns the decoded object.
    #[must_use]
    pub fn object(&self) -> &Decoded {
        &self.object
    }

    /// Returns the decoded request, when the message declares one.
    #[must_use]
    pub const fn request(&self) -> Option<&Decoded> {
        self.request.as_ref()
    }

    /// Computes the message's configuration descriptor, if it has one.
    pub(crate) fn config(&self) -> Option<Result<Config, HandlerError>> {
        self.message
            .config()
            .map(|config| config(self.object(), self.request()))
    }
}

impl std::fmt::Debug for Candidate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("shape", &self.shape())
            .field("message", &self.message())
            .field("object", &self.object)
            .field("request", &self.request)
            .finish()
    }
}

/// Every candidate for one payload, plus the shapes that matched it.
pub struct Resolution<'r> {
    candidates: Vec<Candidate<'r>>,
    matched: Vec<&'r ObjectEntry>,
}

impl<'r> Resolution<'r> {
    /// Returns the candidates in resolution order.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate<'r>] {
        &self.candidates
    }

    /// Returns the names of shapes that structurally matched the payload,
    /// whether or not any of their messages survived.
    #[must_use]
    pub fn matched_shapes(&self) -> Vec<&'r str> {
        self.matched.iter().copied().map(ObjectEntry::name).collect()
    }

    /// Consumes the resolution, yielding all candidates.
    #[must_use]
    pub fn into_candidates(self) -> Vec<Candidate<'r>> {
        self.candidates
    }

    /// Demands exactly one candidate for `message`.
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::Ambiguous`] for several candidates. With no
    /// candidates, returns [`PrototypeError::UnsupportedMessage`] when shapes
    /// matched but none of them declares `message`, and
    /// [`PrototypeError::NoMatch`] otherwise.
    pub fn into_single(self, message: &str) -> Result<Candidate<'r>, PrototypeError> {
        let Self {
            mut candidates,
            matched,
        } = self;

        if candidates.len() > 1 {
            return Err(PrototypeError::Ambiguous {
                message: message.to_owned(),
                shapes: candidates
                    .iter()
                    .map(|candidate| candidate.shape().to_owned())
                    .collect(),
            });
        }
        if let Some(candidate) = candidates.pop() {
            return Ok(candidate);
        }

        if matched.is_empty() || matched.iter().any(|entry| entry.supports(message)) {
            Err(PrototypeError::NoMatch {
                message: message.to_owned(),
            })
        } else {
            Err(PrototypeError::UnsupportedMessage {
                message: message.to_owned(),
                objects: matched
                    .iter()
                    .map(|entry| entry.name().to_owned())
                    .collect(),
            })
        }
    }
}

impl std::fmt::Debug for Resolution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("candidates", &self.candidates)
            .field("matched", &self.matched_shapes())
            .finish()
    }
}

/// Resolves `raw` against every registered shape.
///
/// With `message` set, only messages of that name are considered; with
/// `None` every message of every matching shape is, which is how
/// introspection lists what a payload supports.
///
/// The payload is never mutated and the result depends only on the registry
/// and the payload.
///
/// # Errors
///
/// Returns [`PrototypeError::Reencode`] when a shape type cannot serialise
/// its own decoded value. Payloads that simply do not match a shape are not
/// errors.
pub fn resolve<'r>(
    registry: &'r Registry,
    raw: &Map<String, Value>,
    message: Option<&str>,
) -> Result<Resolution<'r>, PrototypeError> {
    let mut candidates = Vec::new();
    let mut matched = Vec::new();

    for entry in registry.objects() {
        let object = match match_shape(entry.descriptor(), raw)? {
            MatchOutcome::Matched(decoded) => Rc::new(decoded),
            MatchOutcome::Disqualified(reason) => {
                trace_disqualified(entry.name(), None, &reason);
                continue;
            }
        };
        matched.push(entry);
        let remaining = diff::subtract(raw, &diff::consumed_keys(&object));

        for definition in entry
            .messages()
            .iter()
            .filter(|definition| message.is_none_or(|name| definition.name() == name))
        {
            let (request, leftover) = match definition.request() {
                None => (None, Cow::Borrowed(&remaining)),
                Some(descriptor) => match match_shape(descriptor, &remaining)? {
                    MatchOutcome::Matched(request) => {
                        let leftover = diff::subtract(&remaining, &diff::consumed_keys(&request));
                        (Some(request), Cow::Owned(leftover))
                    }
                    MatchOutcome::Disqualified(reason) => {
                        trace_disqualified(entry.name(), Some(definition.name()), &reason);
                        continue;
                    }
                },
            };

            if !diff::is_empty(&leftover) {
                let reason = Disqualification::Leftover {
                    keys: diff::unexplained_keys(&leftover),
                };
                trace_disqualified(entry.name(), Some(definition.name()), &reason);
                continue;
            }

            candidates.push(Candidate {
                object: Rc::clone(&object),
                request,
                entry,
                message: definition,
            });
        }
    }

    debug!(
        target: RESOLVE_TARGET,
        message = message.unwrap_or_default(),
        candidates = candidates.len(),
        matched = matched.len(),
        "resolved payload"
    );
    Ok(Resolution {
        candidates,
        matched,
    })
}

fn trace_disqualified(shape: &str, message: Option<&str>, reason: &Disqualification) {
    trace!(
        target: RESOLVE_TARGET,
        shape,
        message = message.unwrap_or_default(),
        %reason,
        "candidate disqualified"
    );
}
