//! Resolver and dispatcher core for prototype binaries.
//!
//! A prototype is a small executable that a pipeline runtime invokes with a
//! JSON payload. The payload carries no type tag: the prototype works out
//! which of its declared object shapes the payload describes, which message
//! is being sent to it, and which request shape explains the keys the object
//! shape did not consume. Exactly one such combination must explain the
//! payload for a message to run; introspection instead lists every message
//! any matching combination supports.
//!
//! # Architecture
//!
//! - [`schema`] declares shapes as explicit [`Schema`] descriptors built once
//!   through a builder.
//! - [`matcher`] decodes a payload into a shape and enforces mandatory fields.
//! - [`diff`] subtracts consumed keys and decides whether a leftover is empty.
//! - [`registry`] holds the object shapes, their messages and request shapes.
//! - [`resolver`] yields every candidate for a payload in registration order.
//! - [`dispatch`] routes a single candidate to its handler.
//! - [`execute`] is the process boundary: arguments, stdin and the response
//!   file.
//!
//! # Example
//!
//! ```rust
//! use prototype_sdk::{Message, MessageResponse, ObjectDef, Prototype, Schema, Shape};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct Repository {
//!     uri: String,
//! }
//!
//! impl Shape for Repository {
//!     fn schema() -> Schema {
//!         Schema::builder("Repository").required("uri").build()
//!     }
//! }
//!
//! #[derive(Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct ListRequest {
//!     filter: String,
//! }
//!
//! impl Shape for ListRequest {
//!     fn schema() -> Schema {
//!         Schema::builder("ListRequest").required("filter").build()
//!     }
//! }
//!
//! let prototype = Prototype::builder()
//!     .icon("mdi:git")
//!     .object(ObjectDef::<Repository>::new().message(Message::with_request(
//!         "list",
//!         |repository: &Repository, request: &ListRequest| {
//!             Ok(vec![MessageResponse::new(&json!({
//!                 "uri": repository.uri,
//!                 "filter": request.filter,
//!             }))?])
//!         },
//!     )))
//!     .build()
//!     .expect("registration succeeds");
//!
//! let payload = json!({"uri": "https://example.com/repo.git", "filter": "main"});
//! let raw = payload.as_object().cloned().unwrap_or_default();
//! let responses = prototype.run("list", &raw).expect("message runs");
//! assert_eq!(responses.len(), 1);
//! ```

pub mod artifact;
pub mod config;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod execute;
pub mod matcher;
pub mod protocol;
pub mod prototype;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::artifact::{Artifact, ArtifactError};
pub use self::config::{Cache, Config, Input, Output};
pub use self::dispatch::Dispatcher;
pub use self::error::{HandlerError, PrototypeError, RegistrationError};
pub use self::execute::{
    FileResponseTarget, LaunchError, ResponseTarget, launch, launch_with, run_main,
};
pub use self::matcher::{Decoded, Disqualification, MatchOutcome, ShapeDescriptor, match_shape};
pub use self::protocol::{
    INTERFACE_VERSION, InfoResponse, MessageInfo, MessageResponse, MetadataField,
    PrototypeRequest,
};
pub use self::prototype::{ConfigDiagnostic, InfoOutcome, Prototype, PrototypeBuilder};
pub use self::registry::{
    HandlerResult, Message, ObjectDef, Registry, RegistryBuilder, RequestMessage, ShapeId,
};
pub use self::resolver::{Candidate, Resolution, resolve};
pub use self::schema::{Field, Schema, SchemaBuilder, Shape};
