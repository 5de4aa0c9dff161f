//! OCI image prototype: build an image, or run one stage of its Dockerfile.
//!
//! Both messages attach a configuration descriptor so the pipeline runtime
//! can mount the build context, any extra context inputs and the output
//! directory before the step runs.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use camino::Utf8Path;
use prototype_sdk::{
    Artifact, Cache, Config, HandlerError, HandlerResult, Input, Message, MessageResponse,
    ObjectDef, Output, Prototype, RegistrationError, Schema, Shape,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Tracing target for image handlers.
const IMAGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handlers");

/// Directory name of the build cache, relative to the working directory.
pub const CACHE_DIR: &str = "cache";

/// File name of the exported image inside the output directory.
pub const IMAGE_FILE: &str = "image.tar";

/// An image built from a Dockerfile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OciImage {
    /// Input holding the build context.
    pub context: String,
    /// Extra inputs mounted inside the context, keyed by input name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context_inputs: BTreeMap<String, String>,
    /// Dockerfile path within the context.
    #[serde(rename = "dockerfile", skip_serializing_if = "String::is_empty")]
    pub dockerfile_path: String,
    /// Whether to persist the build cache between runs.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cache: bool,
    /// Output receiving the exported image.
    pub output: String,
}

impl Shape for OciImage {
    fn schema() -> Schema {
        Schema::builder("OciImage")
            .required("context")
            .optional("context_inputs")
            .optional("dockerfile")
            .optional("cache")
            .required("output")
            .build()
    }
}

/// Request for the `run-stage` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStageRequest {
    /// Build stage to run.
    pub stage: String,
}

impl Shape for RunStageRequest {
    fn schema() -> Schema {
        Schema::builder("RunStageRequest").required("stage").build()
    }
}

/// Result object of the `build` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltImage {
    /// Exported image tarball.
    pub image: Artifact,
}

impl OciImage {
    /// Describes the inputs, outputs and cache the build needs.
    ///
    /// The context is mounted under its own input name. Each context input
    /// is mounted at its path joined onto the context.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] when a context input path is absolute or
    /// climbs out of the context.
    pub fn config(&self) -> Result<Config, HandlerError> {
        let mut config = Config::new().with_input(Input::new(self.context.as_str()));
        for (name, path) in &self.context_inputs {
            let relative = Artifact::new(path).map_err(|error| {
                HandlerError::with_cause(format!("invalid path for context input '{name}'"), error)
            })?;
            let mount = Utf8Path::new(&self.context).join(relative.path());
            config = config.with_input(Input::new(name.as_str()).at(mount));
        }
        config = config.with_output(Output::new(self.output.as_str()));
        if self.cache {
            config = config.with_cache(Cache::at(CACHE_DIR));
        }
        Ok(config)
    }
}

fn build(image: &OciImage) -> HandlerResult {
    info!(
        target: IMAGE_TARGET,
        context = %image.context,
        dockerfile = %image.dockerfile_path,
        "building an image"
    );
    let tarball = Artifact::new(format!("{}/{IMAGE_FILE}", image.output))
        .map_err(|error| HandlerError::with_cause("invalid output name", error))?;
    let response = MessageResponse::new(&BuiltImage { image: tarball })?
        .with_metadata("context", image.context.as_str());
    Ok(vec![response])
}

fn run_stage(image: &OciImage, request: &RunStageRequest) -> HandlerResult {
    info!(
        target: IMAGE_TARGET,
        context = %image.context,
        stage = %request.stage,
        "running stage"
    );
    Ok(Vec::new())
}

/// Declares the OCI image prototype.
///
/// # Errors
///
/// Returns [`RegistrationError`] if the declarations are inconsistent.
pub fn prototype() -> Result<Prototype, RegistrationError> {
    Prototype::builder()
        .icon("mdi:docker")
        .object(
            ObjectDef::<OciImage>::new()
                .message(Message::new("build", build).with_config(OciImage::config))
                .message(
                    Message::with_request("run-stage", run_stage)
                        .with_config(|image: &OciImage, _: &RunStageRequest| image.config()),
                ),
        )
        .build()
}
