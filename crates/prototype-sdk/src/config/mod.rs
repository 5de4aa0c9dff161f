//! Declarative step configuration computed per message.
//!
//! A message may attach a configuration descriptor: a pure function of the
//! decoded object (and request, when the message declares one) describing
//! the named inputs, outputs and cache directories the operation needs. The
//! pipeline runtime reads it from the introspection response to prepare the
//! step's working directory.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Inputs, outputs and caches required by a message.
///
/// Empty lists are omitted from the serialised form.
///
/// # Example
///
/// ```
/// use prototype_sdk::{Cache, Config, Input, Output};
///
/// let config = Config::new()
///     .with_input(Input::new("source"))
///     .with_output(Output::new("image"))
///     .with_cache(Cache::at("cache"));
/// let json = serde_json::to_value(&config).expect("serialise");
/// assert_eq!(json["inputs"][0]["name"], "source");
/// assert_eq!(json["caches"][0]["path"], "cache");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    inputs: Vec<Input>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<Output>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    caches: Vec<Cache>,
}

impl Config {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an input.
    #[must_use]
    pub fn with_input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    /// Appends an output.
    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Appends a cache directory.
    #[must_use]
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.caches.push(cache);
        self
    }

    /// Returns the declared inputs.
    #[must_use]
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Returns the declared outputs.
    #[must_use]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Returns the declared caches.
    #[must_use]
    pub fn caches(&self) -> &[Cache] {
        &self.caches
    }

    /// Returns `true` when nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty() && self.caches.is_empty()
    }
}

/// A named artifact the step consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<Utf8PathBuf>,
}

impl Input {
    /// Creates an input mounted at its default location.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    /// Mounts the input at a specific path.
    #[must_use]
    pub fn at(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the input name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the mount path, if overridden.
    #[must_use]
    pub fn path(&self) -> Option<&camino::Utf8Path> {
        self.path.as_deref()
    }
}

/// A named artifact the step produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<Utf8PathBuf>,
}

impl Output {
    /// Creates an output collected from its default location.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    /// Collects the output from a specific path.
    #[must_use]
    pub fn at(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the output name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the collection path, if overridden.
    #[must_use]
    pub fn path(&self) -> Option<&camino::Utf8Path> {
        self.path.as_deref()
    }
}

/// A directory persisted between runs of the step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<Utf8PathBuf>,
}

impl Cache {
    /// Creates a cache at the given path.
    #[must_use]
    pub fn at(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the cache path.
    #[must_use]
    pub fn path(&self) -> Option<&camino::Utf8Path> {
        self.path.as_deref()
    }
}
