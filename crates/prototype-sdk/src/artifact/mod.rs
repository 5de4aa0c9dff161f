//! Filesystem artifacts exchanged in result objects.
//!
//! An [`Artifact`] names a path relative to the step's working directory.
//! It serialises as `{"artifact": "<path>"}` so the pipeline runtime can tell
//! artifacts apart from literal data, and it can never point outside the
//! working directory.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when validating an artifact path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// The path was absolute.
    #[error("artifact path '{path}' must be relative to the working directory")]
    Absolute {
        /// Rejected path.
        path: String,
    },
    /// The path climbed above the working directory.
    #[error("artifact path '{path}' escapes the working directory")]
    Escapes {
        /// Rejected path.
        path: String,
    },
}

/// A cleaned, relative, non-escaping path.
///
/// # Example
///
/// ```
/// use prototype_sdk::Artifact;
///
/// let artifact = Artifact::new("build/./out//image.tar").expect("valid path");
/// assert_eq!(artifact.path().as_str(), "build/out/image.tar");
/// let json = serde_json::to_string(&artifact).expect("serialise");
/// assert_eq!(json, r#"{"artifact":"build/out/image.tar"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact(Utf8PathBuf);

impl Artifact {
    /// Cleans and validates a path.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] for absolute paths and for paths whose
    /// cleaned form climbs above the working directory.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ArtifactError> {
        clean(path.as_ref()).map(Self)
    }

    /// Returns the cleaned path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        self.0.as_path()
    }
}

/// Lexically cleans a relative path using the platform's separators.
///
/// `.` components are dropped and `..` cancels the preceding component; an
/// empty result is `.`.
fn clean(raw: &str) -> Result<Utf8PathBuf, ArtifactError> {
    let path = Utf8Path::new(raw);
    if path.has_root() || path.is_absolute() {
        return Err(ArtifactError::Absolute {
            path: raw.to_owned(),
        });
    }

    let mut segments: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::Normal(segment) => segments.push(segment),
            Utf8Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(ArtifactError::Escapes {
                        path: raw.to_owned(),
                    });
                }
            }
            Utf8Component::CurDir => {}
            Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                return Err(ArtifactError::Absolute {
                    path: raw.to_owned(),
                });
            }
        }
    }

    if segments.is_empty() {
        return Ok(Utf8PathBuf::from("."));
    }
    Ok(Utf8PathBuf::from(segments.join("/")))
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Marker<P> {
    artifact: P,
}

impl Serialize for Artifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Marker {
            artifact: self.0.as_str(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Artifact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let marker = Marker::<String>::deserialize(deserializer)?;
        Self::new(marker.artifact).map_err(serde::de::Error::custom)
    }
}
