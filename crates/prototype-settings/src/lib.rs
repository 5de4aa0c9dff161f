//! Runtime settings shared by prototype executables.
//!
//! Prototypes are launched by the pipeline runtime with a fixed argument
//! vector and a JSON request on stdin, so operators tune them through
//! `PROTOTYPE_*` environment variables. [`Settings`] derives its loader from
//! `ortho_config`, which layers those variables over the field defaults.

mod defaults;
mod logging;

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::defaults::{
    DEFAULT_LOG_FILTER, LOG_FILTER_ENV, LOG_FORMAT_ENV, SETTINGS_PROGRAM,
    default_log_filter_string, default_log_format,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Errors raised while resolving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The layered loader rejected a source.
    #[error("failed to load settings: {source}")]
    Load {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The configured log filter was blank.
    #[error("log filter in {variable} must not be empty")]
    EmptyLogFilter {
        /// Environment variable that carries the value.
        variable: &'static str,
    },
}

/// Resolved runtime settings.
///
/// # Example
///
/// ```
/// use prototype_settings::{LogFormat, Settings};
///
/// let settings = Settings::from_args(["prototype", "--log-format", "json"])
///     .expect("settings resolve");
/// assert_eq!(settings.log_format(), LogFormat::Json);
/// assert_eq!(settings.log_filter(), "warn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PROTOTYPE")]
pub struct Settings {
    #[serde(default = "default_log_filter_string")]
    log_filter: String,
    #[serde(default = "default_log_format")]
    log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Settings {
    /// Creates settings with explicit values.
    #[must_use]
    pub fn new(log_filter: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            log_filter: log_filter.into(),
            log_format,
        }
    }

    /// Loads settings from the given argument vector layered over the
    /// `PROTOTYPE_*` environment and the defaults, then validates them.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a source holds an unusable value
    /// and [`SettingsError::EmptyLogFilter`] for a blank filter expression.
    pub fn from_args<I, T>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::load_from_iter(args)
            .map_err(|source| SettingsError::Load { source })?
            .validated()
    }

    /// Trims the filter expression and rejects a blank one.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::EmptyLogFilter`] when nothing but whitespace
    /// remains.
    pub fn validated(mut self) -> Result<Self, SettingsError> {
        let trimmed = self.log_filter.trim();
        if trimmed.is_empty() {
            return Err(SettingsError::EmptyLogFilter {
                variable: LOG_FILTER_ENV,
            });
        }
        if trimmed.len() != self.log_filter.len() {
            self.log_filter = trimmed.to_owned();
        }
        Ok(self)
    }

    /// Returns the `tracing` filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Source of [`Settings`] for a prototype launch.
pub trait SettingsLoader {
    /// Loads and validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the settings cannot be resolved.
    fn load(&self) -> Result<Settings, SettingsError>;
}

/// Loader reading the process environment.
///
/// The runtime's argument vector belongs to the prototype protocol, so only
/// the program name is handed to the layered loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettingsLoader;

impl SettingsLoader for EnvSettingsLoader {
    fn load(&self) -> Result<Settings, SettingsError> {
        Settings::from_args([SETTINGS_PROGRAM])
    }
}
