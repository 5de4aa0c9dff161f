//! Process boundary: arguments, the stdin request and the response file.
//!
//! A prototype process is invoked once per step. With a positional `MESSAGE`
//! argument it runs that message and writes one JSON response per line;
//! without one it introspects the payload and writes a single
//! [`InfoResponse`](crate::protocol::InfoResponse). Either way the request
//! arrives as one JSON document on stdin and the response goes to the file
//! named by its `response_path`.
//!
//! The response is computed in full before the file is opened, so a failed
//! invocation never leaves a partially written response behind.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8Path;
use clap::Parser;
use prototype_settings::{EnvSettingsLoader, SettingsError, SettingsLoader};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{PrototypeError, RegistrationError};
use crate::protocol::PrototypeRequest;
use crate::prototype::Prototype;
use crate::telemetry::{self, TelemetryError};

/// Tracing target for the process boundary.
pub(crate) const EXECUTE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::execute");

/// Command-line arguments of a prototype process.
#[derive(Debug, Parser)]
#[command(about = "Resolve a JSON payload against this prototype's object shapes")]
struct Invocation {
    /// Message to run; omit to list the messages the payload supports.
    message: Option<String>,
}

impl Invocation {
    fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|message| !message.is_empty())
    }
}

/// Opens the sink a response is written to.
pub trait ResponseTarget {
    /// Opens `path` for writing, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while opening the sink.
    fn open(&self, path: &Utf8Path) -> io::Result<Box<dyn Write + Send>>;
}

/// Writes responses to files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileResponseTarget;

impl ResponseTarget for FileResponseTarget {
    fn open(&self, path: &Utf8Path) -> io::Result<Box<dyn Write + Send>> {
        let file: File = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

impl Prototype {
    /// Runs one invocation against the current process.
    ///
    /// # Errors
    ///
    /// Returns any [`PrototypeError`] raised by [`Prototype::execute_with`].
    pub fn execute(&self) -> Result<(), PrototypeError> {
        let stdin = io::stdin();
        let mut reader = BufReader::new(stdin.lock());
        self.execute_with(std::env::args_os(), &mut reader, &FileResponseTarget)
    }

    /// Runs one invocation with explicit arguments, input and response sink.
    ///
    /// `args` includes the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`PrototypeError::Usage`] for bad arguments,
    /// [`PrototypeError::InvalidRequest`] for a malformed request, the
    /// resolution or handler error of the invocation, and the open, encode
    /// or write error of the response.
    pub fn execute_with<I, T>(
        &self,
        args: I,
        reader: &mut impl Read,
        target: &impl ResponseTarget,
    ) -> Result<(), PrototypeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let invocation = Invocation::try_parse_from(args).map_err(|error| PrototypeError::Usage {
            message: error.to_string(),
        })?;
        let request: PrototypeRequest =
            serde_json::from_reader(reader).map_err(PrototypeError::InvalidRequest)?;

        let lines = match invocation.message() {
            Some(message) => {
                info!(target: EXECUTE_TARGET, message, "running message");
                self.run(message, request.object())?
                    .iter()
                    .map(serde_json::to_string)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(PrototypeError::EncodeResponse)?
            }
            None => {
                info!(target: EXECUTE_TARGET, "introspecting payload");
                let outcome = self.info(request.object())?;
                vec![
                    serde_json::to_string(outcome.response())
                        .map_err(PrototypeError::EncodeResponse)?,
                ]
            }
        };

        write_response(target, request.response_path(), &lines)
    }
}

fn write_response(
    target: &impl ResponseTarget,
    path: &Utf8Path,
    lines: &[String],
) -> Result<(), PrototypeError> {
    let mut sink = target
        .open(path)
        .map_err(|source| PrototypeError::OpenResponse {
            path: path.to_owned(),
            source: Arc::new(source),
        })?;
    let write_error = |source: io::Error| PrototypeError::WriteResponse {
        path: path.to_owned(),
        source: Arc::new(source),
    };
    for line in lines {
        writeln!(sink, "{line}").map_err(write_error)?;
    }
    sink.flush().map_err(write_error)?;
    debug!(target: EXECUTE_TARGET, path = %path, lines = lines.len(), "response written");
    Ok(())
}

/// Errors raised while launching a prototype binary.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The environment carried invalid settings.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The prototype's declarations were rejected.
    #[error("invalid prototype declaration: {0}")]
    Registration(#[from] RegistrationError),
    /// The invocation failed.
    #[error(transparent)]
    Prototype(#[from] PrototypeError),
}

/// Loads settings from the environment, installs telemetry, builds the
/// prototype and executes one invocation.
///
/// # Errors
///
/// Returns [`LaunchError`] for the first step that fails.
pub fn launch<F>(build: F) -> Result<(), LaunchError>
where
    F: FnOnce() -> Result<Prototype, RegistrationError>,
{
    launch_with(&EnvSettingsLoader, build)
}

/// Runs [`launch`] with settings taken from `loader`.
///
/// # Errors
///
/// Returns [`LaunchError`] for the first step that fails. The prototype is
/// not built when settings fail to load.
pub fn launch_with<F>(loader: &dyn SettingsLoader, build: F) -> Result<(), LaunchError>
where
    F: FnOnce() -> Result<Prototype, RegistrationError>,
{
    let settings = loader.load()?;
    telemetry::initialise(&settings)?;
    let prototype = build()?;
    prototype.execute()?;
    Ok(())
}

/// Entry point for prototype binaries: runs [`launch`] and reports failures
/// on stderr.
///
/// # Example
///
/// ```no_run
/// use std::process::ExitCode;
///
/// use prototype_sdk::{Prototype, RegistrationError, run_main};
///
/// fn prototype() -> Result<Prototype, RegistrationError> {
///     Prototype::builder().icon("mdi:cube").build()
/// }
///
/// fn main() -> ExitCode {
///     run_main(prototype)
/// }
/// ```
pub fn run_main<F>(build: F) -> ExitCode
where
    F: FnOnce() -> Result<Prototype, RegistrationError>,
{
    match launch(build) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
