use crate::logging::LogFormat;

/// Program name handed to the layered loader in place of the runtime's
/// argument vector.
pub const SETTINGS_PROGRAM: &str = "prototype";

/// Environment variable overriding the log filter expression.
pub const LOG_FILTER_ENV: &str = "PROTOTYPE_LOG_FILTER";

/// Environment variable overriding the log output format.
pub const LOG_FORMAT_ENV: &str = "PROTOTYPE_LOG_FORMAT";

/// Default log filter expression.
///
/// Prototypes run inside pipeline steps where stderr is shown to users, so
/// only warnings and errors are emitted unless asked otherwise.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
