//! Unit tests for settings resolution.

use rstest::rstest;

use crate::{LogFormat, Settings, SettingsError};

#[test]
fn program_name_alone_uses_defaults() {
    let settings = Settings::from_args(["prototype"]).expect("defaults resolve");
    assert_eq!(settings.log_filter(), "warn");
    assert_eq!(settings.log_format(), LogFormat::Compact);
}

#[test]
fn flags_override_defaults() {
    let settings = Settings::from_args([
        "prototype",
        "--log-filter",
        "prototype_sdk=debug",
        "--log-format",
        "json",
    ])
    .expect("flags resolve");
    assert_eq!(settings, Settings::new("prototype_sdk=debug", LogFormat::Json));
}

#[test]
fn unknown_format_is_rejected() {
    let error = Settings::from_args(["prototype", "--log-format", "xml"])
        .expect_err("xml is not a format");
    assert!(matches!(error, SettingsError::Load { .. }));
    assert!(error.to_string().starts_with("failed to load settings"));
}

#[test]
fn filter_is_trimmed() {
    let settings = Settings::new("  prototype_sdk=debug ", LogFormat::Compact)
        .validated()
        .expect("filter resolves");
    assert_eq!(settings.log_filter(), "prototype_sdk=debug");
}

#[rstest]
#[case::empty("")]
#[case::spaces("   ")]
fn blank_filter_is_rejected(#[case] filter: &str) {
    let error = Settings::new(filter, LogFormat::Json)
        .validated()
        .expect_err("blank filter");
    assert!(matches!(
        error,
        SettingsError::EmptyLogFilter {
            variable: "PROTOTYPE_LOG_FILTER"
        }
    ));
}

#[test]
fn blank_filter_flag_is_rejected() {
    let error = Settings::from_args(["prototype", "--log-filter", " "])
        .expect_err("blank filter");
    assert!(matches!(error, SettingsError::EmptyLogFilter { .. }));
}

#[rstest]
#[case::lowercase("json", LogFormat::Json)]
#[case::uppercase("JSON", LogFormat::Json)]
#[case::compact("Compact", LogFormat::Compact)]
fn format_parses_case_insensitively(#[case] raw: &str, #[case] expected: LogFormat) {
    let format: LogFormat = raw.parse().expect("format parses");
    assert_eq!(format, expected);
}

#[test]
fn deserialises_with_field_defaults() {
    let settings: Settings =
        serde_json::from_str(r#"{"log_format":"json"}"#).expect("deserialise");
    assert_eq!(settings.log_filter(), "warn");
    assert_eq!(settings.log_format(), LogFormat::Json);
}
