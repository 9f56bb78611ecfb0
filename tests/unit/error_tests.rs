//! Unit tests for `AppError` display formats and conversions.

use gap_mcp::AppError;

#[test]
fn session_error_display_starts_with_session_prefix() {
    let err = AppError::Session("handshake timed out".into());
    assert_eq!(err.to_string(), "session: handshake timed out");
}

#[test]
fn locate_error_display_includes_message() {
    let err = AppError::Locate("GAP executable not found".into());
    assert!(err.to_string().starts_with("locate:"));
    assert!(err.to_string().contains("not found"));
}

#[test]
fn variants_with_same_message_are_distinct() {
    let session = AppError::Session("pipe closed".into());
    let io = AppError::Io("pipe closed".into());
    assert_ne!(session.to_string(), io.to_string());
}

#[test]
fn io_error_converts_with_message() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
    let err = AppError::from(io);

    match err {
        AppError::Io(msg) => assert!(msg.contains("broken pipe")),
        other => panic!("expected Io variant, got {other:?}"),
    }
}

#[test]
fn toml_error_converts_to_config_variant() {
    let parse_err = toml::from_str::<toml::Value>("= broken").expect_err("invalid toml");
    let err = AppError::from(parse_err);

    match err {
        AppError::Config(msg) => assert!(msg.starts_with("invalid config:")),
        other => panic!("expected Config variant, got {other:?}"),
    }
}

#[test]
fn implements_std_error() {
    fn takes_error(_err: &dyn std::error::Error) {}
    takes_error(&AppError::Mcp("transport failed".into()));
}

#[test]
fn debug_representation_names_variant() {
    let err = AppError::Session("read timeout".into());
    let debug = format!("{err:?}");
    assert!(debug.contains("Session"));
    assert!(debug.contains("read timeout"));
}
