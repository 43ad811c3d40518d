//! Tests for `src/logging.rs`.

use persona_relay::logging::{LoggingGuard, LOG_FILE_PREFIX};

#[test]
fn logging_guard_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LoggingGuard>();
}

#[test]
fn init_production_creates_logs_dir() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let logs_dir = tmp.path().join("nested").join("logs");
    assert!(!logs_dir.exists());

    // The global subscriber can only be installed once per process; this is
    // the only test in this binary that installs one.
    let guard = persona_relay::logging::init_production(&logs_dir);
    assert!(guard.is_ok());
    assert!(logs_dir.exists(), "logs directory should be created");

    tracing::info!(probe = true, "logging smoke test");
    drop(guard);

    let written = std::fs::read_dir(&logs_dir)
        .expect("logs dir should be readable")
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX));
    assert!(written, "a rotated log file should exist");
}
