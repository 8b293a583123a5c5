//! Integration: the discovered limit is accepted and one more parameter overflows.

use envcaps::{discover_parameter_limit, BindOutcome, ProbeDriver, ProbeSession, SqliteDriver};

fn assert_tight(driver: &SqliteDriver, limit: usize) {
    let mut session = driver.open().expect("open probe session");
    assert_eq!(session.bind(limit).expect("bind at limit"), BindOutcome::Accepted);
    assert_eq!(
        session.bind(limit + 1).expect("bind past limit"),
        BindOutcome::TooManyParameters
    );
}

#[test]
fn emulated_legacy_build_reports_exact_limit() {
    let driver = SqliteDriver::with_variable_limit(250).expect("driver");
    let report = discover_parameter_limit(&driver, 1000).expect("probe");
    assert_eq!(report.limit.get(), 250);
    assert!(report.ceiling_rejected);
    assert_tight(&driver, report.limit.get());
}

#[test]
fn legacy_999_build_is_found_under_default_ceiling() {
    let driver = SqliteDriver::with_variable_limit(999).expect("driver");
    let report = discover_parameter_limit(&driver, 1000).expect("probe");
    assert_eq!(report.limit.get(), 999);
    assert!(report.ceiling_rejected);
    assert_tight(&driver, 999);
}

#[test]
fn real_build_limit_found_with_raised_ceiling() {
    let driver = SqliteDriver::new();
    let report = discover_parameter_limit(&driver, 1 << 20).expect("probe");
    assert!(report.ceiling_rejected);
    assert!(report.limit.get() >= 999);
    assert_tight(&driver, report.limit.get());
}

#[test]
fn default_ceiling_caps_modern_builds() {
    let driver = SqliteDriver::new();
    let report = discover_parameter_limit(&driver, 1000).expect("probe");
    assert_eq!(report.limit.get(), 999);
    assert!(!report.ceiling_rejected);
    assert!(report.iterations <= 10);
}

#[test]
fn single_parameter_build_is_found() {
    let driver = SqliteDriver::with_variable_limit(1).expect("driver");
    let report = discover_parameter_limit(&driver, 1000).expect("probe");
    assert_eq!(report.limit.get(), 1);
    assert_tight(&driver, 1);
}

#[test]
fn compile_option_hint_is_readable() {
    let hint = SqliteDriver::new()
        .compiled_variable_limit()
        .expect("read compile options");
    if let Some(value) = hint {
        assert!(value >= 1);
    }
}
