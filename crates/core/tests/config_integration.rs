//! pfcpmeter.toml 통합 설정 테스트
//!
//! - pfcpmeter.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use pfcpmeter_core::config::PfcpmeterConfig;
use pfcpmeter_core::error::{ConfigError, PfcpmeterError};

const EXAMPLE: &str = include_str!("../../../pfcpmeter.toml.example");

// =============================================================================
// pfcpmeter.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let config = PfcpmeterConfig::parse(EXAMPLE).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let example = PfcpmeterConfig::parse(EXAMPLE).expect("should parse");
    let defaults = PfcpmeterConfig::default();

    assert_eq!(example.general.log_level, defaults.general.log_level);
    assert_eq!(example.general.log_format, defaults.general.log_format);
    assert_eq!(example.window.interval, defaults.window.interval);
    assert_eq!(example.window.closure, defaults.window.closure);
    assert_eq!(
        example.window.emit_empty_windows,
        defaults.window.emit_empty_windows
    );
    assert_eq!(example.window.max_windows, defaults.window.max_windows);
    assert_eq!(example.label.normal_threshold, defaults.label.normal_threshold);
    assert_eq!(example.label.attack_threshold, defaults.label.attack_threshold);
    assert_eq!(example.label.sum_mode, defaults.label.sum_mode);
    assert_eq!(example.label.fixed, defaults.label.fixed);
    assert_eq!(example.capture.tshark_path, defaults.capture.tshark_path);
    assert_eq!(example.capture.timeout_secs, defaults.capture.timeout_secs);
    assert_eq!(example.output.directory, defaults.output.directory);
    assert_eq!(example.batch.workers, defaults.batch.workers);
}

#[test]
fn example_config_accepts_pcapng() {
    let config = PfcpmeterConfig::parse(EXAMPLE).expect("should parse");
    assert_eq!(config.capture.extensions, vec!["pcap", "pcapng"]);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_window_only() {
    let config = PfcpmeterConfig::parse(
        r#"
[window]
interval = 30.0
closure = "right"
"#,
    )
    .expect("should parse");

    assert_eq!(config.window.interval, 30.0);
    assert_eq!(config.window.closure, "right");
    assert!(config.window.emit_empty_windows);
    assert_eq!(config.label.normal_threshold, 0.8);
    assert_eq!(config.batch.workers, 4);
}

#[test]
fn partial_config_fixed_label() {
    let config = PfcpmeterConfig::parse(
        r#"
[label]
fixed = "est_att"
"#,
    )
    .expect("should parse");

    assert_eq!(config.label.fixed.as_deref(), Some("est_att"));
    assert_eq!(config.label.sum_mode, "doubled_request");
    config.validate().expect("known fixed label should validate");
}

#[test]
fn partial_config_two_sections() {
    let config = PfcpmeterConfig::parse(
        r#"
[capture]
display_filter = "pfcp && udp.port == 8805"

[output]
keep_intermediate = true
"#,
    )
    .expect("should parse");

    assert_eq!(config.capture.display_filter, "pfcp && udp.port == 8805");
    assert!(config.output.keep_intermediate);
    assert_eq!(config.output.directory, "dataset");
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let mut config = PfcpmeterConfig::parse("[window]\ninterval = 30.0\n").expect("should parse");

    let original = std::env::var("PFCPMETER_WINDOW_INTERVAL").ok();
    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe {
        std::env::set_var("PFCPMETER_WINDOW_INTERVAL", "15");
    }

    config.apply_env_overrides();

    unsafe {
        match original {
            Some(val) => std::env::set_var("PFCPMETER_WINDOW_INTERVAL", val),
            None => std::env::remove_var("PFCPMETER_WINDOW_INTERVAL"),
        }
    }

    assert_eq!(config.window.interval, 15.0);
}

#[test]
#[serial_test::serial]
fn env_override_csv_for_extensions() {
    let mut config = PfcpmeterConfig::default();

    let original = std::env::var("PFCPMETER_CAPTURE_EXTENSIONS").ok();
    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe {
        std::env::set_var("PFCPMETER_CAPTURE_EXTENSIONS", "pcap, pcapng, cap");
    }

    config.apply_env_overrides();

    unsafe {
        match original {
            Some(val) => std::env::set_var("PFCPMETER_CAPTURE_EXTENSIONS", val),
            None => std::env::remove_var("PFCPMETER_CAPTURE_EXTENSIONS"),
        }
    }

    assert_eq!(config.capture.extensions, vec!["pcap", "pcapng", "cap"]);
}

#[tokio::test]
#[serial_test::serial]
async fn env_override_applied_by_load() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("pfcpmeter.toml");
    std::fs::write(&path, "[batch]\nworkers = 2\n").expect("should write config");

    let original = std::env::var("PFCPMETER_BATCH_WORKERS").ok();
    // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
    unsafe {
        std::env::set_var("PFCPMETER_BATCH_WORKERS", "8");
    }

    let result = PfcpmeterConfig::load(&path).await;

    unsafe {
        match original {
            Some(val) => std::env::set_var("PFCPMETER_BATCH_WORKERS", val),
            None => std::env::remove_var("PFCPMETER_BATCH_WORKERS"),
        }
    }

    let config = result.expect("config should load");
    assert_eq!(config.batch.workers, 8);
}

// =============================================================================
// 에러 테스트
// =============================================================================

#[test]
fn empty_file_yields_defaults() {
    let config = PfcpmeterConfig::parse("").expect("empty TOML should parse");
    assert_eq!(config.window.interval, 120.0);
    config.validate().expect("defaults should validate");
}

#[test]
fn malformed_toml_is_parse_error() {
    let err = PfcpmeterConfig::parse("[window\ninterval = 1").expect_err("should fail");
    assert!(matches!(
        err,
        PfcpmeterError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_is_parse_error() {
    let err = PfcpmeterConfig::parse("[window]\ninterval = \"two minutes\"\n")
        .expect_err("string interval should fail");
    assert!(matches!(
        err,
        PfcpmeterError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn invalid_threshold_fails_validation() {
    let config = PfcpmeterConfig::parse("[label]\nattack_threshold = 0.0\n").expect("should parse");
    let err = config.validate().expect_err("zero threshold should fail");
    assert!(matches!(
        err,
        PfcpmeterError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
async fn missing_file_is_file_not_found() {
    let err = PfcpmeterConfig::load("/nonexistent/pfcpmeter.toml")
        .await
        .expect_err("missing file should fail");
    assert!(matches!(
        err,
        PfcpmeterError::Config(ConfigError::FileNotFound { .. })
    ));
}
