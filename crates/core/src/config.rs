//! pfcpmeter.toml 설정 로딩, 환경변수 오버라이드, 검증
//!
//! [`PfcpmeterConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PFCPMETER_WINDOW_INTERVAL=60` 형식)
//! 3. 설정 파일 (`pfcpmeter.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pfcpmeter_core::error::PfcpmeterError> {
//! use pfcpmeter_core::config::PfcpmeterConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = PfcpmeterConfig::load("pfcpmeter.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PfcpmeterConfig::parse("[window]\ninterval = 60.0")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PfcpmeterError};
use crate::types::AttackLabel;

/// pfcpmeter 통합 설정
///
/// `pfcpmeter.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PfcpmeterConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 시간 윈도우 설정
    #[serde(default)]
    pub window: WindowConfig,
    /// 라벨링 규칙 설정
    #[serde(default)]
    pub label: LabelConfig,
    /// 캡처 추출(tshark) 설정
    #[serde(default)]
    pub capture: CaptureConfig,
    /// 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
    /// 배치 처리 설정
    #[serde(default)]
    pub batch: BatchConfig,
}

impl PfcpmeterConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PfcpmeterError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    ///
    /// CLI는 설정 파일 없이도 동작해야 하므로 이 경로를 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, PfcpmeterError> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Self::load(path).await;
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PfcpmeterError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PfcpmeterError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PfcpmeterError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PfcpmeterError> {
        toml::from_str(toml_str).map_err(|e| {
            PfcpmeterError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PFCPMETER_{SECTION}_{FIELD}`
    /// 예: `PFCPMETER_BATCH_WORKERS=8`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PFCPMETER_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PFCPMETER_GENERAL_LOG_FORMAT");

        // Window
        override_f64(&mut self.window.interval, "PFCPMETER_WINDOW_INTERVAL");
        override_string(&mut self.window.closure, "PFCPMETER_WINDOW_CLOSURE");
        override_bool(
            &mut self.window.emit_empty_windows,
            "PFCPMETER_WINDOW_EMIT_EMPTY_WINDOWS",
        );
        override_usize(&mut self.window.max_windows, "PFCPMETER_WINDOW_MAX_WINDOWS");

        // Label
        override_f64(
            &mut self.label.normal_threshold,
            "PFCPMETER_LABEL_NORMAL_THRESHOLD",
        );
        override_f64(
            &mut self.label.attack_threshold,
            "PFCPMETER_LABEL_ATTACK_THRESHOLD",
        );
        override_string(&mut self.label.sum_mode, "PFCPMETER_LABEL_SUM_MODE");
        override_opt_string(&mut self.label.fixed, "PFCPMETER_LABEL_FIXED");

        // Capture
        override_string(&mut self.capture.tshark_path, "PFCPMETER_CAPTURE_TSHARK_PATH");
        override_string(
            &mut self.capture.display_filter,
            "PFCPMETER_CAPTURE_DISPLAY_FILTER",
        );
        override_u64(&mut self.capture.timeout_secs, "PFCPMETER_CAPTURE_TIMEOUT_SECS");
        override_csv(&mut self.capture.extensions, "PFCPMETER_CAPTURE_EXTENSIONS");

        // Output
        override_string(&mut self.output.directory, "PFCPMETER_OUTPUT_DIRECTORY");
        override_bool(
            &mut self.output.keep_intermediate,
            "PFCPMETER_OUTPUT_KEEP_INTERMEDIATE",
        );

        // Batch
        override_usize(&mut self.batch.workers, "PFCPMETER_BATCH_WORKERS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PfcpmeterError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        // 윈도우 길이는 양의 유한값이어야 함
        if !self.window.interval.is_finite() || self.window.interval <= 0.0 {
            return Err(invalid(
                "window.interval",
                format!("must be a positive number, got {}", self.window.interval),
            ));
        }

        let valid_closures = ["left", "right"];
        if !valid_closures.contains(&self.window.closure.as_str()) {
            return Err(invalid(
                "window.closure",
                format!("must be one of: {}", valid_closures.join(", ")),
            ));
        }

        if self.window.max_windows == 0 {
            return Err(invalid("window.max_windows", "must be greater than 0".to_owned()));
        }

        for (field, value) in [
            ("label.normal_threshold", self.label.normal_threshold),
            ("label.attack_threshold", self.label.attack_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be a positive number, got {value}")));
            }
        }

        let valid_sum_modes = ["doubled_request", "request_plus_response"];
        if !valid_sum_modes.contains(&self.label.sum_mode.as_str()) {
            return Err(invalid(
                "label.sum_mode",
                format!("must be one of: {}", valid_sum_modes.join(", ")),
            ));
        }

        if let Some(fixed) = &self.label.fixed {
            fixed
                .parse::<AttackLabel>()
                .map_err(|reason| invalid("label.fixed", reason))?;
        }

        if self.capture.tshark_path.trim().is_empty() {
            return Err(invalid("capture.tshark_path", "must not be empty".to_owned()));
        }

        const MAX_TIMEOUT_SECS: u64 = 86_400; // 24시간
        if self.capture.timeout_secs == 0 || self.capture.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(invalid(
                "capture.timeout_secs",
                format!("must be 1-{MAX_TIMEOUT_SECS}"),
            ));
        }

        if self.capture.extensions.is_empty()
            || self.capture.extensions.iter().any(|e| e.trim().is_empty())
        {
            return Err(invalid(
                "capture.extensions",
                "at least one non-empty extension is required".to_owned(),
            ));
        }

        if self.output.directory.trim().is_empty() {
            return Err(invalid("output.directory", "must not be empty".to_owned()));
        }

        const MAX_WORKERS: usize = 256;
        if self.batch.workers == 0 || self.batch.workers > MAX_WORKERS {
            return Err(invalid("batch.workers", format!("must be 1-{MAX_WORKERS}")));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> PfcpmeterError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 시간 윈도우 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// 윈도우 길이 (레코드 상대 시각 단위, 초)
    pub interval: f64,
    /// 경계 포함 방식 (left: `[a, b)`, right: `(a, b]`)
    pub closure: String,
    /// 레코드가 없는 윈도우도 0 행으로 출력할지 여부
    pub emit_empty_windows: bool,
    /// 캡처 하나가 만들 수 있는 윈도우 수 상한
    pub max_windows: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            interval: 120.0,
            closure: "left".to_owned(),
            emit_empty_windows: true,
            max_windows: 1_000_000,
        }
    }
}

/// 라벨링 규칙 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// normal 판정 비율 (heartbeat 합 / 전체)
    pub normal_threshold: f64,
    /// 공격 판정 비율 (세션 요청 합 / 전체)
    pub attack_threshold: f64,
    /// 그룹 합 계산 방식 (doubled_request, request_plus_response)
    pub sum_mode: String,
    /// 캡처 전체에 부여할 고정 라벨 (지정 시 휴리스틱 라벨러를 건너뜀)
    pub fixed: Option<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            normal_threshold: 0.8,
            attack_threshold: 0.2,
            sum_mode: "doubled_request".to_owned(),
            fixed: None,
        }
    }
}

/// 캡처 추출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// tshark 실행 파일 경로
    pub tshark_path: String,
    /// tshark 표시 필터
    pub display_filter: String,
    /// 캡처 하나당 추출 제한 시간 (초)
    pub timeout_secs: u64,
    /// 디렉토리 처리 시 대상 확장자
    pub extensions: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            tshark_path: "tshark".to_owned(),
            display_filter: "pfcp".to_owned(),
            timeout_secs: 300,
            extensions: vec!["pcap".to_owned()],
        }
    }
}

/// 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 데이터셋 출력 디렉토리
    pub directory: String,
    /// 디코딩된 중간 CSV 보존 여부
    pub keep_intermediate: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "dataset".to_owned(),
            keep_intermediate: false,
        }
    }
}

/// 배치 처리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 동시에 처리할 캡처 수
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.trim().is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_f64(target: &mut f64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}
