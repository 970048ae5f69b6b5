//! 데이터셋 파이프라인 설정
//!
//! [`DatasetConfig`]는 core의 [`PfcpmeterConfig`]에서 문자열로 표현된 설정을
//! 타입이 있는 값([`WindowClosure`], [`GroupSumMode`], [`AttackLabel`])으로
//! 변환한 파이프라인 전용 설정입니다.
//!
//! # 사용 예시
//! ```
//! use pfcpmeter_core::config::PfcpmeterConfig;
//! use pfcpmeter_dataset::config::DatasetConfig;
//!
//! let core_config = PfcpmeterConfig::default();
//! let config = DatasetConfig::from_core(&core_config).unwrap();
//! assert_eq!(config.interval, 120.0);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use pfcpmeter_core::config::PfcpmeterConfig;
use pfcpmeter_core::types::AttackLabel;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::label::GroupSumMode;
use crate::window::{DEFAULT_MAX_WINDOWS, WindowClosure};

/// 데이터셋 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// 윈도우 길이
    pub interval: f64,
    /// 윈도우 경계 포함 방식
    pub closure: WindowClosure,
    /// 빈 윈도우 출력 여부
    pub emit_empty_windows: bool,
    /// 캡처당 윈도우 수 상한
    pub max_windows: usize,
    /// normal 판정 비율
    pub normal_threshold: f64,
    /// 공격 판정 비율
    pub attack_threshold: f64,
    /// 그룹 합 계산 방식
    pub sum_mode: GroupSumMode,
    /// 모든 윈도우에 부여할 고정 라벨
    pub fixed_label: Option<AttackLabel>,
    /// tshark 실행 파일 경로
    pub tshark_path: String,
    /// tshark 표시 필터
    pub display_filter: String,
    /// 캡처당 추출 제한 시간 (초)
    pub timeout_secs: u64,
    /// 디렉토리 처리 대상 확장자
    pub extensions: Vec<String>,
    /// 데이터셋 출력 디렉토리
    pub output_dir: PathBuf,
    /// 중간 CSV(`<stem>_decoded.csv`) 보존 여부
    pub keep_intermediate: bool,
    /// 동시 처리 캡처 수
    pub workers: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            interval: 120.0,
            closure: WindowClosure::Left,
            emit_empty_windows: true,
            max_windows: DEFAULT_MAX_WINDOWS,
            normal_threshold: 0.8,
            attack_threshold: 0.2,
            sum_mode: GroupSumMode::DoubledRequest,
            fixed_label: None,
            tshark_path: "tshark".to_owned(),
            display_filter: "pfcp".to_owned(),
            timeout_secs: 300,
            extensions: vec!["pcap".to_owned()],
            output_dir: PathBuf::from("dataset"),
            keep_intermediate: false,
            workers: 4,
        }
    }
}

impl DatasetConfig {
    /// core 설정에서 데이터셋 설정을 생성합니다.
    ///
    /// # Errors
    ///
    /// 문자열 설정값(closure, sum_mode, fixed)을 해석할 수 없으면 에러를 반환합니다.
    pub fn from_core(core: &PfcpmeterConfig) -> Result<Self, DatasetError> {
        let fixed_label = core
            .label
            .fixed
            .as_deref()
            .map(|s| {
                s.parse::<AttackLabel>().map_err(|reason| DatasetError::Config {
                    field: "label.fixed".to_owned(),
                    reason,
                })
            })
            .transpose()?;

        let config = Self {
            interval: core.window.interval,
            closure: core.window.closure.parse()?,
            emit_empty_windows: core.window.emit_empty_windows,
            max_windows: core.window.max_windows,
            normal_threshold: core.label.normal_threshold,
            attack_threshold: core.label.attack_threshold,
            sum_mode: core.label.sum_mode.parse()?,
            fixed_label,
            tshark_path: core.capture.tshark_path.clone(),
            display_filter: core.capture.display_filter.clone(),
            timeout_secs: core.capture.timeout_secs,
            extensions: core.capture.extensions.clone(),
            output_dir: PathBuf::from(&core.output.directory),
            keep_intermediate: core.output.keep_intermediate,
            workers: core.batch.workers,
        };
        config.validate()?;
        Ok(config)
    }

    /// 추출 제한 시간
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DatasetError> {
        const MAX_WORKERS: usize = 256;

        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(config_error(
                "interval",
                format!("must be a positive number, got {}", self.interval),
            ));
        }

        if self.max_windows == 0 {
            return Err(config_error("max_windows", "must be greater than 0".to_owned()));
        }

        for (field, value) in [
            ("normal_threshold", self.normal_threshold),
            ("attack_threshold", self.attack_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(config_error(field, format!("must be a positive number, got {value}")));
            }
        }

        if self.tshark_path.trim().is_empty() {
            return Err(config_error("tshark_path", "must not be empty".to_owned()));
        }

        if self.timeout_secs == 0 {
            return Err(config_error("timeout_secs", "must be greater than 0".to_owned()));
        }

        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(config_error(
                "extensions",
                "at least one non-empty extension is required".to_owned(),
            ));
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(config_error("workers", format!("must be 1-{MAX_WORKERS}")));
        }

        Ok(())
    }
}

fn config_error(field: &str, reason: String) -> DatasetError {
    DatasetError::Config {
        field: field.to_owned(),
        reason,
    }
}

/// 데이터셋 설정 빌더
#[derive(Default)]
pub struct DatasetConfigBuilder {
    config: DatasetConfig,
}

impl DatasetConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 빌더를 생성합니다.
    pub fn from_config(config: DatasetConfig) -> Self {
        Self { config }
    }

    /// 윈도우 길이를 설정합니다.
    pub fn interval(mut self, interval: f64) -> Self {
        self.config.interval = interval;
        self
    }

    /// 윈도우 경계 포함 방식을 설정합니다.
    pub fn closure(mut self, closure: WindowClosure) -> Self {
        self.config.closure = closure;
        self
    }

    /// 빈 윈도우 출력 여부를 설정합니다.
    pub fn emit_empty_windows(mut self, emit: bool) -> Self {
        self.config.emit_empty_windows = emit;
        self
    }

    /// 캡처당 윈도우 수 상한을 설정합니다.
    pub fn max_windows(mut self, max_windows: usize) -> Self {
        self.config.max_windows = max_windows;
        self
    }

    /// 라벨 임계값을 설정합니다.
    pub fn thresholds(mut self, normal: f64, attack: f64) -> Self {
        self.config.normal_threshold = normal;
        self.config.attack_threshold = attack;
        self
    }

    /// 그룹 합 계산 방식을 설정합니다.
    pub fn sum_mode(mut self, mode: GroupSumMode) -> Self {
        self.config.sum_mode = mode;
        self
    }

    /// 고정 라벨을 설정합니다.
    pub fn fixed_label(mut self, label: Option<AttackLabel>) -> Self {
        self.config.fixed_label = label;
        self
    }

    /// tshark 실행 파일 경로를 설정합니다.
    pub fn tshark_path(mut self, path: impl Into<String>) -> Self {
        self.config.tshark_path = path.into();
        self
    }

    /// 추출 제한 시간(초)을 설정합니다.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// 디렉토리 처리 대상 확장자를 설정합니다.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.extensions = extensions;
        self
    }

    /// 출력 디렉토리를 설정합니다.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 중간 CSV 보존 여부를 설정합니다.
    pub fn keep_intermediate(mut self, keep: bool) -> Self {
        self.config.keep_intermediate = keep;
        self
    }

    /// 동시 처리 캡처 수를 설정합니다.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 설정을 검증하고 `DatasetConfig`를 생성합니다.
    pub fn build(self) -> Result<DatasetConfig, DatasetError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
