//! 데이터셋 파이프라인 에러 타입
//!
//! [`DatasetError`]는 데이터셋 생성 중 발생하는 치명적 에러를 표현합니다.
//! 행 단위로 복구 가능한 디코딩 실패는
//! [`SkippableDecodeError`](crate::decoder::SkippableDecodeError)로 따로 다룹니다.
//!
//! `From<DatasetError> for PfcpmeterError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use pfcpmeter_core::error::{PfcpmeterError, PipelineError};

/// 데이터셋 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// 필드 추출 실패 (tshark 실행 실패, 시간 초과 등)
    #[error("extraction failed for {capture}: {reason}")]
    Extract {
        /// 캡처 파일 경로
        capture: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 데이터셋 파일 기록 실패
    #[error("write error: {path}: {reason}")]
    Write {
        /// 출력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 레코드 시각 범위가 윈도우 수 상한을 넘음
    #[error("time span needs {required} windows, limit is {limit}")]
    WindowLimit {
        /// 필요한 윈도우 수 (`ceil(span / interval)`)
        required: f64,
        /// 허용 상한 (`window.max_windows`)
        limit: usize,
    },

    /// 캡처 처리 취소
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// 워커 태스크 에러 (panic, join 실패)
    #[error("worker error: {0}")]
    Worker(String),

    /// CSV 입출력 에러
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DatasetError> for PfcpmeterError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::Io(e) => PfcpmeterError::Io(e),
            DatasetError::Cancelled(reason) => {
                PfcpmeterError::Pipeline(PipelineError::Cancelled(reason))
            }
            DatasetError::Config { .. } => {
                PfcpmeterError::Pipeline(PipelineError::InitFailed(err.to_string()))
            }
            other => PfcpmeterError::Pipeline(PipelineError::Output(other.to_string())),
        }
    }
}

impl From<PfcpmeterError> for DatasetError {
    fn from(err: PfcpmeterError) -> Self {
        match err {
            PfcpmeterError::Io(e) => DatasetError::Io(e),
            PfcpmeterError::Config(e) => DatasetError::Config {
                field: "config".to_owned(),
                reason: e.to_string(),
            },
            other => DatasetError::Extract {
                capture: String::new(),
                reason: other.to_string(),
            },
        }
    }
}
