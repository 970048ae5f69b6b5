//! pfcpmeter 에러 타입 (설정, 캡처 추출, 파이프라인)

/// pfcpmeter 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PfcpmeterError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 캡처 추출(외부 디코더) 에러
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    /// 데이터셋 생성 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 캡처 파일에서 필드를 추출하는 외부 도구 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// 캡처 파일 없음
    #[error("capture not found: {path}")]
    NotFound { path: String },

    /// 외부 도구 실행 실패
    #[error("failed to spawn '{tool}': {reason}")]
    Spawn { tool: String, reason: String },

    /// 외부 도구가 0이 아닌 종료 코드로 끝남
    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// 외부 도구 실행 시간 초과
    #[error("extraction of {path} timed out after {secs}s")]
    Timeout { path: String, secs: u64 },
}

/// 데이터셋 생성 파이프라인 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 캡처 처리 취소됨
    #[error("processing cancelled: {0}")]
    Cancelled(String),

    /// 출력 파일 기록 실패
    #[error("output failed: {0}")]
    Output(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: PfcpmeterError = ConfigError::InvalidValue {
            field: "window.interval".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(err, PfcpmeterError::Config(_)));
        assert!(err.to_string().contains("window.interval"));
    }

    #[test]
    fn tool_failed_display_includes_stderr() {
        let err = CaptureError::ToolFailed {
            tool: "tshark".to_owned(),
            status: "exit status: 2".to_owned(),
            stderr: "not a capture file".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("tshark"));
        assert!(msg.contains("not a capture file"));
    }

    #[test]
    fn timeout_display_includes_seconds() {
        let err = CaptureError::Timeout {
            path: "/data/a.pcap".to_owned(),
            secs: 30,
        };
        assert!(err.to_string().contains("30s"));
    }
}
