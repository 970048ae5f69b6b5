//! tshark 기반 필드 추출기
//!
//! 다음과 같은 명령을 실행하여 PFCP 메시지 필드를 쉼표 구분 텍스트로 받습니다:
//!
//! ```text
//! tshark -r <capture> -Y pfcp -T fields -E header=y -E separator=, -E quote=d \
//!        -E occurrence=f -e frame.time_relative -e ip.src -e ip.dst \
//!        -e pfcp.msg_type -e frame.len
//! ```
//!
//! 한 프레임에 PFCP 메시지가 여러 개면 첫 번째 메시지 유형만 사용합니다
//! (`-E occurrence=f`).

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use pfcpmeter_core::error::{CaptureError, PfcpmeterError};
use pfcpmeter_core::metrics as m;
use pfcpmeter_core::pipeline::{BoxFuture, FieldExtractor};
use tracing::{debug, warn};

use super::EXTRACTED_FIELDS;
use crate::config::DatasetConfig;

/// stderr를 에러 메시지에 담을 때의 최대 길이
const MAX_STDERR_LEN: usize = 512;

/// tshark 필드 추출기
#[derive(Debug, Clone)]
pub struct TsharkExtractor {
    tshark_path: String,
    display_filter: String,
    timeout: Duration,
}

impl TsharkExtractor {
    /// 새 추출기를 생성합니다.
    pub fn new(
        tshark_path: impl Into<String>,
        display_filter: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            tshark_path: tshark_path.into(),
            display_filter: display_filter.into(),
            timeout,
        }
    }

    /// 데이터셋 설정에서 추출기를 생성합니다.
    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new(&config.tshark_path, &config.display_filter, config.timeout())
    }

    /// 캡처 하나에 대한 tshark 인자 목록
    pub fn args(&self, capture: &Path) -> Vec<String> {
        let mut args = vec![
            "-r".to_owned(),
            capture.display().to_string(),
            "-Y".to_owned(),
            self.display_filter.clone(),
            "-T".to_owned(),
            "fields".to_owned(),
        ];
        for option in ["header=y", "separator=,", "quote=d", "occurrence=f"] {
            args.push("-E".to_owned());
            args.push(option.to_owned());
        }
        for field in EXTRACTED_FIELDS {
            args.push("-e".to_owned());
            args.push(field.to_owned());
        }
        args
    }

    async fn run(&self, capture: &Path) -> Result<Vec<u8>, PfcpmeterError> {
        if !tokio::fs::try_exists(capture).await.unwrap_or(false) {
            return Err(CaptureError::NotFound {
                path: capture.display().to_string(),
            }
            .into());
        }

        let started = Instant::now();
        debug!(capture = %capture.display(), tool = %self.tshark_path, "running tshark");

        let child = tokio::process::Command::new(&self.tshark_path)
            .args(self.args(capture))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::Spawn {
                tool: self.tshark_path.clone(),
                reason: e.to_string(),
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    capture = %capture.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "tshark timed out, killing process"
                );
                return Err(CaptureError::Timeout {
                    path: capture.display().to_string(),
                    secs: self.timeout.as_secs(),
                }
                .into());
            }
        };

        metrics::histogram!(m::EXTRACTION_DURATION_SECONDS, m::LABEL_EXTRACTOR => "tshark")
            .record(started.elapsed().as_secs_f64());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::ToolFailed {
                tool: self.tshark_path.clone(),
                status: output.status.to_string(),
                stderr: truncate(stderr.trim(), MAX_STDERR_LEN),
            }
            .into());
        }

        debug!(
            capture = %capture.display(),
            bytes = output.stdout.len(),
            "tshark extraction finished"
        );
        Ok(output.stdout)
    }
}

impl FieldExtractor for TsharkExtractor {
    fn name(&self) -> &str {
        "tshark"
    }

    fn extract<'a>(&'a self, capture: &'a Path) -> BoxFuture<'a, Result<Vec<u8>, PfcpmeterError>> {
        Box::pin(self.run(capture))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_owned();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
