//! 이미 디코딩된 CSV 파일을 읽는 추출기
//!
//! tshark 없이 다른 환경에서 미리 추출해 둔 필드 파일(또는
//! `keep_intermediate`로 보존된 `<stem>_decoded.csv`)을 입력으로 사용할 때 씁니다.

use std::path::Path;
use std::time::Instant;

use pfcpmeter_core::error::{CaptureError, PfcpmeterError};
use pfcpmeter_core::metrics as m;
use pfcpmeter_core::pipeline::{BoxFuture, FieldExtractor};

/// 디코딩된 CSV 파일 추출기
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodedCsvExtractor;

impl DecodedCsvExtractor {
    /// 새 추출기를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    async fn read(&self, capture: &Path) -> Result<Vec<u8>, PfcpmeterError> {
        let started = Instant::now();
        let bytes = tokio::fs::read(capture).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PfcpmeterError::Capture(CaptureError::NotFound {
                    path: capture.display().to_string(),
                })
            } else {
                PfcpmeterError::Io(e)
            }
        })?;
        metrics::histogram!(m::EXTRACTION_DURATION_SECONDS, m::LABEL_EXTRACTOR => "decoded-csv")
            .record(started.elapsed().as_secs_f64());
        Ok(bytes)
    }
}

impl FieldExtractor for DecodedCsvExtractor {
    fn name(&self) -> &str {
        "decoded-csv"
    }

    fn extract<'a>(&'a self, capture: &'a Path) -> BoxFuture<'a, Result<Vec<u8>, PfcpmeterError>> {
        Box::pin(self.read(capture))
    }
}
