//! 데이터셋 파이프라인 -- 캡처 하나를 데이터셋 파일 하나로 변환합니다.
//!
//! # 처리 흐름
//! ```text
//! FieldExtractor -> RecordDecoder -> WindowAssigner -> Aggregator -> Labeler -> DatasetWriter
//! ```
//!
//! 추출과 파일 기록을 제외한 나머지 단계는 순수 동기 변환이며
//! [`DatasetPipeline::build_rows`]로 따로 호출할 수 있습니다.
//!
//! 취소는 추출 단계에서는 즉시 반영됩니다. 파일 기록은 끝까지 진행한 뒤
//! 취소 여부를 다시 확인하고, 취소되었으면 기록한 데이터셋 파일을 지웁니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use pfcpmeter_core::metrics as m;
use pfcpmeter_core::pipeline::FieldExtractor;
use pfcpmeter_core::types::Record;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregatedRow, Aggregator};
use crate::capture::TsharkExtractor;
use crate::config::DatasetConfig;
use crate::decoder::RecordDecoder;
use crate::error::DatasetError;
use crate::label::Labeler;
use crate::window::WindowAssigner;
use crate::writer::{self, DatasetWriter};

/// 디코딩된 바이트에서 만든 행과 디코딩 통계
#[derive(Debug, Clone)]
pub struct BuiltRows {
    /// 라벨이 부여된 윈도우 행
    pub rows: Vec<AggregatedRow>,
    /// 디코딩된 레코드 수
    pub records: usize,
    /// 건너뛴 행 수
    pub skipped: usize,
    /// 분류표에 없는 메시지 유형 레코드 수
    pub unknown: usize,
}

/// 캡처 하나의 처리 결과
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    /// 입력 캡처 경로
    pub capture: PathBuf,
    /// 출력 데이터셋 경로
    pub output: PathBuf,
    /// 보존된 중간 CSV 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<PathBuf>,
    /// 디코딩된 레코드 수
    pub records: usize,
    /// 건너뛴 행 수
    pub skipped: usize,
    /// 분류표에 없는 메시지 유형 레코드 수
    pub unknown: usize,
    /// 출력 윈도우 행 수
    pub windows: usize,
    /// 라벨별 윈도우 수
    pub labels: BTreeMap<String, usize>,
    /// 처리 시간 (밀리초)
    pub elapsed_ms: u64,
}

/// 데이터셋 파이프라인
///
/// 캡처 간에 공유하는 가변 상태가 없으므로 `Arc`로 감싸 여러 태스크에서
/// 동시에 사용할 수 있습니다.
///
/// # 사용 예시
/// ```ignore
/// use pfcpmeter_dataset::{DatasetConfig, DatasetPipelineBuilder};
///
/// let pipeline = DatasetPipelineBuilder::new()
///     .config(DatasetConfig::default())
///     .build()?;
/// let report = pipeline.process_capture(Path::new("attack.pcap")).await?;
/// ```
pub struct DatasetPipeline {
    config: DatasetConfig,
    extractor: Arc<dyn FieldExtractor>,
    decoder: RecordDecoder,
    assigner: WindowAssigner,
    aggregator: Aggregator,
    labeler: Labeler,
    writer: DatasetWriter,
}

impl std::fmt::Debug for DatasetPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetPipeline")
            .field("extractor", &self.extractor.name())
            .field("interval", &self.config.interval)
            .field("closure", &self.config.closure)
            .field("output_dir", &self.config.output_dir)
            .finish()
    }
}

impl DatasetPipeline {
    /// 파이프라인 설정
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// 사용 중인 추출기 이름
    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// 캡처에 대응하는 출력 데이터셋 경로
    pub fn output_path(&self, capture: &Path) -> PathBuf {
        self.config
            .output_dir
            .join(writer::output_file_name(capture, self.config.interval))
    }

    /// 레코드 집합을 라벨이 부여된 윈도우 행으로 변환합니다.
    ///
    /// 같은 입력에 대해 항상 같은 결과를 반환합니다.
    ///
    /// # Errors
    ///
    /// 시각 범위가 `window.max_windows`를 넘으면 [`DatasetError::WindowLimit`]를 반환합니다.
    pub fn build_rows(&self, records: &[Record]) -> Result<Vec<AggregatedRow>, DatasetError> {
        let assignment = self.assigner.assign(records)?;
        let mut rows = self.aggregator.aggregate(&assignment);

        if let Some(fixed) = self.config.fixed_label {
            for row in &mut rows {
                row.label = Some(fixed);
            }
        }
        self.labeler.apply(&mut rows);

        metrics::counter!(m::WINDOWS_EMITTED_TOTAL).increment(rows.len() as u64);
        for row in &rows {
            metrics::counter!(m::LABELS_ASSIGNED_TOTAL, m::LABEL_ATTACK => row.effective_label().as_str())
                .increment(1);
        }
        Ok(rows)
    }

    /// 디코딩된 필드 텍스트를 윈도우 행으로 변환합니다.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<BuiltRows, DatasetError> {
        let outcome = self.decoder.decode_bytes(bytes)?;
        if outcome.skipped > 0 {
            warn!(skipped = outcome.skipped, "malformed rows skipped");
        }
        let rows = self.build_rows(&outcome.records)?;
        Ok(BuiltRows {
            rows,
            records: outcome.records.len(),
            skipped: outcome.skipped,
            unknown: outcome.unknown,
        })
    }

    /// 캡처 하나를 처리하여 출력 디렉토리에 데이터셋 파일을 기록합니다.
    pub async fn process_capture(&self, capture: &Path) -> Result<CaptureReport, DatasetError> {
        self.process_with(capture, None).await
    }

    /// 취소 토큰과 함께 캡처를 처리합니다.
    ///
    /// 취소되면 데이터셋 파일을 남기지 않고 `Cancelled`를 반환합니다.
    /// 이미 시작된 파일 기록이 끝난 뒤에 취소되었더라도 결과 파일을 지웁니다.
    pub async fn process_capture_cancellable(
        &self,
        capture: &Path,
        cancel: &CancellationToken,
    ) -> Result<CaptureReport, DatasetError> {
        self.process_with(capture, Some(cancel)).await
    }

    async fn process_with(
        &self,
        capture: &Path,
        cancel: Option<&CancellationToken>,
    ) -> Result<CaptureReport, DatasetError> {
        let started = Instant::now();
        let result = self.run_capture(capture, started, cancel).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(DatasetError::Cancelled(_)) => "cancelled",
            Err(_) => "failure",
        };
        metrics::counter!(m::CAPTURES_PROCESSED_TOTAL, m::LABEL_RESULT => outcome).increment(1);
        metrics::histogram!(m::CAPTURE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        result
    }

    async fn run_capture(
        &self,
        capture: &Path,
        started: Instant,
        cancel: Option<&CancellationToken>,
    ) -> Result<CaptureReport, DatasetError> {
        let is_cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);
        let cancelled = || DatasetError::Cancelled(capture.display().to_string());
        if is_cancelled() {
            return Err(cancelled());
        }

        debug!(capture = %capture.display(), extractor = self.extractor.name(), "extracting fields");

        let extraction = self.extractor.extract(capture);
        let extracted = match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => return Err(cancelled()),
                result = extraction => result,
            },
            None => extraction.await,
        };
        let bytes = extracted.map_err(|e| DatasetError::Extract {
            capture: capture.display().to_string(),
            reason: e.to_string(),
        })?;

        let intermediate = if self.config.keep_intermediate {
            Some(self.keep_intermediate(capture, &bytes).await?)
        } else {
            None
        };

        let built = self.process_bytes(&bytes)?;
        drop(bytes);
        if is_cancelled() {
            return Err(cancelled());
        }

        let output = self.output_path(capture);
        let rows = built.rows;
        let writer = self.writer;
        let target = output.clone();
        let (window_count, rows) = tokio::task::spawn_blocking(move || {
            writer.write_file(&target, &rows).map(|n| (n, rows))
        })
        .await
        .map_err(|e| DatasetError::Worker(e.to_string()))??;

        // 기록 중에 취소된 경우
        if is_cancelled() {
            discard_output(&output).await;
            return Err(cancelled());
        }

        let mut labels = BTreeMap::new();
        for row in &rows {
            *labels
                .entry(row.effective_label().as_str().to_owned())
                .or_insert(0) += 1;
        }

        let report = CaptureReport {
            capture: capture.to_path_buf(),
            output,
            intermediate,
            records: built.records,
            skipped: built.skipped,
            unknown: built.unknown,
            windows: window_count,
            labels,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            capture = %report.capture.display(),
            output = %report.output.display(),
            records = report.records,
            skipped = report.skipped,
            windows = report.windows,
            elapsed_ms = report.elapsed_ms,
            "dataset generated"
        );
        Ok(report)
    }

    async fn keep_intermediate(&self, capture: &Path, bytes: &[u8]) -> Result<PathBuf, DatasetError> {
        let path = self
            .config
            .output_dir
            .join(writer::intermediate_file_name(capture));
        if path == capture {
            // 입력이 이미 보존된 중간 파일
            return Ok(path);
        }
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), "intermediate fields kept");
        Ok(path)
    }
}

async fn discard_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "dataset discarded after cancellation"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to discard dataset"),
    }
}

/// 데이터셋 파이프라인 빌더
pub struct DatasetPipelineBuilder {
    config: DatasetConfig,
    extractor: Option<Arc<dyn FieldExtractor>>,
}

impl DatasetPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: DatasetConfig::default(),
            extractor: None,
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: DatasetConfig) -> Self {
        self.config = config;
        self
    }

    /// 필드 추출기를 지정합니다. 지정하지 않으면 tshark 추출기를 사용합니다.
    pub fn extractor(mut self, extractor: Arc<dyn FieldExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// 설정을 검증하고 파이프라인을 생성합니다.
    pub fn build(self) -> Result<DatasetPipeline, DatasetError> {
        self.config.validate()?;

        let assigner = WindowAssigner::new(self.config.interval, self.config.closure)?
            .with_max_windows(self.config.max_windows)?;
        let labeler = Labeler::new(
            self.config.normal_threshold,
            self.config.attack_threshold,
            self.config.sum_mode,
        )?;
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(TsharkExtractor::from_config(&self.config)));

        Ok(DatasetPipeline {
            aggregator: Aggregator::new(self.config.emit_empty_windows),
            config: self.config,
            extractor,
            decoder: RecordDecoder::new(),
            assigner,
            labeler,
            writer: DatasetWriter::new(),
        })
    }
}

impl Default for DatasetPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
