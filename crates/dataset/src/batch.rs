//! 디렉토리 단위 병렬 처리
//!
//! [`BatchRunner`]는 캡처 목록을 최대 `workers`개씩 동시에 처리합니다.
//! 캡처 사이에는 공유 가변 상태가 없으며, 한 캡처의 실패는 다른 캡처의
//! 처리에 영향을 주지 않습니다. 취소 토큰이 발동되면 진행 중인 캡처는
//! `Cancelled`로 실패 처리되고 데이터셋 파일을 남기지 않습니다. 기록 도중에
//! 취소된 캡처는 기록이 끝난 뒤 결과 파일이 삭제됩니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::capture::discover_captures;
use crate::error::DatasetError;
use crate::pipeline::{CaptureReport, DatasetPipeline};

/// 처리에 실패한 캡처
#[derive(Debug, Clone, Serialize)]
pub struct CaptureFailure {
    /// 캡처 경로
    pub capture: PathBuf,
    /// 실패 사유
    pub error: String,
}

/// 배치 처리 결과
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// 성공한 캡처 (입력 순서)
    pub succeeded: Vec<CaptureReport>,
    /// 실패한 캡처 (입력 순서)
    pub failed: Vec<CaptureFailure>,
}

impl BatchReport {
    /// 처리 대상 캡처 수
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// 실패한 캡처가 있는지
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// 병렬 배치 실행기
pub struct BatchRunner {
    pipeline: Arc<DatasetPipeline>,
    workers: usize,
    cancel: CancellationToken,
}

impl BatchRunner {
    /// 파이프라인 설정의 `workers` 값으로 실행기를 생성합니다.
    pub fn new(pipeline: Arc<DatasetPipeline>) -> Self {
        let workers = pipeline.config().workers.max(1);
        Self {
            pipeline,
            workers,
            cancel: CancellationToken::new(),
        }
    }

    /// 동시 처리 수를 변경합니다 (최소 1).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// 외부 취소 토큰을 지정합니다.
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 디렉토리의 캡처를 모두 처리합니다.
    ///
    /// # Errors
    ///
    /// 디렉토리를 읽을 수 없으면 에러를 반환합니다. 개별 캡처의 실패는
    /// [`BatchReport::failed`]에 기록됩니다.
    pub async fn run_directory(&self, dir: &Path) -> Result<BatchReport, DatasetError> {
        let captures = discover_captures(dir, &self.pipeline.config().extensions).await?;
        if captures.is_empty() {
            warn!(
                dir = %dir.display(),
                extensions = ?self.pipeline.config().extensions,
                "no captures found"
            );
        }
        Ok(self.run(captures).await)
    }

    /// 캡처 목록을 병렬로 처리합니다.
    pub async fn run(&self, captures: Vec<PathBuf>) -> BatchReport {
        info!(captures = captures.len(), workers = self.workers, "batch started");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (index, capture) in captures.iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();
            let path = capture.clone();

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => pipeline.process_capture_cancellable(&path, &cancel).await,
                    Err(e) => Err(DatasetError::Worker(e.to_string())),
                };
                (index, result)
            });
        }

        let mut results: Vec<(usize, Result<CaptureReport, CaptureFailure>)> =
            Vec::with_capacity(captures.len());
        let mut finished = vec![false; captures.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    finished[index] = true;
                    let result = result.map_err(|e| {
                        error!(capture = %captures[index].display(), error = %e, "capture failed");
                        CaptureFailure {
                            capture: captures[index].clone(),
                            error: e.to_string(),
                        }
                    });
                    results.push((index, result));
                }
                Err(join_err) => {
                    error!(error = %join_err, "worker task failed");
                }
            }
        }

        // panic 등으로 결과를 돌려주지 못한 캡처
        for (index, _) in finished.iter().enumerate().filter(|(_, done)| !**done) {
            results.push((
                index,
                Err(CaptureFailure {
                    capture: captures[index].clone(),
                    error: DatasetError::Worker("task did not complete".to_owned()).to_string(),
                }),
            ));
        }

        results.sort_by_key(|(index, _)| *index);

        let mut report = BatchReport::default();
        for (_, result) in results {
            match result {
                Ok(r) => report.succeeded.push(r),
                Err(f) => report.failed.push(f),
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "batch finished"
        );
        report
    }
}
