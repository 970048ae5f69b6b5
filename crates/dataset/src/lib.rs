#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`decoder`]: 디코딩된 행을 [`Record`](pfcpmeter_core::types::Record)로 변환 (잘못된 행은 건너뜀)
//! - [`window`]: 레코드를 고정 길이 시간 윈도우에 할당
//! - [`aggregate`]: 윈도우별 범주 카운트 집계 (고정 컬럼 스키마)
//! - [`label`]: 순서가 있는 규칙 목록으로 윈도우 라벨 부여
//! - [`capture`]: 캡처 파일 탐색 및 필드 추출기 (tshark, 디코딩된 CSV)
//! - [`writer`]: 데이터셋 CSV 기록
//! - [`pipeline`]: 캡처 하나를 데이터셋 파일로 만드는 드라이버
//! - [`batch`]: 디렉토리 단위 병렬 처리
//! - [`config`]: 데이터셋 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod decoder;
pub mod error;
pub mod label;
pub mod pipeline;
pub mod window;
pub mod writer;

pub mod capture;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{CaptureReport, DatasetPipeline, DatasetPipelineBuilder};

// 배치
pub use batch::{BatchReport, BatchRunner, CaptureFailure};

// 설정
pub use config::{DatasetConfig, DatasetConfigBuilder};

// 에러
pub use error::DatasetError;

// 단계별 구성 요소
pub use aggregate::{AggregatedRow, Aggregator, CategoryCounts};
pub use decoder::{DecodeOutcome, RecordDecoder, SkippableDecodeError};
pub use label::{GroupSumMode, LabelRule, Labeler};
pub use window::{WindowAssigner, WindowAssignment, WindowClosure};
pub use writer::DatasetWriter;

// 추출기
pub use capture::{DecodedCsvExtractor, TsharkExtractor};
