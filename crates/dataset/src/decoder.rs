//! 디코딩된 필드 행 → [`Record`] 변환
//!
//! 외부 디코더가 출력한 구분자 텍스트를 읽어 레코드 목록을 만듭니다.
//! 입력은 헤더 한 줄과 다음 다섯 필드로 구성된 행입니다:
//!
//! ```text
//! frame.time_relative,ip.src,ip.dst,pfcp.msg_type,frame.len
//! "0.000000000","10.0.0.1","10.0.0.2","1","58"
//! ```
//!
//! 잘못된 행은 [`SkippableDecodeError`]로 보고되고 버려지며, 나머지 행의
//! 처리는 계속됩니다. I/O 에러만 전체 디코딩을 중단시킵니다.

use std::io::Read;

use pfcpmeter_core::metrics as m;
use pfcpmeter_core::taxonomy::{self, Category};
use pfcpmeter_core::types::Record;
use tracing::debug;

use crate::error::DatasetError;

/// 행 하나를 구성하는 필드 수
pub const FIELD_COUNT: usize = 5;

/// 행 단위로 복구 가능한 디코딩 실패
///
/// 이 에러는 해당 행만 건너뛰게 하며 배치를 중단시키지 않습니다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkippableDecodeError {
    /// 필드 수 부족
    #[error("line {line}: expected 5 fields, found {found}")]
    MissingFields {
        /// 입력 행 번호 (1부터, 헤더 포함)
        line: u64,
        /// 실제 필드 수
        found: usize,
    },

    /// 상대 시각 파싱 실패 (숫자가 아니거나 음수/무한대)
    #[error("line {line}: invalid relative time '{value}'")]
    InvalidTime {
        /// 입력 행 번호
        line: u64,
        /// 원본 값
        value: String,
    },

    /// 메시지 유형 코드가 정수가 아님
    #[error("line {line}: invalid message type '{value}'")]
    InvalidMessageType {
        /// 입력 행 번호
        line: u64,
        /// 원본 값
        value: String,
    },

    /// 프레임 길이 파싱 실패
    #[error("line {line}: invalid frame length '{value}'")]
    InvalidFrameLength {
        /// 입력 행 번호
        line: u64,
        /// 원본 값
        value: String,
    },

    /// CSV 구문 오류 (잘못된 UTF-8 등)
    #[error("line {line}: malformed row: {reason}")]
    Malformed {
        /// 입력 행 번호
        line: u64,
        /// 오류 사유
        reason: String,
    },
}

/// 디코딩 결과
#[derive(Debug, Clone, Default)]
pub struct DecodeOutcome {
    /// 디코딩된 레코드 (입력 순서)
    pub records: Vec<Record>,
    /// 건너뛴 행 수
    pub skipped: usize,
    /// 분류표에 없는 메시지 유형 레코드 수
    pub unknown: usize,
}

/// 필드 행 디코더
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder {
    delimiter: u8,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl RecordDecoder {
    /// 쉼표 구분자 디코더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 구분자를 변경합니다.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 필드 행 하나를 레코드로 변환합니다.
    ///
    /// `line`은 로그와 에러 메시지에 쓰이는 입력 행 번호입니다.
    pub fn decode_row(
        &self,
        row: &csv::StringRecord,
        line: u64,
    ) -> Result<Record, SkippableDecodeError> {
        if row.len() < FIELD_COUNT {
            return Err(SkippableDecodeError::MissingFields {
                line,
                found: row.len(),
            });
        }
        let field = |i: usize| row.get(i).unwrap_or_default().trim();

        let time_raw = field(0);
        let relative_time = time_raw
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .ok_or_else(|| SkippableDecodeError::InvalidTime {
                line,
                value: time_raw.to_owned(),
            })?;

        let code_raw = field(3);
        let code = code_raw
            .parse::<i64>()
            .map_err(|_| SkippableDecodeError::InvalidMessageType {
                line,
                value: code_raw.to_owned(),
            })?;

        let length_raw = field(4);
        let frame_length =
            length_raw
                .parse::<u64>()
                .map_err(|_| SkippableDecodeError::InvalidFrameLength {
                    line,
                    value: length_raw.to_owned(),
                })?;

        Ok(Record {
            relative_time,
            source_address: field(1).to_owned(),
            destination_address: field(2).to_owned(),
            category: taxonomy::resolve(code),
            frame_length,
        })
    }

    /// 헤더가 있는 구분자 텍스트 전체를 디코딩합니다.
    ///
    /// 잘못된 행은 건너뛰고 개수만 집계합니다.
    ///
    /// # Errors
    ///
    /// 입력 스트림 자체의 I/O 에러만 반환합니다.
    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<DecodeOutcome, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let mut outcome = DecodeOutcome::default();

        for (i, result) in csv_reader.records().enumerate() {
            // 헤더가 1행이므로 데이터는 2행부터
            let line = i as u64 + 2;
            let decoded = match result {
                Ok(row) => self.decode_row(&row, line),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => Err(SkippableDecodeError::Malformed {
                    line: e.position().map_or(line, |p| p.line()),
                    reason: e.to_string(),
                }),
            };

            match decoded {
                Ok(record) => {
                    if record.category == Category::Unknown {
                        outcome.unknown += 1;
                    }
                    outcome.records.push(record);
                }
                Err(e) => {
                    debug!(error = %e, "skipping malformed row");
                    outcome.skipped += 1;
                }
            }
        }

        metrics::counter!(m::RECORDS_DECODED_TOTAL).increment(outcome.records.len() as u64);
        metrics::counter!(m::RECORDS_SKIPPED_TOTAL).increment(outcome.skipped as u64);
        metrics::counter!(m::RECORDS_UNKNOWN_TOTAL).increment(outcome.unknown as u64);

        Ok(outcome)
    }

    /// 바이트 버퍼를 디코딩합니다.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodeOutcome, DatasetError> {
        self.decode_reader(bytes)
    }
}
