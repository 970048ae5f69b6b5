//! 캡처 입력 -- 파일 탐색과 필드 추출기
//!
//! 각 추출기는 core의 [`FieldExtractor`](pfcpmeter_core::pipeline::FieldExtractor)
//! trait을 구현하며, 캡처 파일 하나를 디코딩된 필드 행 텍스트로 바꿉니다.
//!
//! # 추출기 목록
//! - [`TsharkExtractor`]: 외부 `tshark`로 pcap을 디코딩
//! - [`DecodedCsvExtractor`]: 이미 디코딩된 CSV 파일을 그대로 읽음

pub mod decoded;
pub mod discover;
pub mod tshark;

pub use decoded::DecodedCsvExtractor;
pub use discover::{discover_captures, has_extension};
pub use tshark::TsharkExtractor;

/// 추출 결과 컬럼 (tshark `-e` 필드, 디코딩된 CSV 헤더)
pub const EXTRACTED_FIELDS: [&str; 5] = [
    "frame.time_relative",
    "ip.src",
    "ip.dst",
    "pfcp.msg_type",
    "frame.len",
];
