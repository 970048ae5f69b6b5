//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pfcpmeter_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! metrics::counter!(pfcpmeter_core::metrics::RECORDS_DECODED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 라벨 레이블 키 (normal, del_att, mod_att, est_att, mix_att)
pub const LABEL_ATTACK: &str = "label";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 추출기 레이블 키 (tshark, decoded-csv)
pub const LABEL_EXTRACTOR: &str = "extractor";

// ─── 디코더 메트릭 ─────────────────────────────────────────────────

/// 디코딩된 레코드 수 (counter)
pub const RECORDS_DECODED_TOTAL: &str = "pfcpmeter_records_decoded_total";

/// 건너뛴 잘못된 행 수 (counter)
pub const RECORDS_SKIPPED_TOTAL: &str = "pfcpmeter_records_skipped_total";

/// 분류표에 없는 메시지 유형 레코드 수 (counter)
pub const RECORDS_UNKNOWN_TOTAL: &str = "pfcpmeter_records_unknown_total";

// ─── 윈도우/라벨 메트릭 ────────────────────────────────────────────

/// 출력된 윈도우 행 수 (counter)
pub const WINDOWS_EMITTED_TOTAL: &str = "pfcpmeter_windows_emitted_total";

/// 라벨별 부여 횟수 (counter, label: label)
pub const LABELS_ASSIGNED_TOTAL: &str = "pfcpmeter_labels_assigned_total";

// ─── 캡처 처리 메트릭 ──────────────────────────────────────────────

/// 처리 완료된 캡처 수 (counter, label: result)
pub const CAPTURES_PROCESSED_TOTAL: &str = "pfcpmeter_captures_processed_total";

/// 캡처 하나의 처리 시간 (histogram, 초)
pub const CAPTURE_DURATION_SECONDS: &str = "pfcpmeter_capture_duration_seconds";

/// 필드 추출 시간 (histogram, 초, label: extractor)
pub const EXTRACTION_DURATION_SECONDS: &str = "pfcpmeter_extraction_duration_seconds";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 캡처 처리 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 600s 범위 (tshark 디코딩 포함)
pub const CAPTURE_DURATION_BUCKETS: [f64; 10] =
    [0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 60.0, 300.0, 600.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        RECORDS_DECODED_TOTAL,
        "Total number of PFCP records decoded from extracted rows"
    );
    describe_counter!(
        RECORDS_SKIPPED_TOTAL,
        "Total number of malformed rows skipped by the decoder"
    );
    describe_counter!(
        RECORDS_UNKNOWN_TOTAL,
        "Total number of records whose message type is not in the taxonomy"
    );
    describe_counter!(
        WINDOWS_EMITTED_TOTAL,
        "Total number of window rows written to datasets"
    );
    describe_counter!(
        LABELS_ASSIGNED_TOTAL,
        "Window labels assigned, by label"
    );
    describe_counter!(
        CAPTURES_PROCESSED_TOTAL,
        "Total number of captures processed, by result"
    );
    describe_histogram!(
        CAPTURE_DURATION_SECONDS,
        "Time to turn a single capture into a dataset file in seconds"
    );
    describe_histogram!(
        EXTRACTION_DURATION_SECONDS,
        "Time spent in the external field extractor in seconds"
    );
}
