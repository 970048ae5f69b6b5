//! PFCP 메시지 유형 분류표
//!
//! 메시지 유형 코드(`pfcp.msg_type`)를 정규화된 범주 이름으로 매핑하는
//! 고정 테이블입니다. 프로세스 전역 상수이며 변경되지 않습니다.
//!
//! 선언 순서가 곧 데이터셋 출력 컬럼 순서입니다. 서로 다른 캡처에서 만든
//! 데이터셋 파일이 같은 스키마를 갖도록, 관측 여부와 무관하게 모든 범주가
//! 항상 컬럼으로 출력됩니다.
//!
//! # 사용 예시
//! ```
//! use pfcpmeter_core::taxonomy::{self, Category};
//!
//! assert_eq!(taxonomy::resolve(54).name(), "session_deletion_request");
//! assert_eq!(taxonomy::resolve(99), Category::Unknown);
//! assert_eq!(taxonomy::len(), 23);
//! ```

use std::fmt;

use serde::{Serialize, Serializer};

/// 분류표에 없는 코드에 부여되는 범주 이름
pub const UNKNOWN: &str = "unknown";

/// 메시지 유형 한 항목 (코드 → 범주 이름)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageKind {
    /// PFCP 메시지 유형 코드
    pub code: u8,
    /// 정규화된 범주 이름 (출력 컬럼명)
    pub name: &'static str,
}

const fn kind(code: u8, name: &'static str) -> MessageKind {
    MessageKind { code, name }
}

/// PFCP 메시지 유형 테이블 (선언 순서 = 출력 컬럼 순서)
pub const MESSAGE_KINDS: [MessageKind; 23] = [
    // 노드 관련 메시지
    kind(1, "heartbeat_request"),
    kind(2, "heartbeat_response"),
    kind(3, "pfd_management_request"),
    kind(4, "pfd_management_response"),
    kind(5, "association_setup_request"),
    kind(6, "association_setup_response"),
    kind(7, "association_update_request"),
    kind(8, "association_update_response"),
    kind(9, "association_release_request"),
    kind(10, "association_release_response"),
    kind(11, "version_not_supported_response"),
    kind(12, "node_report_request"),
    kind(13, "node_report_response"),
    kind(14, "session_set_deletion_request"),
    kind(15, "session_set_deletion_response"),
    // 세션 관련 메시지
    kind(50, "session_establishment_request"),
    kind(51, "session_establishment_response"),
    kind(52, "session_modification_request"),
    kind(53, "session_modification_response"),
    kind(54, "session_deletion_request"),
    kind(55, "session_deletion_response"),
    kind(56, "session_report_request"),
    kind(57, "session_report_response"),
];

/// 분류표 항목 수 (출력 범주 컬럼 수)
pub const CATEGORY_COUNT: usize = MESSAGE_KINDS.len();

/// 레코드의 메시지 범주
///
/// `Known`은 분류표 내 컬럼 인덱스를 담습니다. 범위를 벗어난 인덱스는
/// `Unknown`과 같이 취급됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// 분류표에 정의된 범주 (컬럼 인덱스)
    Known(usize),
    /// 분류표에 없는 코드
    Unknown,
}

impl Category {
    /// 범주 이름을 반환합니다. `Unknown`은 `"unknown"`입니다.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Known(column) => MESSAGE_KINDS.get(*column).map_or(UNKNOWN, |k| k.name),
            Self::Unknown => UNKNOWN,
        }
    }

    /// 출력 컬럼 인덱스. `Unknown`과 범위 밖 인덱스는 컬럼이 없습니다.
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Known(column) if *column < CATEGORY_COUNT => Some(*column),
            _ => None,
        }
    }

    /// 범주 이름으로 범주를 찾습니다.
    pub fn from_name(name: &str) -> Self {
        column_of(name).map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// 메시지 유형 코드를 범주로 변환합니다.
///
/// 전역 함수(total function)입니다. 알 수 없는 코드는 에러가 아니라
/// [`Category::Unknown`]으로 매핑됩니다.
pub fn resolve(code: i64) -> Category {
    MESSAGE_KINDS
        .iter()
        .position(|k| i64::from(k.code) == code)
        .map_or(Category::Unknown, Category::Known)
}

/// 범주 이름의 컬럼 인덱스를 반환합니다.
pub fn column_of(name: &str) -> Option<usize> {
    MESSAGE_KINDS.iter().position(|k| k.name == name)
}

/// 선언 순서대로 범주 이름을 순회합니다.
pub fn category_names() -> impl ExactSizeIterator<Item = &'static str> {
    MESSAGE_KINDS.iter().map(|k| k.name)
}

/// 분류표 항목 수
pub const fn len() -> usize {
    CATEGORY_COUNT
}
