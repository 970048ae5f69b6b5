//! 공통 도메인 타입: 레코드, 윈도우, 공격 라벨
//!
//! 디코더, 윈도우 할당기, 집계기, 라벨러가 공유하는 데이터 구조를 정의합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::taxonomy::Category;

/// 디코딩된 PFCP 메시지 레코드
///
/// 외부 디코더가 만든 한 행에서 생성되며, 생성 후 변경되지 않습니다.
/// 집계가 끝나면 버려집니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// 캡처 시작 기준 상대 시각 (초, 0 이상)
    pub relative_time: f64,
    /// 출발지 주소
    pub source_address: String,
    /// 목적지 주소
    pub destination_address: String,
    /// 메시지 범주 (분류표 범주 또는 unknown)
    pub category: Category,
    /// 프레임 길이 (바이트)
    pub frame_length: u64,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.6} {} -> {} {} len={}",
            self.relative_time,
            self.source_address,
            self.destination_address,
            self.category,
            self.frame_length,
        )
    }
}

/// 시간 윈도우
///
/// 윈도우는 연속적이고 길이가 같으며 서로 겹치지 않습니다.
/// 외부에 노출되는 키는 시각이 아니라 1부터 시작하는 `index`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// 윈도우 번호 (1부터 시작, 시간순)
    pub index: usize,
    /// 시작 경계
    pub start_time: f64,
    /// 끝 경계
    pub end_time: f64,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "part_{} [{:.3}, {:.3}]",
            self.index, self.start_time, self.end_time
        )
    }
}

/// 윈도우 공격 라벨
///
/// 숫자 코드(`Label_val`)는 학습 데이터의 클래스 번호로 사용됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackLabel {
    /// 정상 트래픽 (heartbeat 위주)
    #[serde(rename = "normal")]
    Normal,
    /// 세션 삭제 공격
    #[serde(rename = "del_att")]
    Deletion,
    /// 세션 수정 공격
    #[serde(rename = "mod_att")]
    Modification,
    /// 세션 수립 공격
    #[serde(rename = "est_att")]
    Establishment,
    /// 혼합 (어떤 규칙에도 해당하지 않음, 기본값)
    #[default]
    #[serde(rename = "mix_att")]
    Mixed,
}

impl AttackLabel {
    /// 전체 라벨 목록 (코드 순)
    pub const ALL: [AttackLabel; 5] = [
        Self::Normal,
        Self::Deletion,
        Self::Modification,
        Self::Establishment,
        Self::Mixed,
    ];

    /// 라벨 문자열 (`Label` 컬럼 값)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Deletion => "del_att",
            Self::Modification => "mod_att",
            Self::Establishment => "est_att",
            Self::Mixed => "mix_att",
        }
    }

    /// 라벨 숫자 코드 (`Label_val` 컬럼 값)
    pub fn value(&self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Deletion => 1,
            Self::Modification => 2,
            Self::Establishment => 3,
            Self::Mixed => 4,
        }
    }
}

impl fmt::Display for AttackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttackLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(trimmed) || l.value().to_string() == trimmed)
            .ok_or_else(|| {
                format!(
                    "unknown label '{}' (expected: normal, del_att, mod_att, est_att, mix_att)",
                    s
                )
            })
    }
}
