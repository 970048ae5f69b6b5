//! 윈도우별 범주 카운트 집계
//!
//! [`Aggregator`]는 [`WindowAssignment`]를 받아 윈도우마다 한 행을 만듭니다.
//! 각 행은 분류표의 모든 범주에 대한 카운트를 선언 순서대로 가지며,
//! 관측되지 않은 범주도 명시적인 0으로 채워집니다.

use pfcpmeter_core::taxonomy::{self, CATEGORY_COUNT, Category};
use pfcpmeter_core::types::{AttackLabel, Window};
use serde::Serialize;

use crate::window::WindowAssignment;

/// 분류표 범주별 카운트 (고정 폭, 선언 순서)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCounts([u64; CATEGORY_COUNT]);

impl Default for CategoryCounts {
    fn default() -> Self {
        Self([0; CATEGORY_COUNT])
    }
}

impl CategoryCounts {
    /// 컬럼 인덱스의 카운트
    pub fn get(&self, column: usize) -> u64 {
        self.0.get(column).copied().unwrap_or(0)
    }

    /// 범주 이름의 카운트 (분류표에 없는 이름은 0)
    pub fn by_name(&self, name: &str) -> u64 {
        taxonomy::column_of(name).map_or(0, |c| self.0[c])
    }

    /// 컬럼 값을 설정합니다.
    pub fn set(&mut self, column: usize, value: u64) {
        if let Some(slot) = self.0.get_mut(column) {
            *slot = value;
        }
    }

    /// 분류표 범주 합계 (unknown 제외)
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// 선언 순서대로 `(범주 이름, 카운트)`를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        taxonomy::category_names().zip(self.0.iter().copied())
    }

    /// 선언 순서의 카운트 슬라이스
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// 범위를 벗어난 컬럼이면 `false`를 반환하고 아무것도 세지 않습니다.
    fn increment(&mut self, column: usize) -> bool {
        match self.0.get_mut(column) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(CATEGORY_COUNT))?;
        for (name, count) in self.iter() {
            map.serialize_entry(name, &count)?;
        }
        map.end()
    }
}

/// 윈도우 하나의 집계 행
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    /// 대상 윈도우
    pub window: Window,
    /// 분류표 범주별 카운트
    pub counts: CategoryCounts,
    /// 분류표에 없는 메시지 유형 레코드 수 (출력 컬럼 아님)
    pub unknown: u64,
    /// 부여된 라벨 (라벨러 또는 고정 라벨)
    pub label: Option<AttackLabel>,
}

impl AggregatedRow {
    /// 빈 행을 생성합니다.
    pub fn empty(window: Window) -> Self {
        Self {
            window,
            counts: CategoryCounts::default(),
            unknown: 0,
            label: None,
        }
    }

    /// 행의 전체 레코드 수 (분류표 범주 + unknown)
    pub fn total(&self) -> u64 {
        self.counts.total() + self.unknown
    }

    /// 레코드가 하나도 없는 행인지
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// 확정된 라벨, 없으면 기본 라벨 (`mix_att`)
    pub fn effective_label(&self) -> AttackLabel {
        self.label.unwrap_or_default()
    }
}

/// 윈도우별 카운트 집계기
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    emit_empty: bool,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self { emit_empty: true }
    }
}

impl Aggregator {
    /// 새 집계기를 생성합니다.
    ///
    /// `emit_empty`가 `false`이면 레코드가 없는 윈도우 행을 생략합니다.
    pub fn new(emit_empty: bool) -> Self {
        Self { emit_empty }
    }

    /// 할당 결과를 윈도우 순서의 행 목록으로 집계합니다.
    pub fn aggregate(&self, assignment: &WindowAssignment<'_>) -> Vec<AggregatedRow> {
        let mut rows: Vec<AggregatedRow> = assignment
            .windows()
            .iter()
            .copied()
            .map(AggregatedRow::empty)
            .collect();

        for (record, slot) in assignment.slots() {
            let row = &mut rows[slot];
            let counted = match record.category {
                Category::Known(column) => row.counts.increment(column),
                Category::Unknown => false,
            };
            if !counted {
                row.unknown += 1;
            }
        }

        if !self.emit_empty {
            rows.retain(|row| !row.is_empty());
        }
        rows
    }
}
