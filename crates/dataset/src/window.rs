//! 시간 윈도우 할당
//!
//! 레코드 집합의 `[min_time, max_time]` 범위를 길이 `interval`의 연속 윈도우로
//! 나누고 각 레코드를 정확히 하나의 윈도우에 할당합니다.
//!
//! # 경계 규칙 ([`WindowClosure::Left`], 기본값)
//!
//! - 경계점 `b_i = min_time + i * interval`
//! - 윈도우 `i`는 `[b_i, b_{i+1})` 이고, 마지막 윈도우만 오른쪽도 닫혀 있습니다.
//! - 윈도우 수는 `ceil((max_time - min_time) / interval)` 이며 최소 1입니다.
//!
//! [`WindowClosure::Right`]는 `(b_i, b_{i+1}]` 구간을 사용하고 첫 윈도우가
//! `min_time`을 포함합니다.
//!
//! 필요한 윈도우 수가 상한(기본 [`DEFAULT_MAX_WINDOWS`])을 넘으면 경계를
//! 만들기 전에 [`DatasetError::WindowLimit`]를 반환합니다.
//!
//! # 사용 예시
//! ```
//! use pfcpmeter_core::taxonomy;
//! use pfcpmeter_core::types::Record;
//! use pfcpmeter_dataset::window::{WindowAssigner, WindowClosure};
//!
//! let record = |t: f64| Record {
//!     relative_time: t,
//!     source_address: "10.0.0.1".to_owned(),
//!     destination_address: "10.0.0.2".to_owned(),
//!     category: taxonomy::resolve(1),
//!     frame_length: 58,
//! };
//! let records = vec![record(0.0), record(119.9), record(120.0), record(240.0)];
//!
//! let assigner = WindowAssigner::new(120.0, WindowClosure::Left).unwrap();
//! let assignment = assigner.assign(&records).unwrap();
//! assert_eq!(assignment.windows().len(), 2);
//! assert_eq!(assignment.window_for(3).unwrap().index, 2);
//! ```

use std::fmt;
use std::str::FromStr;

use pfcpmeter_core::types::{Record, Window};
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// 캡처 하나가 만들 수 있는 윈도우 수 기본 상한
pub const DEFAULT_MAX_WINDOWS: usize = 1_000_000;

/// 윈도우 경계 포함 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowClosure {
    /// `[b_i, b_{i+1})`, 마지막 윈도우는 `max_time` 포함 (기본값)
    #[default]
    Left,
    /// `(b_i, b_{i+1}]`, 첫 윈도우는 `min_time` 포함
    Right,
}

impl WindowClosure {
    /// 설정 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for WindowClosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowClosure {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(DatasetError::Config {
                field: "window.closure".to_owned(),
                reason: format!("unknown closure '{other}' (expected: left, right)"),
            }),
        }
    }
}

/// 레코드를 시간 윈도우에 할당하는 할당기
///
/// 상태가 없으며 같은 입력에 대해 항상 같은 결과를 냅니다.
#[derive(Debug, Clone, Copy)]
pub struct WindowAssigner {
    interval: f64,
    closure: WindowClosure,
    max_windows: usize,
}

impl WindowAssigner {
    /// 새 할당기를 생성합니다.
    ///
    /// # Errors
    ///
    /// `interval`이 양의 유한값이 아니면 에러를 반환합니다.
    pub fn new(interval: f64, closure: WindowClosure) -> Result<Self, DatasetError> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(DatasetError::Config {
                field: "window.interval".to_owned(),
                reason: format!("must be a positive number, got {interval}"),
            });
        }
        Ok(Self {
            interval,
            closure,
            max_windows: DEFAULT_MAX_WINDOWS,
        })
    }

    /// 윈도우 수 상한을 변경합니다.
    ///
    /// # Errors
    ///
    /// `max_windows`가 0이면 에러를 반환합니다.
    pub fn with_max_windows(mut self, max_windows: usize) -> Result<Self, DatasetError> {
        if max_windows == 0 {
            return Err(DatasetError::Config {
                field: "window.max_windows".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }
        self.max_windows = max_windows;
        Ok(self)
    }

    /// 윈도우 길이
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// 경계 포함 방식
    pub fn closure(&self) -> WindowClosure {
        self.closure
    }

    /// 윈도우 수 상한
    pub fn max_windows(&self) -> usize {
        self.max_windows
    }

    /// 레코드 집합을 윈도우에 할당합니다.
    ///
    /// 빈 입력은 윈도우가 없는 빈 할당을 반환합니다.
    ///
    /// # Errors
    ///
    /// 시각 범위가 윈도우 수 상한을 넘으면 [`DatasetError::WindowLimit`]를 반환합니다.
    pub fn assign<'a>(&self, records: &'a [Record]) -> Result<WindowAssignment<'a>, DatasetError> {
        let Some((min_time, max_time)) = time_range(records) else {
            return Ok(WindowAssignment {
                records,
                windows: Vec::new(),
                slots: Vec::new(),
            });
        };

        let boundaries = self.boundaries(min_time, max_time)?;
        let count = boundaries.len() - 1;

        let windows = boundaries
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Window {
                index: i + 1,
                start_time: pair[0],
                end_time: pair[1],
            })
            .collect();

        let slots = records
            .iter()
            .map(|r| self.slot_of(r.relative_time, min_time, &boundaries, count))
            .collect();

        Ok(WindowAssignment {
            records,
            windows,
            slots,
        })
    }

    /// 경계점 `b_0..=b_k`를 계산합니다 (`k` = 윈도우 수).
    fn boundaries(&self, min_time: f64, max_time: f64) -> Result<Vec<f64>, DatasetError> {
        let limit = self.max_windows as f64;
        let mut required = ((max_time - min_time) / self.interval).ceil().max(1.0);
        // 부동소수점 오차로 마지막 경계가 max_time에 못 미치는 경우 한 칸 보정
        if min_time + required * self.interval < max_time {
            required += 1.0;
        }
        if required.is_nan() || required > limit {
            return Err(DatasetError::WindowLimit {
                required,
                limit: self.max_windows,
            });
        }

        let count = required as usize;
        Ok((0..=count)
            .map(|i| min_time + i as f64 * self.interval)
            .collect())
    }

    /// 시각 `t`가 속하는 윈도우 슬롯(0부터)을 계산합니다.
    fn slot_of(&self, t: f64, min_time: f64, boundaries: &[f64], count: usize) -> usize {
        let last = count - 1;
        let offset = (t - min_time) / self.interval;

        match self.closure {
            WindowClosure::Left => {
                let mut slot = (offset.floor().max(0.0) as usize).min(last);
                if slot > 0 && t < boundaries[slot] {
                    slot -= 1;
                }
                if slot < last && t >= boundaries[slot + 1] {
                    slot += 1;
                }
                slot
            }
            WindowClosure::Right => {
                let mut slot = ((offset.ceil() - 1.0).max(0.0) as usize).min(last);
                if slot > 0 && t <= boundaries[slot] {
                    slot -= 1;
                }
                if slot < last && t > boundaries[slot + 1] {
                    slot += 1;
                }
                slot
            }
        }
    }
}

/// 레코드 집합의 최소/최대 시각
fn time_range(records: &[Record]) -> Option<(f64, f64)> {
    records.iter().map(|r| r.relative_time).fold(None, |acc, t| {
        Some(match acc {
            None => (t, t),
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
        })
    })
}

/// 윈도우 할당 결과 (레코드 → 윈도우)
#[derive(Debug, Clone)]
pub struct WindowAssignment<'a> {
    records: &'a [Record],
    windows: Vec<Window>,
    /// 레코드별 윈도우 슬롯 (`windows` 인덱스)
    slots: Vec<usize>,
}

impl<'a> WindowAssignment<'a> {
    /// 시간순 윈도우 목록 (index 1..=k)
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// 할당된 레코드 목록
    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    /// `i`번째 레코드가 속한 윈도우
    pub fn window_for(&self, i: usize) -> Option<&Window> {
        self.slots.get(i).map(|slot| &self.windows[*slot])
    }

    /// 할당이 비어 있는지 (입력 레코드 없음)
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// `(레코드, 윈도우)` 쌍을 입력 순서대로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Record, &Window)> + '_ {
        self.records
            .iter()
            .zip(self.slots.iter())
            .map(|(record, slot)| (record, &self.windows[*slot]))
    }

    /// `(레코드, 0부터 시작하는 윈도우 슬롯)` 쌍을 순회합니다.
    pub(crate) fn slots(&self) -> impl Iterator<Item = (&'a Record, usize)> + '_ {
        self.records.iter().zip(self.slots.iter().copied())
    }
}
