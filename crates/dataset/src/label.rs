//! 휴리스틱 윈도우 라벨링
//!
//! 정답 라벨이 없는 캡처에서 학습용 라벨을 만들기 위한 결정적 규칙 목록입니다.
//! 규칙은 순서대로 평가되며 처음 일치한 규칙의 라벨이 부여됩니다.
//!
//! 기본 규칙 (임계값은 설정 가능):
//!
//! | 순서 | 그룹 | 임계값 | 라벨 |
//! |---|---|---|---|
//! | 1 | `heartbeat` | 0.8 | `normal` (0) |
//! | 2 | `session_deletion` | 0.2 | `del_att` (1) |
//! | 3 | `session_modification` | 0.2 | `mod_att` (2) |
//! | 4 | `session_establishment` | 0.2 | `est_att` (3) |
//! | - | (일치 없음) | - | `mix_att` (4) |
//!
//! 그룹 합은 기본적으로 `2 * count(<group>_request)` 입니다
//! ([`GroupSumMode::DoubledRequest`]). 기존 데이터셋과 같은 라벨을 만들기 위해
//! 이 계산을 유지하며, `request + response` 합이 필요하면
//! [`GroupSumMode::RequestPlusResponse`]를 사용합니다.
//!
//! 비율의 분모는 unknown 레코드를 포함한 윈도우 전체 레코드 수
//! ([`AggregatedRow::total`])입니다.

use std::fmt;
use std::str::FromStr;

use pfcpmeter_core::taxonomy;
use pfcpmeter_core::types::AttackLabel;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::AggregatedRow;
use crate::error::DatasetError;

/// 그룹 합 계산 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSumMode {
    /// `2 * count(<group>_request)` (기본값)
    #[default]
    DoubledRequest,
    /// `count(<group>_request) + count(<group>_response)`
    RequestPlusResponse,
}

impl GroupSumMode {
    /// 설정 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoubledRequest => "doubled_request",
            Self::RequestPlusResponse => "request_plus_response",
        }
    }
}

impl fmt::Display for GroupSumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupSumMode {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "doubled_request" => Ok(Self::DoubledRequest),
            "request_plus_response" => Ok(Self::RequestPlusResponse),
            other => Err(DatasetError::Config {
                field: "label.sum_mode".to_owned(),
                reason: format!(
                    "unknown sum mode '{other}' (expected: doubled_request, request_plus_response)"
                ),
            }),
        }
    }
}

/// 라벨 규칙 하나
///
/// `group_sum >= threshold * total` 이면 일치합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRule {
    /// 메시지 그룹 이름 (`heartbeat`, `session_deletion` 등)
    pub group: &'static str,
    /// `<group>_request` 컬럼 인덱스
    request: usize,
    /// `<group>_response` 컬럼 인덱스
    response: usize,
    /// 전체 대비 비율 임계값
    pub threshold: f64,
    /// 일치 시 부여할 라벨
    pub label: AttackLabel,
}

impl LabelRule {
    /// 그룹 이름으로 규칙을 생성합니다.
    ///
    /// # Errors
    ///
    /// `<group>_request` / `<group>_response` 범주가 분류표에 없거나
    /// 임계값이 양의 유한값이 아니면 에러를 반환합니다.
    pub fn new(group: &'static str, threshold: f64, label: AttackLabel) -> Result<Self, DatasetError> {
        let column = |suffix: &str| {
            let name = format!("{group}_{suffix}");
            taxonomy::column_of(&name).ok_or_else(|| DatasetError::Config {
                field: "label.rules".to_owned(),
                reason: format!("category '{name}' is not in the taxonomy"),
            })
        };
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(DatasetError::Config {
                field: "label.threshold".to_owned(),
                reason: format!("must be a positive number, got {threshold}"),
            });
        }
        Ok(Self {
            group,
            request: column("request")?,
            response: column("response")?,
            threshold,
            label,
        })
    }

    /// 행에서 그룹 합을 계산합니다.
    pub fn group_sum(&self, row: &AggregatedRow, mode: GroupSumMode) -> u64 {
        let request = row.counts.get(self.request);
        match mode {
            GroupSumMode::DoubledRequest => request * 2,
            GroupSumMode::RequestPlusResponse => request + row.counts.get(self.response),
        }
    }

    /// 규칙이 행에 일치하는지 판정합니다.
    pub fn matches(&self, row: &AggregatedRow, mode: GroupSumMode) -> bool {
        let total = row.total();
        total > 0 && self.group_sum(row, mode) as f64 >= self.threshold * total as f64
    }
}

/// 순서 있는 규칙 목록 기반 라벨러
#[derive(Debug, Clone)]
pub struct Labeler {
    rules: Vec<LabelRule>,
    sum_mode: GroupSumMode,
    fallback: AttackLabel,
}

impl Labeler {
    /// 기본 규칙 목록으로 라벨러를 생성합니다.
    ///
    /// # Errors
    ///
    /// 임계값이 양의 유한값이 아니면 에러를 반환합니다.
    pub fn new(
        normal_threshold: f64,
        attack_threshold: f64,
        sum_mode: GroupSumMode,
    ) -> Result<Self, DatasetError> {
        let rules = vec![
            LabelRule::new("heartbeat", normal_threshold, AttackLabel::Normal)?,
            LabelRule::new("session_deletion", attack_threshold, AttackLabel::Deletion)?,
            LabelRule::new("session_modification", attack_threshold, AttackLabel::Modification)?,
            LabelRule::new("session_establishment", attack_threshold, AttackLabel::Establishment)?,
        ];
        Ok(Self::with_rules(rules, sum_mode))
    }

    /// 임의의 규칙 목록으로 라벨러를 생성합니다.
    pub fn with_rules(rules: Vec<LabelRule>, sum_mode: GroupSumMode) -> Self {
        Self {
            rules,
            sum_mode,
            fallback: AttackLabel::default(),
        }
    }

    /// 평가 순서의 규칙 목록
    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }

    /// 그룹 합 계산 방식
    pub fn sum_mode(&self) -> GroupSumMode {
        self.sum_mode
    }

    /// 행의 라벨을 계산합니다.
    ///
    /// 빈 행(`total == 0`)은 규칙을 평가하지 않고 기본 라벨을 반환합니다.
    pub fn label(&self, row: &AggregatedRow) -> AttackLabel {
        if row.total() == 0 {
            return self.fallback;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(row, self.sum_mode))
            .map_or(self.fallback, |rule| rule.label)
    }

    /// 라벨이 없는 행에 라벨을 부여합니다.
    ///
    /// 이미 라벨이 있는 행은 건드리지 않습니다. 새로 라벨을 부여한 행 수를 반환합니다.
    pub fn apply(&self, rows: &mut [AggregatedRow]) -> usize {
        let mut labeled = 0;
        for row in rows.iter_mut().filter(|r| r.label.is_none()) {
            let label = self.label(row);
            debug!(window = row.window.index, total = row.total(), %label, "window labeled");
            row.label = Some(label);
            labeled += 1;
        }
        labeled
    }
}

impl Default for Labeler {
    fn default() -> Self {
        // 기본 임계값은 항상 유효하므로 규칙 생성이 실패하지 않음
        Self::new(0.8, 0.2, GroupSumMode::DoubledRequest)
            .unwrap_or_else(|_| Self::with_rules(Vec::new(), GroupSumMode::DoubledRequest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CategoryCounts;
    use pfcpmeter_core::types::Window;

    fn row(counts: &[(&str, u64)], unknown: u64) -> AggregatedRow {
        let mut c = CategoryCounts::default();
        for (name, count) in counts {
            c.set(taxonomy::column_of(name).unwrap(), *count);
        }
        AggregatedRow {
            window: Window {
                index: 1,
                start_time: 0.0,
                end_time: 120.0,
            },
            counts: c,
            unknown,
            label: None,
        }
    }

    #[test]
    fn heartbeat_dominant_is_normal() {
        let r = row(&[("heartbeat_request", 80), ("session_report_request", 20)], 0);
        let label = Labeler::default().label(&r);
        assert_eq!(label, AttackLabel::Normal);
        assert_eq!(label.value(), 0);
    }

    #[test]
    fn deletion_share_is_del_att() {
        let r = row(
            &[
                ("session_deletion_request", 15),
                ("heartbeat_request", 10),
                ("session_report_request", 75),
            ],
            0,
        );
        assert_eq!(r.total(), 100);
        let label = Labeler::default().label(&r);
        assert_eq!(label, AttackLabel::Deletion);
        assert_eq!(label.value(), 1);
    }

    #[test]
    fn all_zero_row_is_mixed() {
        let r = row(&[], 0);
        let label = Labeler::default().label(&r);
        assert_eq!(label, AttackLabel::Mixed);
        assert_eq!(label.value(), 4);
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // 삭제/수정 모두 임계값 초과: 순서상 삭제가 먼저
        let r = row(
            &[
                ("session_deletion_request", 30),
                ("session_modification_request", 40),
                ("session_report_request", 30),
            ],
            0,
        );
        assert_eq!(Labeler::default().label(&r), AttackLabel::Deletion);
    }

    #[test]
    fn modification_and_establishment_rules() {
        let r = row(&[("session_modification_request", 10), ("heartbeat_response", 90)], 0);
        assert_eq!(Labeler::default().label(&r), AttackLabel::Modification);

        let r = row(&[("session_establishment_request", 10), ("heartbeat_response", 90)], 0);
        assert_eq!(Labeler::default().label(&r), AttackLabel::Establishment);
    }

    #[test]
    fn threshold_is_inclusive() {
        // 2 * 40 = 80 >= 0.8 * 100
        let r = row(&[("heartbeat_request", 40), ("heartbeat_response", 60)], 0);
        assert_eq!(Labeler::default().label(&r), AttackLabel::Normal);
    }

    #[test]
    fn unknown_records_count_toward_total() {
        // 2 * 9 = 18 < 0.2 * 100 이므로 어떤 규칙도 일치하지 않음
        let r = row(&[("session_deletion_request", 9)], 91);
        assert_eq!(Labeler::default().label(&r), AttackLabel::Mixed);
    }

    #[test]
    fn request_plus_response_mode() {
        let r = row(
            &[
                ("heartbeat_request", 45),
                ("heartbeat_response", 45),
                ("session_report_request", 10),
            ],
            0,
        );
        let doubled = Labeler::new(0.8, 0.2, GroupSumMode::DoubledRequest).unwrap();
        let summed = Labeler::new(0.8, 0.2, GroupSumMode::RequestPlusResponse).unwrap();
        // 2 * 45 = 90 >= 80, 45 + 45 = 90 >= 80
        assert_eq!(doubled.label(&r), AttackLabel::Normal);
        assert_eq!(summed.label(&r), AttackLabel::Normal);

        let r = row(&[("heartbeat_request", 45), ("session_report_request", 55)], 0);
        assert_eq!(doubled.label(&r), AttackLabel::Normal);
        assert_eq!(summed.label(&r), AttackLabel::Mixed);
    }

    #[test]
    fn apply_skips_prelabeled_rows() {
        let mut rows = vec![
            row(&[("heartbeat_request", 10)], 0),
            row(&[("heartbeat_request", 10)], 0),
        ];
        rows[1].label = Some(AttackLabel::Establishment);
        let labeled = Labeler::default().apply(&mut rows);
        assert_eq!(labeled, 1);
        assert_eq!(rows[0].label, Some(AttackLabel::Normal));
        assert_eq!(rows[1].label, Some(AttackLabel::Establishment));
    }

    #[test]
    fn rule_order_is_normal_del_mod_est() {
        let labels: Vec<AttackLabel> = Labeler::default().rules().iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                AttackLabel::Normal,
                AttackLabel::Deletion,
                AttackLabel::Modification,
                AttackLabel::Establishment
            ]
        );
    }

    #[test]
    fn rule_for_unknown_group_is_rejected() {
        assert!(LabelRule::new("session_teleport", 0.2, AttackLabel::Mixed).is_err());
        assert!(LabelRule::new("heartbeat", 0.0, AttackLabel::Normal).is_err());
    }

    #[test]
    fn sum_mode_parses() {
        assert_eq!(
            "request_plus_response".parse::<GroupSumMode>().unwrap(),
            GroupSumMode::RequestPlusResponse
        );
        assert!("tripled".parse::<GroupSumMode>().is_err());
    }
}
