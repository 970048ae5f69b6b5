//! 윈도우 할당/집계 속성 테스트 (proptest)

use pfcpmeter_core::taxonomy::{self, CATEGORY_COUNT, Category};
use pfcpmeter_core::types::Record;
use pfcpmeter_dataset::{Aggregator, Labeler, WindowAssigner, WindowClosure};
use proptest::prelude::*;

/// 분류표 코드 + 알 수 없는 코드 몇 개
fn message_code() -> impl Strategy<Value = i64> {
    prop_oneof![
        9 => (0..taxonomy::MESSAGE_KINDS.len()).prop_map(|i| i64::from(taxonomy::MESSAGE_KINDS[i].code)),
        1 => prop_oneof![Just(0i64), Just(16), Just(99), Just(255)],
    ]
}

fn records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((0.0f64..5_000.0, message_code()), 1..300).prop_map(|items| {
        items
            .into_iter()
            .map(|(t, code)| Record {
                relative_time: t,
                source_address: "10.0.0.1".to_owned(),
                destination_address: "10.0.0.2".to_owned(),
                category: taxonomy::resolve(code),
                frame_length: 64,
            })
            .collect()
    })
}

fn closure() -> impl Strategy<Value = WindowClosure> {
    prop_oneof![Just(WindowClosure::Left), Just(WindowClosure::Right)]
}

fn time_range(records: &[Record]) -> (f64, f64) {
    let min = records.iter().map(|r| r.relative_time).fold(f64::INFINITY, f64::min);
    let max = records.iter().map(|r| r.relative_time).fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn expected_windows(records: &[Record], interval: f64) -> usize {
    let (min, max) = time_range(records);
    (((max - min) / interval).ceil() as usize).max(1)
}

proptest! {
    #[test]
    fn row_count_is_ceil_of_span(records in records(), interval in 0.5f64..600.0, closure in closure()) {
        let assigner = WindowAssigner::new(interval, closure).unwrap();
        let rows = Aggregator::new(true).aggregate(&assigner.assign(&records).unwrap());

        let expected = expected_windows(&records, interval);
        let (min, max) = time_range(&records);
        // 마지막 경계가 반올림으로 max에 못 미칠 때만 한 칸 늘어남
        let short = min + expected as f64 * interval < max;
        let want = if short { expected + 1 } else { expected };
        prop_assert_eq!(rows.len(), want, "expected={} short={}", expected, short);
        for row in &rows {
            prop_assert_eq!(row.counts.as_slice().len(), CATEGORY_COUNT);
        }
    }

    #[test]
    fn column_sums_equal_input_counts(records in records(), interval in 0.5f64..600.0, closure in closure()) {
        let assigner = WindowAssigner::new(interval, closure).unwrap();
        let rows = Aggregator::new(true).aggregate(&assigner.assign(&records).unwrap());

        let mut expected = [0u64; CATEGORY_COUNT];
        let mut unknown = 0u64;
        for r in &records {
            match r.category {
                Category::Known(c) => expected[c] += 1,
                Category::Unknown => unknown += 1,
            }
        }
        for (c, want) in expected.iter().enumerate() {
            let got: u64 = rows.iter().map(|row| row.counts.get(c)).sum();
            prop_assert_eq!(got, *want);
        }
        prop_assert_eq!(rows.iter().map(|row| row.unknown).sum::<u64>(), unknown);
    }

    #[test]
    fn min_and_max_land_in_first_and_last_window(records in records(), interval in 0.5f64..600.0, closure in closure()) {
        let assigner = WindowAssigner::new(interval, closure).unwrap();
        let assignment = assigner.assign(&records).unwrap();
        let last = assignment.windows().len();

        let min = records.iter().map(|r| r.relative_time).fold(f64::INFINITY, f64::min);
        let max = records.iter().map(|r| r.relative_time).fold(f64::NEG_INFINITY, f64::max);
        for (record, window) in assignment.iter() {
            if record.relative_time == min {
                prop_assert_eq!(window.index, 1);
            }
            if record.relative_time == max {
                prop_assert_eq!(window.index, last);
            }
            prop_assert!(window.start_time <= record.relative_time);
            prop_assert!(record.relative_time <= window.end_time);
        }
    }

    #[test]
    fn pipeline_is_idempotent(records in records(), interval in 0.5f64..600.0) {
        let assigner = WindowAssigner::new(interval, WindowClosure::Left).unwrap();
        let labeler = Labeler::default();

        let mut first = Aggregator::default().aggregate(&assigner.assign(&records).unwrap());
        labeler.apply(&mut first);
        let mut second = Aggregator::default().aggregate(&assigner.assign(&records).unwrap());
        labeler.apply(&mut second);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_row_gets_a_label(records in records(), interval in 0.5f64..600.0) {
        let assigner = WindowAssigner::new(interval, WindowClosure::Left).unwrap();
        let mut rows = Aggregator::default().aggregate(&assigner.assign(&records).unwrap());
        let labeled = Labeler::default().apply(&mut rows);
        prop_assert_eq!(labeled, rows.len());
        prop_assert!(rows.iter().all(|r| r.label.is_some()));
    }
}
