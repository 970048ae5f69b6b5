#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use pfcpmeter_core::taxonomy::{self, Category};
use pfcpmeter_core::types::Record;
use pfcpmeter_dataset::{Aggregator, Labeler, WindowAssigner, WindowClosure};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// (밀리초 단위 상대 시각, 메시지 유형 코드)
    records: Vec<(u32, i16)>,
    /// 윈도우 길이 (밀리초)
    interval_ms: u32,
    right_closed: bool,
    emit_empty: bool,
}

fuzz_target!(|input: FuzzInput| {
    if input.records.is_empty() {
        return;
    }
    if input.records.len() > 4096 {
        return;
    }
    // 시각 범위가 최대 ~50일이므로 윈도우 길이를 1분 이상으로 제한
    let interval = f64::from(input.interval_ms.max(60_000)) / 1000.0;

    let records: Vec<Record> = input
        .records
        .iter()
        .map(|&(ms, code)| Record {
            relative_time: f64::from(ms) / 1000.0,
            source_address: String::new(),
            destination_address: String::new(),
            category: taxonomy::resolve(i64::from(code)),
            frame_length: 0,
        })
        .collect();

    let closure = if input.right_closed {
        WindowClosure::Right
    } else {
        WindowClosure::Left
    };
    let Ok(assigner) = WindowAssigner::new(interval, closure) else {
        return;
    };

    // u32 밀리초 범위와 60초 이상 윈도우에서는 상한에 닿지 않는다
    let assignment = assigner
        .assign(&records)
        .expect("bounded span must stay under the window limit");
    let mut rows = Aggregator::new(input.emit_empty).aggregate(&assignment);
    Labeler::default().apply(&mut rows);

    // 모든 레코드는 정확히 한 행에 집계되어야 한다
    let known = records
        .iter()
        .filter(|r| matches!(r.category, Category::Known(_)))
        .count() as u64;
    let counted: u64 = rows.iter().map(|r| r.counts.total()).sum();
    assert_eq!(counted, known);

    let unknown: u64 = rows.iter().map(|r| r.unknown).sum();
    assert_eq!(unknown, records.len() as u64 - known);

    assert!(rows.iter().all(|r| r.label.is_some()));
});
