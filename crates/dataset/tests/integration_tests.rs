//! 통합 테스트 -- 디코딩된 필드 파일에서 데이터셋 파일까지의 전체 흐름 검증

use std::path::Path;
use std::sync::Arc;

use pfcpmeter_core::config::PfcpmeterConfig;
use pfcpmeter_core::taxonomy;
use pfcpmeter_core::types::AttackLabel;
use pfcpmeter_dataset::{
    BatchRunner, DatasetConfig, DatasetConfigBuilder, DatasetPipeline, DatasetPipelineBuilder,
    DecodedCsvExtractor, WindowClosure,
};

const HEADER: &str = "frame.time_relative,ip.src,ip.dst,pfcp.msg_type,frame.len\n";

fn pipeline(config: DatasetConfig) -> DatasetPipeline {
    DatasetPipelineBuilder::new()
        .config(config)
        .extractor(Arc::new(DecodedCsvExtractor::new()))
        .build()
        .expect("pipeline should build")
}

/// `count`개의 `code` 메시지 행을 `[start, start + 1)` 구간에 생성
fn rows(code: u8, count: usize, start: f64) -> String {
    (0..count)
        .map(|i| {
            format!(
                "\"{:.6}\",\"10.0.0.1\",\"10.0.0.2\",\"{code}\",\"90\"\n",
                start + i as f64 / count as f64
            )
        })
        .collect()
}

fn read_dataset(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).expect("dataset should exist");
    reader.records().map(|r| r.expect("valid csv row")).collect()
}

fn column(name: &str) -> usize {
    taxonomy::column_of(name).expect("known category")
}

/// heartbeat 위주 윈도우와 삭제 공격 윈도우가 각각 올바른 라벨을 받는지 확인
#[tokio::test]
async fn test_capture_to_labeled_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mixed.csv");

    // 윈도우 1: heartbeat_request 80 + session_report_request 20 → normal
    // 윈도우 2: session_deletion_request 15 + heartbeat_request 10 + session_report_request 75 → del_att
    let body = [
        rows(1, 80, 0.0),
        rows(56, 20, 10.0),
        rows(54, 15, 130.0),
        rows(1, 10, 140.0),
        rows(56, 75, 200.0),
    ]
    .concat();
    std::fs::write(&input, format!("{HEADER}{body}")).unwrap();

    let out = dir.path().join("dataset");
    let config = DatasetConfigBuilder::new()
        .interval(120.0)
        .output_dir(&out)
        .build()
        .unwrap();
    let report = pipeline(config).process_capture(&input).await.unwrap();

    assert_eq!(report.records, 200);
    assert_eq!(report.windows, 2);

    let dataset = read_dataset(&out.join("mixed_120.csv"));
    assert_eq!(dataset.len(), 2);

    let label_col = taxonomy::len();
    assert_eq!(&dataset[0][column("heartbeat_request")], "80");
    assert_eq!(&dataset[0][label_col], "normal");
    assert_eq!(&dataset[0][label_col + 1], "0");

    assert_eq!(&dataset[1][column("session_deletion_request")], "15");
    assert_eq!(&dataset[1][label_col], "del_att");
    assert_eq!(&dataset[1][label_col + 1], "1");
}

/// 관측되지 않은 범주도 모두 0 컬럼으로 출력되는지 확인
#[tokio::test]
async fn test_schema_is_fixed_across_captures() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dataset");
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    std::fs::write(&a, format!("{HEADER}{}", rows(1, 3, 0.0))).unwrap();
    std::fs::write(&b, format!("{HEADER}{}", rows(52, 3, 0.0))).unwrap();

    let config = DatasetConfigBuilder::new().output_dir(&out).build().unwrap();
    let pipeline = pipeline(config);
    let ra = pipeline.process_capture(&a).await.unwrap();
    let rb = pipeline.process_capture(&b).await.unwrap();

    let header_a = csv::Reader::from_path(&ra.output).unwrap().headers().unwrap().clone();
    let header_b = csv::Reader::from_path(&rb.output).unwrap().headers().unwrap().clone();
    assert_eq!(header_a, header_b);
    assert_eq!(header_a.len(), taxonomy::len() + 2);
    assert!(header_a.iter().all(|h| h != "unknown"));

    let row = &read_dataset(&ra.output)[0];
    assert_eq!(&row[column("session_modification_request")], "0");
}

/// 잘못된 행이 건너뛰어지고 이후 행 처리가 계속되는지 확인
#[tokio::test]
async fn test_malformed_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("noisy.csv");
    let body = "0.0,10.0.0.1,10.0.0.2,1,58\n\
                0.1,10.0.0.1,10.0.0.2,heartbeat,58\n\
                0.2,10.0.0.1,10.0.0.2,1;2,58\n\
                not-a-time,10.0.0.1,10.0.0.2,1,58\n\
                0.3,10.0.0.1,10.0.0.2,2,58\n";
    std::fs::write(&input, format!("{HEADER}{body}")).unwrap();

    let config = DatasetConfigBuilder::new()
        .output_dir(dir.path().join("out"))
        .build()
        .unwrap();
    let report = pipeline(config).process_capture(&input).await.unwrap();
    assert_eq!(report.records, 2);
    assert_eq!(report.skipped, 3);

    let dataset = read_dataset(&report.output);
    assert_eq!(&dataset[0][column("heartbeat_request")], "1");
    assert_eq!(&dataset[0][column("heartbeat_response")], "1");
}

/// 레코드가 없는 캡처는 헤더만 있는 파일을 만듭니다.
#[tokio::test]
async fn test_empty_capture_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    std::fs::write(&input, HEADER).unwrap();

    let config = DatasetConfigBuilder::new()
        .output_dir(dir.path().join("out"))
        .build()
        .unwrap();
    let report = pipeline(config).process_capture(&input).await.unwrap();
    assert_eq!(report.windows, 0);
    assert!(read_dataset(&report.output).is_empty());
}

/// 빈 윈도우는 0 행과 기본 라벨로 출력됩니다.
#[tokio::test]
async fn test_quiet_window_is_zero_row_with_default_label() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gap.csv");
    let body = [rows(1, 5, 0.0), rows(1, 5, 300.0)].concat();
    std::fs::write(&input, format!("{HEADER}{body}")).unwrap();

    let config = DatasetConfigBuilder::new()
        .output_dir(dir.path().join("out"))
        .build()
        .unwrap();
    let report = pipeline(config).process_capture(&input).await.unwrap();
    let dataset = read_dataset(&report.output);

    assert_eq!(dataset.len(), 3);
    let quiet = &dataset[1];
    assert!(quiet.iter().take(taxonomy::len()).all(|v| v == "0"));
    assert_eq!(&quiet[taxonomy::len()], "mix_att");
    assert_eq!(&quiet[taxonomy::len() + 1], "4");
}

/// 빈 윈도우 생략 설정
#[tokio::test]
async fn test_quiet_windows_can_be_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gap.csv");
    let body = [rows(1, 5, 0.0), rows(1, 5, 300.0)].concat();
    std::fs::write(&input, format!("{HEADER}{body}")).unwrap();

    let config = DatasetConfigBuilder::new()
        .output_dir(dir.path().join("out"))
        .emit_empty_windows(false)
        .build()
        .unwrap();
    let report = pipeline(config).process_capture(&input).await.unwrap();
    assert_eq!(report.windows, 2);
}

/// 고정 라벨이 지정되면 모든 윈도우에 같은 라벨이 부여됩니다.
#[tokio::test]
async fn test_fixed_label_from_core_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("est.csv");
    std::fs::write(&input, format!("{HEADER}{}", rows(1, 10, 0.0))).unwrap();

    let mut core = PfcpmeterConfig::default();
    core.label.fixed = Some("est_att".to_owned());
    core.output.directory = dir.path().join("out").display().to_string();
    let config = DatasetConfig::from_core(&core).unwrap();

    let report = pipeline(config).process_capture(&input).await.unwrap();
    assert_eq!(report.labels.get(AttackLabel::Establishment.as_str()), Some(&1));
    let dataset = read_dataset(&report.output);
    assert_eq!(&dataset[0][taxonomy::len()], "est_att");
}

/// 오른쪽 닫힘 윈도우에서 경계 레코드가 앞 윈도우에 속하는지 확인
#[tokio::test]
async fn test_right_closure_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("edge.csv");
    let body = "0.0,a,b,1,58\n120.0,a,b,54,58\n240.0,a,b,2,58\n";
    std::fs::write(&input, format!("{HEADER}{body}")).unwrap();

    let left = DatasetConfigBuilder::new()
        .output_dir(dir.path().join("left"))
        .build()
        .unwrap();
    let right = DatasetConfigBuilder::new()
        .closure(WindowClosure::Right)
        .output_dir(dir.path().join("right"))
        .build()
        .unwrap();

    let left_rows = read_dataset(&pipeline(left).process_capture(&input).await.unwrap().output);
    let right_rows = read_dataset(&pipeline(right).process_capture(&input).await.unwrap().output);

    let del = column("session_deletion_request");
    assert_eq!(&left_rows[0][del], "0");
    assert_eq!(&left_rows[1][del], "1");
    assert_eq!(&right_rows[0][del], "1");
    assert_eq!(&right_rows[1][del], "0");
}

/// 디렉토리 배치 처리: 실패한 캡처가 있어도 나머지는 출력됩니다.
#[tokio::test]
async fn test_batch_directory_processing() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for (name, code) in [("normal", 1u8), ("deletion", 54), ("establish", 50)] {
        std::fs::write(
            input.path().join(format!("{name}.csv")),
            format!("{HEADER}{}", rows(code, 10, 0.0)),
        )
        .unwrap();
    }
    std::fs::write(input.path().join("ignored.txt"), "not a capture").unwrap();

    let config = DatasetConfigBuilder::new()
        .output_dir(out.path())
        .extensions(vec!["csv".to_owned()])
        .workers(2)
        .build()
        .unwrap();
    let report = BatchRunner::new(Arc::new(pipeline(config)))
        .run_directory(input.path())
        .await
        .unwrap();

    assert_eq!(report.total(), 3);
    assert!(!report.has_failures());
    for name in ["normal_120.csv", "deletion_120.csv", "establish_120.csv"] {
        assert!(out.path().join(name).exists(), "{name}");
    }
    let labels: Vec<_> = report
        .succeeded
        .iter()
        .flat_map(|r| r.labels.keys().cloned())
        .collect();
    assert_eq!(labels, vec!["del_att", "est_att", "normal"]);
}
