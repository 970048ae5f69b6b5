//! 데이터셋 CSV 기록
//!
//! 출력 스키마는 분류표 선언 순서의 범주 컬럼 23개 뒤에 `Label`, `Label_val`
//! 컬럼이 붙는 고정 형식입니다. 윈도우 번호는 행 순서로 표현되며 별도 컬럼이
//! 없습니다.
//!
//! 분류표에 없는 메시지 유형의 레코드는 컬럼으로 기록되지 않지만 라벨 비율의
//! 분모(윈도우 전체 레코드 수)에는 포함됩니다. 따라서 한 행의 범주 컬럼 합으로
//! `Label`을 다시 계산하면 unknown 레코드가 있는 윈도우에서 결과가 다를 수 있습니다.
//!
//! 파일 기록은 같은 디렉토리의 임시 파일에 쓴 뒤 rename 하므로, 처리 도중
//! 중단되어도 부분적으로 기록된 데이터셋 파일이 남지 않습니다.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pfcpmeter_core::taxonomy;
use tracing::{debug, warn};

use crate::aggregate::AggregatedRow;
use crate::error::DatasetError;

/// 라벨 문자열 컬럼명
pub const LABEL_COLUMN: &str = "Label";

/// 라벨 숫자 코드 컬럼명
pub const LABEL_VALUE_COLUMN: &str = "Label_val";

/// 캡처 경로와 윈도우 길이로 데이터셋 파일 이름을 만듭니다.
///
/// `attack.pcap`, `120.0` → `attack_120.csv`
pub fn output_file_name(capture: &Path, interval: f64) -> String {
    format!("{}_{}.csv", file_stem(capture), interval)
}

/// 보존용 중간 CSV 파일 이름 (`<stem>_decoded.csv`)
pub fn intermediate_file_name(capture: &Path) -> String {
    format!("{}_decoded.csv", file_stem(capture))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_owned())
}

/// 데이터셋 CSV 기록기
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetWriter;

impl DatasetWriter {
    /// 새 기록기를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 출력 헤더 (범주 컬럼 + `Label` + `Label_val`)
    pub fn header() -> Vec<&'static str> {
        taxonomy::category_names()
            .chain([LABEL_COLUMN, LABEL_VALUE_COLUMN])
            .collect()
    }

    /// 헤더와 행들을 기록합니다. 기록한 행 수를 반환합니다.
    ///
    /// 라벨이 없는 행은 기본 라벨(`mix_att`)로 기록됩니다.
    pub fn write_rows<W: Write>(
        &self,
        writer: W,
        rows: &[AggregatedRow],
    ) -> Result<usize, DatasetError> {
        let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
        csv_writer.write_record(Self::header())?;

        for row in rows {
            let label = row.effective_label();
            let mut record: Vec<String> = row
                .counts
                .as_slice()
                .iter()
                .map(u64::to_string)
                .collect();
            record.push(label.as_str().to_owned());
            record.push(label.value().to_string());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(rows.len())
    }

    /// 데이터셋 파일을 원자적으로 기록합니다.
    ///
    /// 부모 디렉토리가 없으면 생성합니다.
    pub fn write_file(&self, path: &Path, rows: &[AggregatedRow]) -> Result<usize, DatasetError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;

        let tmp = temp_path(parent, path);
        let result = fs::File::create(&tmp)
            .map_err(DatasetError::from)
            .and_then(|file| self.write_rows(std::io::BufWriter::new(file), rows))
            .and_then(|written| {
                fs::rename(&tmp, path).map_err(|e| write_error(path, e))?;
                Ok(written)
            });

        match result {
            Ok(written) => {
                debug!(path = %path.display(), rows = written, "dataset written");
                Ok(written)
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&tmp) {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %tmp.display(), error = %remove_err, "failed to remove temp file");
                    }
                }
                Err(e)
            }
        }
    }
}

fn temp_path(dir: &Path, target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()))
}

fn write_error(path: &Path, e: std::io::Error) -> DatasetError {
    DatasetError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
