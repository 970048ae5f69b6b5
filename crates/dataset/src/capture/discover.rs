//! 디렉토리 내 캡처 파일 탐색

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::DatasetError;

/// 경로의 확장자가 목록 중 하나와 일치하는지 확인합니다 (대소문자 무시).
///
/// 확장자 목록의 앞쪽 `.`은 무시합니다 (`"pcap"`과 `".pcap"`은 같음).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.'))
        .any(|e| !e.is_empty() && e.eq_ignore_ascii_case(ext))
}

/// 디렉토리에서 확장자가 일치하는 캡처 파일을 찾습니다.
///
/// 하위 디렉토리는 탐색하지 않습니다. 결과는 경로순으로 정렬됩니다.
pub async fn discover_captures(
    dir: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, DatasetError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut captures = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        let file_type = match entry.file_type().await {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read file type, skipping");
                continue;
            }
        };
        if file_type.is_dir() || !has_extension(&path, extensions) {
            continue;
        }

        captures.push(path);
    }

    captures.sort();
    debug!(dir = %dir.display(), count = captures.len(), "captures discovered");
    Ok(captures)
}
