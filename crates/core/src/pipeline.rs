//! 필드 추출기 trait (캡처 파일 → 디코딩된 필드 텍스트)

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::error::PfcpmeterError;

/// `dyn` 호환 trait에서 사용하는 boxed future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 캡처 파일에서 디코딩된 필드 행을 추출하는 trait
///
/// 결과는 헤더 한 줄과 `(상대 시각, 출발지, 목적지, 메시지 유형 코드, 프레임 길이)`
/// 다섯 필드로 구성된 구분자 텍스트입니다. 외부 디코더(tshark 등)나
/// 이미 디코딩된 파일을 지원하려면 이 trait을 구현합니다.
pub trait FieldExtractor: Send + Sync {
    /// 추출기 이름
    fn name(&self) -> &str;

    /// 캡처 파일을 읽어 디코딩된 행 텍스트를 반환
    fn extract<'a>(&'a self, capture: &'a Path) -> BoxFuture<'a, Result<Vec<u8>, PfcpmeterError>>;
}
