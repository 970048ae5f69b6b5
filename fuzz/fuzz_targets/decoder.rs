#![no_main]

use libfuzzer_sys::fuzz_target;
use pfcpmeter_dataset::RecordDecoder;

fuzz_target!(|data: &[u8]| {
    let decoder = RecordDecoder::new();

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(outcome) = decoder.decode_bytes(data) {
        // 디코딩된 레코드 시각은 항상 유한한 0 이상 값
        for record in &outcome.records {
            assert!(record.relative_time.is_finite());
            assert!(record.relative_time >= 0.0);
        }
    }
});
