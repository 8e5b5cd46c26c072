#![no_main]

use chrono::NaiveDate;
use heapscope_log_parser::{Preprocessor, split_lines};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let lines = split_lines(&String::from_utf8_lossy(data));

    // 시작 시각이 없으면 datestamp 줄에서 Err이 나올 수 있음 (패닉은 안 됨)
    let _ = Preprocessor::new(None).process(&lines);

    let jvm_start =
        NaiveDate::from_ymd_opt(2010, 2, 26).and_then(|d| d.and_hms_milli_opt(9, 32, 11, 486));
    let _ = Preprocessor::new(jvm_start).process(&lines);
});
