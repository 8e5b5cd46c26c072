#![no_main]

use heapscope_core::pipeline::EventParser;
use heapscope_log_parser::EventRegistry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let registry = EventRegistry::global();
    for line in String::from_utf8_lossy(data).lines() {
        // 모든 줄은 정확히 하나의 이벤트가 된다 (인식 불가면 UNKNOWN)
        let event = registry.parse_line(line);
        assert_eq!(event.log_entry, line);
    }
});
