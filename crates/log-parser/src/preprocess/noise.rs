//! 노이즈 줄 판별
//!
//! 어떤 이벤트에도 속하지 않는 줄을 고정된 조건으로 버립니다.

use std::sync::OnceLock;

use regex::Regex;

/// 안전점 통계 꼬리말의 VM 연산별 횟수 줄 (`ForceSafepoint    1`)
fn vm_operation_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_]+\s+\d+\s*$").expect("valid vm operation count regex"))
}

/// 버려야 하는 줄인지 판별합니다.
pub fn is_noise(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "Heap" {
        return true;
    }

    // JVM 경고
    if trimmed.starts_with("OpenJDK 64-Bit Server VM warning:")
        || trimmed.starts_with("OpenJDK Server VM warning:")
        || (trimmed.starts_with("Java HotSpot(TM)") && trimmed.contains("warning:"))
    {
        return true;
    }

    // GC 로그 회전
    if trimmed.contains("GC log file has reached the maximum size")
        || trimmed.contains("GC log file created")
    {
        return true;
    }

    // JDK8 안전점 통계 머리말/꼬리말
    if trimmed.contains("vmop") && trimmed.contains("[threads: total") {
        return true;
    }
    if trimmed.starts_with("Polling page always armed")
        || trimmed.contains("VM operations coalesced during safepoint")
        || trimmed.starts_with("Maximum sync time")
        || trimmed.starts_with("Maximum vm operation time")
        || vm_operation_count_re().is_match(trimmed)
    {
        return true;
    }

    // unified 안전점 진입/이탈
    trimmed.contains("Entering safepoint region:") || trimmed.contains("Leaving safepoint region")
}
