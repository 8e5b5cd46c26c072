//! 정규식 조각 -- GC 로그 문법의 공통 토큰
//!
//! 모든 조각은 캡처 그룹이 없는 정규식 텍스트입니다.
//! 이름 있는 그룹은 조각을 조립하는 쪽에서 붙입니다.
//! (예: `format!(r"^(?P<ts>{TIMESTAMP}): \[GC")`)

/// JVM 시작 이후 초 (`14.236`, 일부 로케일에서는 `14,236`)
pub const TIMESTAMP: &str = r"\d{1,10}[.,]\d{3}";

/// 벽시계 datestamp (`2010-02-26T09:32:12.486-0600`)
pub const DATESTAMP: &str = r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[.,]\d{3}(?:[-+]\d{4}|Z)?";

/// 초 단위 소수 시간 (`0.0225213`)
pub const DURATION: &str = r"\d{1,7}[.,]\d{1,9}";

/// unified 로그의 밀리초 시간 (`3.254`, 뒤에 `ms`가 붙음)
pub const UNIFIED_MILLIS: &str = r"\d{1,9}[.,]\d{3}";

/// 단위가 붙은 메모리 크기 (`17472K`, `22.6M`, `16817 K`)
pub const SIZE: &str = r"\d{1,12}(?:[.,]\d{1,3})? ?[BKMG]";

/// 괄호로 감싼 GC 원인 (선택). `trigger` 그룹을 정의합니다.
pub const TRIGGER: &str =
    r"(?: \((?P<trigger>System\.gc\(\)|[A-Za-z][A-Za-z0-9 ._-]*)\))?";

/// unified 로그의 GC 원인 텍스트 (그룹 없음)
pub const UNIFIED_TRIGGER: &str = r"(?:System\.gc\(\)|[A-Za-z][A-Za-z0-9 ._-]*)";

/// `[Times: user=0.02 sys=0.00, real=0.02 secs]` 블록 (선택)
pub const TIMES_BLOCK: &str = r"(?: ?\[Times: user=\d{1,7}[.,]\d{1,9} sys=\d{1,7}[.,]\d{1,9}, real=\d{1,7}[.,]\d{1,9} secs\])?";

/// Parallel 수집기의 GC 시간 한도 경고 (선택)
pub const GC_TIME_LIMIT: &str =
    r"(?:\s+GC time (?:would exceed|is exceeding) GCTimeLimit of \d{1,3}%)?";

/// perm/metaspace 영역 이름
pub const PERM_SPACE: &str = r"(?:Perm ?|CMS Perm |PSPermGen|Metaspace)";

/// unified 로그 uptime 데코레이터. `uptime` 또는 `uptime_ms` 그룹을 정의합니다.
pub const UNIFIED_UPTIME: &str =
    r"\[(?:(?P<uptime>\d{1,10}[.,]\d{3})s|(?P<uptime_ms>\d{1,13})ms)\]";

/// unified 로그 레벨 데코레이터 (선택)
pub const UNIFIED_LEVEL: &str = r"(?:\[(?:trace|debug|info|warning|error)\s*\])?";

/// 점유율 `before->after(capacity)`를 `{name}_init`, `{name}_end`, `{name}_cap` 그룹으로 감쌉니다.
pub fn occupancy(name: &str) -> String {
    format!(r"(?P<{name}_init>{SIZE})->(?P<{name}_end>{SIZE})\((?P<{name}_cap>{SIZE})\)")
}

/// 선택적인 perm/metaspace 블록 (`, [Metaspace: ...]` 또는 ` [PSPermGen: ...]`)
pub fn perm_block() -> String {
    let perm = occupancy("perm");
    format!(r"(?:,? \[{PERM_SPACE}: {perm}\])?")
}

/// unified `[gc]` 태그 줄의 접두사 (`[0.052s][info][gc] GC(0) `)
pub fn unified_gc_prefix() -> String {
    format!(r"^{UNIFIED_UPTIME}{UNIFIED_LEVEL}\[gc\s*\] GC\(\d+\) ")
}

/// unified 줄의 접두사 (태그 지정)
pub fn unified_prefix(tags: &str) -> String {
    format!(r"^{UNIFIED_UPTIME}{UNIFIED_LEVEL}\[{tags}\s*\] ")
}
