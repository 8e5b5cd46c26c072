//! 전처리 액션 테이블
//!
//! 각 액션은 (이전 줄, 현재 줄, 다음 줄, 열린 줄 여부) 창을 보고 현재 줄을
//! 처리할지 결정합니다. [`ACTIONS`] 순서대로 평가하며 처음 처리한 액션이
//! 이깁니다. 모양이 겹치는 줄이 있으므로 이 순서는 바꿀 수 없습니다.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::grammar::{DURATION, TIMESTAMP, UNIFIED_LEVEL, UNIFIED_UPTIME};

/// 현재 줄을 둘러싼 창
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub prior: Option<&'a str>,
    pub current: &'a str,
    pub next: Option<&'a str>,
    /// 열린 논리 줄이 있는지 여부
    pub open: bool,
}

impl Window<'_> {
    fn next_starts_with(&self, prefix: &str) -> bool {
        self.next.is_some_and(|next| next.starts_with(prefix))
    }

    fn prior_matches(&self, re: &Regex) -> bool {
        self.prior.is_some_and(|prior| re.is_match(prior))
    }
}

/// 액션이 현재 줄을 처리한 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 줄을 버림
    Discard,
    /// 열린 줄에 덧붙임 (없으면 새로 열림)
    Append(String),
    /// 덧붙이고 열린 줄을 닫음
    Terminate(String),
    /// 열린 줄에 덧붙이고, 끼어든 완성된 줄은 열린 줄이 닫힐 때까지 미룸
    AppendDeferring { open: String, deferred: String },
    /// 완성된 줄을 내보낸 뒤 새 줄을 엶
    CompleteThenAppend { complete: String, open: String },
    /// 완성된 줄들을 내보냄
    Complete(Vec<String>),
}

/// 전처리 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreprocessAction {
    UnloadingClass,
    CmsConcurrentModeFailure,
    GcTimeLimitExceeded,
    HeapAtGc,
    TenuringDistribution,
    ParNewConcurrent,
    ApplicationConcurrentTime,
    ApplicationStoppedTime,
    G1Detail,
    UnifiedDetail,
}

/// 평가 순서 (처음 처리한 액션이 이김)
pub const ACTIONS: [PreprocessAction; 10] = [
    PreprocessAction::UnloadingClass,
    PreprocessAction::CmsConcurrentModeFailure,
    PreprocessAction::GcTimeLimitExceeded,
    PreprocessAction::HeapAtGc,
    PreprocessAction::TenuringDistribution,
    PreprocessAction::ParNewConcurrent,
    PreprocessAction::ApplicationConcurrentTime,
    PreprocessAction::ApplicationStoppedTime,
    PreprocessAction::G1Detail,
    PreprocessAction::UnifiedDetail,
];

impl PreprocessAction {
    /// 메트릭 레이블용 이름
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnloadingClass => "unloading_class",
            Self::CmsConcurrentModeFailure => "cms_concurrent_mode_failure",
            Self::GcTimeLimitExceeded => "gc_time_limit_exceeded",
            Self::HeapAtGc => "heap_at_gc",
            Self::TenuringDistribution => "tenuring_distribution",
            Self::ParNewConcurrent => "par_new_concurrent",
            Self::ApplicationConcurrentTime => "application_concurrent_time",
            Self::ApplicationStoppedTime => "application_stopped_time",
            Self::G1Detail => "g1_detail",
            Self::UnifiedDetail => "unified_detail",
        }
    }

    /// 현재 줄을 처리합니다. 처리하지 않으면 `None`.
    pub fn apply(self, window: &Window<'_>) -> Option<Outcome> {
        match self {
            Self::UnloadingClass => unloading_class(window),
            Self::CmsConcurrentModeFailure => cms_concurrent_mode_failure(window),
            Self::GcTimeLimitExceeded => gc_time_limit_exceeded(window),
            Self::HeapAtGc => heap_at_gc(window),
            Self::TenuringDistribution => tenuring_distribution(window),
            Self::ParNewConcurrent => par_new_concurrent(window),
            Self::ApplicationConcurrentTime => application_concurrent_time(window),
            Self::ApplicationStoppedTime => application_stopped_time(window),
            Self::G1Detail => g1_detail(window),
            Self::UnifiedDetail => unified_detail(window),
        }
    }
}

impl fmt::Display for PreprocessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 테이블 순서대로 평가해 처음 처리한 액션과 결과를 돌려줍니다.
pub fn first_match(window: &Window<'_>) -> Option<(PreprocessAction, Outcome)> {
    ACTIONS
        .into_iter()
        .find_map(|action| action.apply(window).map(|outcome| (action, outcome)))
}

// --- 공통 ---

/// 앞 줄의 나머지 (`: 1K->...`, ` (concurrent mode failure): ...`)
fn is_continuation(line: &str) -> bool {
    line.starts_with(": ") || line.starts_with(" (concurrent mode failure)")
}

/// 연속 줄을 덧붙입니다. 닫는 괄호로 끝나지 않으면 아직 열린 상태입니다.
fn continue_with(line: &str) -> Outcome {
    if line.trim_end().ends_with(']') {
        Outcome::Terminate(line.to_owned())
    } else {
        Outcome::Append(line.to_owned())
    }
}

// --- 1. UnloadingClass ---

fn unloading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[Unloading class [^\]]+\]").expect("valid unloading class regex")
    })
}

fn unloading_class(w: &Window<'_>) -> Option<Outcome> {
    if !w.current.contains("[Unloading class ") {
        return None;
    }
    let stripped = unloading_re().replace_all(w.current, "").into_owned();

    if stripped.trim().is_empty() {
        return Some(Outcome::Discard);
    }
    let next_continues = w
        .next
        .is_some_and(|next| is_continuation(next) || next.starts_with("[Unloading class "));
    if next_continues {
        return Some(Outcome::Append(stripped));
    }
    if w.open {
        return Some(Outcome::Terminate(stripped));
    }
    Some(Outcome::Complete(vec![stripped]))
}

// --- 2. CmsConcurrentModeFailure ---

fn cms_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<prefix>.*\[CMS)(?P<embedded>{TIMESTAMP}: \[CMS-concurrent-[^\]]*\](?: \[Times: [^\]]*\])?)?\s*$"
        ))
        .expect("valid cms prefix regex")
    })
}

fn cms_concurrent_mode_failure(w: &Window<'_>) -> Option<Outcome> {
    if w.open && is_continuation(w.current) {
        return Some(continue_with(w.current));
    }

    let next_continues = w.next.is_some_and(is_continuation);
    if !next_continues {
        return None;
    }
    let caps = cms_prefix_re().captures(w.current)?;
    let prefix = caps.name("prefix")?.as_str().to_owned();
    match caps.name("embedded") {
        Some(embedded) => Some(Outcome::AppendDeferring {
            open: prefix,
            deferred: embedded.as_str().to_owned(),
        }),
        None => Some(Outcome::Append(prefix)),
    }
}

// --- 3. GcTimeLimitExceeded ---

fn gc_time_limit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"GC time (?:would exceed|is exceeding) GCTimeLimit of \d{1,3}%\s*$")
            .expect("valid gc time limit regex")
    })
}

fn gc_time_limit_exceeded(w: &Window<'_>) -> Option<Outcome> {
    if w.open && w.current.starts_with(", ") && w.prior_matches(gc_time_limit_re()) {
        return Some(Outcome::Terminate(w.current.to_owned()));
    }
    if gc_time_limit_re().is_match(w.current) && w.next_starts_with(", ") {
        return Some(Outcome::Append(w.current.trim_end().to_owned()));
    }
    None
}

// --- 4. HeapAtGc ---

fn heap_region_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s+(?:par new generation|def new generation|tenured generation|concurrent mark-sweep generation|concurrent-mark-sweep perm gen|compacting perm gen|PSYoungGen|PSOldGen|ParOldGen|PSPermGen|garbage-first heap|Metaspace|class space|eden space|from space|to\s+space|object space|the space|region size|ro space|rw space|No shared spaces configured)",
        )
        .expect("valid heap region regex")
    })
}

fn heap_at_gc(w: &Window<'_>) -> Option<Outcome> {
    let trimmed = w.current.trim();
    let is_block_line = trimmed.starts_with("{Heap before GC")
        || trimmed.starts_with("{Heap before gc")
        || trimmed.starts_with("Heap after GC")
        || trimmed.starts_with("Heap after gc")
        || trimmed == "}"
        || heap_region_re().is_match(w.current);
    is_block_line.then_some(Outcome::Discard)
}

// --- 5. TenuringDistribution ---

fn tenuring_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?:\[(?:ParNew|DefNew)|^{TIMESTAMP}: \[GC(?: \((?:System\.gc\(\)|[^()]*)\))?)\s*$"
        ))
        .expect("valid tenuring prefix regex")
    })
}

fn tenuring_distribution(w: &Window<'_>) -> Option<Outcome> {
    if w.current.starts_with("Desired survivor size") || w.current.starts_with("- age") {
        return Some(Outcome::Discard);
    }
    if w.open && (w.current.starts_with(": ") || w.current.starts_with(" [PSYoungGen")) {
        return Some(continue_with(w.current));
    }
    let next_continues = w.next_starts_with("Desired survivor size")
        || w.next_starts_with(": ")
        || w.next_starts_with(" [PSYoungGen");
    if next_continues && tenuring_prefix_re().is_match(w.current) {
        return Some(Outcome::Append(w.current.trim_end().to_owned()));
    }
    None
}

// --- 6. ParNewConcurrent ---

fn par_new_concurrent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<prefix>.*\[ParNew)(?P<embedded>{TIMESTAMP}: \[CMS-concurrent-[^\]]*\](?: \[Times: [^\]]*\])?)\s*$"
        ))
        .expect("valid par new concurrent regex")
    })
}

fn par_new_concurrent(w: &Window<'_>) -> Option<Outcome> {
    if !(w.next_starts_with(": ") || w.next_starts_with("Desired survivor size")) {
        return None;
    }
    let caps = par_new_concurrent_re().captures(w.current)?;
    Some(Outcome::AppendDeferring {
        open: caps.name("prefix")?.as_str().to_owned(),
        deferred: caps.name("embedded")?.as_str().to_owned(),
    })
}

// --- 7. ApplicationConcurrentTime ---

fn entangled_application_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<lead>{TIMESTAMP}: )?(?P<gcts>{TIMESTAMP})(?P<message>Application time: {DURATION} seconds)\s*$"
        ))
        .expect("valid application time regex")
    })
}

fn application_concurrent_time(w: &Window<'_>) -> Option<Outcome> {
    if !w.next_starts_with(": [") {
        return None;
    }
    let caps = entangled_application_time_re().captures(w.current)?;
    let gc_timestamp = caps.name("gcts")?.as_str();
    let lead = caps
        .name("lead")
        .map_or_else(|| format!("{gc_timestamp}: "), |m| m.as_str().to_owned());
    Some(Outcome::CompleteThenAppend {
        complete: format!("{lead}{}", caps.name("message")?.as_str()),
        open: gc_timestamp.to_owned(),
    })
}

// --- 8. ApplicationStoppedTime ---

fn trailing_stopped_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<gc>{TIMESTAMP}: \[.*\])\s*(?P<stopped>{TIMESTAMP}: (?:Total time for which application threads were stopped|Application time): .*)$"
        ))
        .expect("valid trailing stopped time regex")
    })
}

fn stopped_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^{TIMESTAMP}: Total time for which application threads were stopped: {DURATION} seconds\s*$"
        ))
        .expect("valid stopped time regex")
    })
}

const STOPPING_THREADS: &str = ", Stopping threads took";

fn application_stopped_time(w: &Window<'_>) -> Option<Outcome> {
    if w.open && w.current.starts_with(STOPPING_THREADS) {
        return Some(Outcome::Terminate(w.current.to_owned()));
    }
    if let Some(caps) = trailing_stopped_time_re().captures(w.current) {
        return Some(Outcome::Complete(vec![
            caps.name("gc")?.as_str().to_owned(),
            caps.name("stopped")?.as_str().trim_end().to_owned(),
        ]));
    }
    if w.next_starts_with(STOPPING_THREADS) && stopped_time_re().is_match(w.current) {
        return Some(Outcome::Append(w.current.trim_end().to_owned()));
    }
    None
}

// --- 9. G1Detail ---

fn g1_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^{TIMESTAMP}: \[(?:(?:GC pause|GC remark|GC cleanup|Full GC).*secs\]|GC pause[^\]]*)\s*$"
        ))
        .expect("valid g1 header regex")
    })
}

fn g1_duration_tail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^, {DURATION} secs\]\s*$")).expect("valid g1 duration tail regex")
    })
}

fn is_detail_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    (line.len() > trimmed.len() && trimmed.starts_with('['))
        || line.starts_with("Desired survivor size")
}

fn g1_detail(w: &Window<'_>) -> Option<Outcome> {
    if !w.open && w.next.is_some_and(is_detail_line) && g1_header_re().is_match(w.current) {
        return Some(Outcome::Append(w.current.trim_end().to_owned()));
    }

    let trimmed = w.current.trim_start();
    if w.open && trimmed.starts_with("[Eden:") {
        return Some(Outcome::Append(trimmed.trim_end().to_owned()));
    }
    if w.open && g1_duration_tail_re().is_match(w.current) {
        return Some(Outcome::Append(w.current.trim_end().to_owned()));
    }
    if trimmed.starts_with("[Times: ") && w.current.len() > trimmed.len() {
        return Some(if w.open {
            Outcome::Terminate(format!(" {}", trimmed.trim_end()))
        } else {
            Outcome::Discard
        });
    }
    is_detail_line(w.current).then_some(Outcome::Discard)
}

// --- 10. UnifiedDetail ---

fn unified_tags_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^{UNIFIED_UPTIME}{UNIFIED_LEVEL}\[(?P<tags>[a-z0-9,]+)\s*\] ?(?P<message>.*)$"
        ))
        .expect("valid unified tags regex")
    })
}

fn unified_detail(w: &Window<'_>) -> Option<Outcome> {
    let caps = unified_tags_re().captures(w.current)?;
    let message = caps.name("message").map_or("", |m| m.as_str());
    let keep = match &caps["tags"] {
        "gc" | "safepoint" => true,
        "gc,init" => message.starts_with("Version:") || message.starts_with("Memory:"),
        _ => false,
    };
    (!keep).then_some(Outcome::Discard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window<'a>(current: &'a str, next: Option<&'a str>, open: bool) -> Window<'a> {
        Window {
            prior: None,
            current,
            next,
            open,
        }
    }

    #[test]
    fn action_names_are_unique() {
        let mut names: Vec<_> = ACTIONS.iter().map(|a| a.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ACTIONS.len());
    }

    #[test]
    fn unloading_class_strips_fragments() {
        let w = window(
            "1.2: [Full GC 1.2: [CMS[Unloading class sun.reflect.GeneratedMethodAccessor3]: 1K->1K(2K), 0.1 secs]",
            None,
            false,
        );
        assert_eq!(
            unloading_class(&w),
            Some(Outcome::Complete(vec![
                "1.2: [Full GC 1.2: [CMS: 1K->1K(2K), 0.1 secs]".to_owned()
            ]))
        );
    }

    #[test]
    fn unloading_class_only_line_is_discarded() {
        let w = window("[Unloading class sun.reflect.GeneratedMethodAccessor3]", None, true);
        assert_eq!(unloading_class(&w), Some(Outcome::Discard));
    }

    #[test]
    fn cms_prefix_defers_embedded_concurrent_message() {
        let w = window(
            "44.684: [GC 44.684: [ParNew: 38336K->4224K(38336K), 0.0541 secs]44.738: [CMS44.833: [CMS-concurrent-abortable-preclean: 0.153/0.448 secs] [Times: user=0.39 sys=0.01, real=0.45 secs]",
            Some(" (concurrent mode failure): 290190K->277017K(1006016K), 1.9284 secs]"),
            false,
        );
        let Some(Outcome::AppendDeferring { open, deferred }) = cms_concurrent_mode_failure(&w)
        else {
            panic!("expected AppendDeferring");
        };
        assert!(open.ends_with("44.738: [CMS"));
        assert_eq!(
            deferred,
            "44.833: [CMS-concurrent-abortable-preclean: 0.153/0.448 secs] [Times: user=0.39 sys=0.01, real=0.45 secs]"
        );
    }

    #[test]
    fn continuation_without_closing_bracket_stays_open() {
        let w = window(": [GC 12.345: [ParNew", None, true);
        assert_eq!(
            cms_concurrent_mode_failure(&w),
            Some(Outcome::Append(": [GC 12.345: [ParNew".to_owned()))
        );
    }

    #[test]
    fn gc_time_limit_needs_matching_prior_to_terminate() {
        let line = "3.0: [Full GC [PSYoungGen: 1K->0K(2K)] [ParOldGen: 3K->3K(4K)] 4K->3K(6K)      GC time would exceed GCTimeLimit of 98%";
        let opened = window(line, Some(", 0.5 secs]"), false);
        assert_eq!(
            gc_time_limit_exceeded(&opened),
            Some(Outcome::Append(line.to_owned()))
        );

        let closing = Window {
            prior: Some(line),
            current: ", 0.5 secs]",
            next: None,
            open: true,
        };
        assert_eq!(
            gc_time_limit_exceeded(&closing),
            Some(Outcome::Terminate(", 0.5 secs]".to_owned()))
        );

        let unrelated = window(", 0.5 secs]", None, true);
        assert_eq!(gc_time_limit_exceeded(&unrelated), None);
    }

    #[test]
    fn heap_at_gc_block_lines_are_discarded() {
        for line in [
            "{Heap before GC invocations=0 (full 0):",
            " par new generation   total 38336K, used 34112K [0x00000000, 0x00000000, 0x00000000)",
            "  eden space 34112K, 100% used [0x00000000, 0x00000000, 0x00000000)",
            "  to   space 4224K,   0% used [0x00000000, 0x00000000, 0x00000000)",
            " Metaspace       used 2635K, capacity 4486K, committed 4864K, reserved 1056768K",
            "Heap after GC invocations=1 (full 0):",
            "}",
        ] {
            assert_eq!(heap_at_gc(&window(line, None, false)), Some(Outcome::Discard), "{line}");
        }
        assert_eq!(heap_at_gc(&window("1.0: [GC", None, false)), None);
    }

    #[test]
    fn tenuring_keeps_par_new_prefix_open() {
        let w = window(
            "1.234: [GC 1.234: [ParNew",
            Some("Desired survivor size 2162688 bytes, new threshold 1 (max 15)"),
            false,
        );
        assert_eq!(
            tenuring_distribution(&w),
            Some(Outcome::Append("1.234: [GC 1.234: [ParNew".to_owned()))
        );
        let age = window("- age   1:    3455576 bytes,    3455576 total", None, true);
        assert_eq!(tenuring_distribution(&age), Some(Outcome::Discard));
    }

    #[test]
    fn par_new_concurrent_defers_message() {
        let w = window(
            "2.0: [GC 2.0: [ParNew2.010: [CMS-concurrent-abortable-preclean: 0.1/0.2 secs]",
            Some(": 1K->1K(2K), 0.1 secs] 3K->2K(4K), 0.1 secs]"),
            false,
        );
        assert_eq!(
            par_new_concurrent(&w),
            Some(Outcome::AppendDeferring {
                open: "2.0: [GC 2.0: [ParNew".to_owned(),
                deferred: "2.010: [CMS-concurrent-abortable-preclean: 0.1/0.2 secs]".to_owned(),
            })
        );
    }

    #[test]
    fn entangled_application_time_is_split() {
        let w = window(
            "12.345Application time: 0.1234 seconds",
            Some(": [GC 12.345: [ParNew: 1K->1K(2K), 0.1 secs]"),
            false,
        );
        assert_eq!(
            application_concurrent_time(&w),
            Some(Outcome::CompleteThenAppend {
                complete: "12.345: Application time: 0.1234 seconds".to_owned(),
                open: "12.345".to_owned(),
            })
        );
    }

    #[test]
    fn trailing_stopped_time_is_split() {
        let w = window(
            "1.000: [GC pause (young) 1K->1K(2K), 0.01 secs]1.010: Total time for which application threads were stopped: 0.0100 seconds",
            None,
            false,
        );
        assert_eq!(
            application_stopped_time(&w),
            Some(Outcome::Complete(vec![
                "1.000: [GC pause (young) 1K->1K(2K), 0.01 secs]".to_owned(),
                "1.010: Total time for which application threads were stopped: 0.0100 seconds"
                    .to_owned(),
            ]))
        );
    }

    #[test]
    fn stopping_threads_suffix_is_merged() {
        let w = window(
            "1.010: Total time for which application threads were stopped: 0.0100 seconds",
            Some(", Stopping threads took: 0.0000120 seconds"),
            false,
        );
        assert!(matches!(application_stopped_time(&w), Some(Outcome::Append(_))));
        let tail = window(", Stopping threads took: 0.0000120 seconds", None, true);
        assert!(matches!(application_stopped_time(&tail), Some(Outcome::Terminate(_))));
    }

    #[test]
    fn g1_detail_lines() {
        let header = window(
            "0.171: [GC pause (young), 0.0028 secs]",
            Some("   [Parallel Time: 2.5 ms, GC Workers: 4]"),
            false,
        );
        assert!(matches!(g1_detail(&header), Some(Outcome::Append(_))));

        let phase = window("      [GC Worker Start (ms): 171.0 171.1]", None, true);
        assert_eq!(g1_detail(&phase), Some(Outcome::Discard));

        let eden = window(
            "   [Eden: 1024.0K(1024.0K)->0.0B(1024.0K) Survivors: 0.0B->1024.0K Heap: 1024.0K(1024.0K)->400.0K(1024.0K)]",
            None,
            true,
        );
        assert_eq!(
            g1_detail(&eden),
            Some(Outcome::Append(
                "[Eden: 1024.0K(1024.0K)->0.0B(1024.0K) Survivors: 0.0B->1024.0K Heap: 1024.0K(1024.0K)->400.0K(1024.0K)]".to_owned()
            ))
        );

        let times = window(" [Times: user=0.01 sys=0.00, real=0.00 secs]", None, true);
        assert_eq!(
            g1_detail(&times),
            Some(Outcome::Terminate(
                " [Times: user=0.01 sys=0.00, real=0.00 secs]".to_owned()
            ))
        );

        let orphan = window(" [Times: user=0.01 sys=0.00, real=0.00 secs]", None, false);
        assert_eq!(g1_detail(&orphan), Some(Outcome::Discard));
    }

    #[test]
    fn unified_detail_keeps_gc_and_safepoint_tags() {
        let keep = [
            "[0.052s][info][gc] Using G1",
            "[0.100s][info][gc] GC(0) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.254ms",
            "[0.103s][info][safepoint] Total time for which application threads were stopped: 0.0031 seconds",
            "[0.010s][info][gc,init] Version: 17.0.2+8 (release)",
            "[0.010s][info][gc,init] Memory: 31907M",
        ];
        for line in keep {
            assert_eq!(unified_detail(&window(line, None, false)), None, "{line}");
        }
        let drop = [
            "[0.100s][info][gc,start    ] GC(0) Pause Young (Normal) (G1 Evacuation Pause)",
            "[0.100s][info][gc,heap     ] GC(0) Eden regions: 24->0(150)",
            "[0.010s][info][gc,init] Heap Region Size: 1M",
        ];
        for line in drop {
            assert_eq!(
                unified_detail(&window(line, None, false)),
                Some(Outcome::Discard),
                "{line}"
            );
        }
    }

    #[test]
    fn classic_lines_are_not_claimed() {
        let w = window(
            "1.234: [GC 1.234: [ParNew: 17472K->1968K(19648K), 0.0225213 secs] 17472K->1968K(63360K), 0.0226 secs]",
            Some("2.0: [GC"),
            false,
        );
        assert_eq!(first_match(&w), None);
    }
}
