//! 분석 경고 키
//!
//! 옵션 체크리스트 ([`crate::options`])와 이벤트 데이터 점검 결과를
//! 리포트에서 쓰는 고정 키로 표현합니다.

use std::collections::BTreeSet;
use std::fmt;

use heapscope_core::event::{CollectorFamily, EventType};
use serde::{Serialize, Serializer};

use crate::options::{JvmOptions, check_options};
use crate::store::RunStore;

/// 분석 경고
///
/// 선언 순서가 리포트 출력 순서입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisKey {
    HeapMinNotEqualMax,
    PermMinNotEqualMax,
    ThreadStackSizeNotSet,
    ThreadStackSizeLarge,
    /// 첫 이벤트가 너무 늦음 (앞부분이 잘린 로그)
    PartialLog,
    ExplicitGc,
    CmsConcurrentModeFailure,
    PromotionFailed,
    GcTimeLimitExceeded,
    SerialCollector,
}

impl AnalysisKey {
    pub const fn key(self) -> &'static str {
        match self {
            Self::HeapMinNotEqualMax => "warn.heap.min.not.equal.max",
            Self::PermMinNotEqualMax => "warn.perm.min.not.equal.max",
            Self::ThreadStackSizeNotSet => "warn.thread.stack.size.not.set",
            Self::ThreadStackSizeLarge => "warn.thread.stack.size.large",
            Self::PartialLog => "info.first.timestamp.threshold.exceeded",
            Self::ExplicitGc => "warn.explicit.gc",
            Self::CmsConcurrentModeFailure => "error.cms.concurrent.mode.failure",
            Self::PromotionFailed => "error.promotion.failed",
            Self::GcTimeLimitExceeded => "error.gc.time.limit.exceeded",
            Self::SerialCollector => "warn.serial.collector",
        }
    }
}

impl fmt::Display for AnalysisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for AnalysisKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

const CONCURRENT_MODE_FAILURES: [EventType; 3] = [
    EventType::ParNewPromotionFailedCmsConcurrentModeFailure,
    EventType::ParNewConcurrentModeFailure,
    EventType::CmsSerialOldConcurrentModeFailure,
];

const PROMOTION_FAILURES: [EventType; 2] = [
    EventType::ParNewPromotionFailedCmsConcurrentModeFailure,
    EventType::ParNewPromotionFailed,
];

/// 첫 타임스탬프(ms)가 기준(초)을 넘으면 부분 로그로 봅니다.
pub fn is_partial_log(first_timestamp: Option<u64>, threshold_secs: u64) -> bool {
    first_timestamp.is_some_and(|first| first > threshold_secs.saturating_mul(1000))
}

/// 이벤트 데이터 점검
pub fn check_events(store: &RunStore, threshold_secs: u64) -> Vec<AnalysisKey> {
    let event_types = store.event_types();
    let seen_any = |types: &[EventType]| types.iter().any(|t| event_types.contains(t));

    let mut keys = Vec::new();
    if is_partial_log(store.first_timestamp(), threshold_secs) {
        keys.push(AnalysisKey::PartialLog);
    }
    if store.explicit_gc_count() > 0 {
        keys.push(AnalysisKey::ExplicitGc);
    }
    if seen_any(&CONCURRENT_MODE_FAILURES) {
        keys.push(AnalysisKey::CmsConcurrentModeFailure);
    }
    if seen_any(&PROMOTION_FAILURES) {
        keys.push(AnalysisKey::PromotionFailed);
    }
    if store.gc_time_limit_exceeded() {
        keys.push(AnalysisKey::GcTimeLimitExceeded);
    }
    if store.collectors().contains(&CollectorFamily::Serial) {
        keys.push(AnalysisKey::SerialCollector);
    }
    keys
}

/// 옵션 점검과 이벤트 점검을 합쳐 출력 순서로 정렬합니다.
pub fn analyze(store: &RunStore, options: &JvmOptions, threshold_secs: u64) -> Vec<AnalysisKey> {
    let keys: BTreeSet<AnalysisKey> = check_options(options)
        .into_iter()
        .chain(check_events(store, threshold_secs))
        .collect();
    keys.into_iter().collect()
}
