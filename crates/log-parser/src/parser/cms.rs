//! CMS 컬렉터 (`ParNew` young + `CMS` old)
//!
//! 실패 변형 (promotion failed, concurrent mode failure)이 일반 형태보다 앞에 옵니다.

use heapscope_core::event::EventType;

use super::extract::{generational_event, timed_event};
use super::{EventPattern, classic};
use crate::grammar::{DURATION, SIZE, TIMES_BLOCK, TIMESTAMP, TRIGGER, occupancy, perm_block};

const CMS_PHASES: &str = r"(?:mark|preclean|abortable-preclean|sweep|reset)";

pub(super) fn patterns() -> Vec<EventPattern> {
    let young = occupancy("young");
    let old = occupancy("old");
    let combined = occupancy("combined");
    let perm = perm_block();

    let gc = format!(r"\[GC{TRIGGER} ?(?:{TIMESTAMP}: )?");
    let young_block = |name: &str| format!(r"\[{name}: {young}, {DURATION} secs\] ?(?:{TIMESTAMP}: )?");
    let old_block = |name: &str| format!(r"\[{name}: {old}, {DURATION} secs\]");
    let tail = format!(r" {combined}{perm}, (?P<dur>{DURATION}) secs\]");

    let par_new = young_block("ParNew");
    let promotion_failed = young_block(r"ParNew \(promotion failed\)");
    let cms = old_block("CMS");
    let concurrent_mode_failure = old_block(r"CMS \(concurrent mode failure\)");

    vec![
        EventPattern::new(
            EventType::ParNewPromotionFailedCmsConcurrentModeFailure,
            &classic(&format!("{gc}{promotion_failed}{concurrent_mode_failure}{tail}")),
            generational_event,
        ),
        EventPattern::new(
            EventType::ParNewConcurrentModeFailure,
            &classic(&format!("{gc}{par_new}{concurrent_mode_failure}{tail}")),
            generational_event,
        ),
        EventPattern::new(
            EventType::ParNewPromotionFailed,
            &classic(&format!("{gc}{promotion_failed}{cms}{tail}")),
            generational_event,
        ),
        EventPattern::new(
            EventType::ParNew,
            &classic(&format!(
                r"{gc}\[ParNew: {young}, {DURATION} secs\] {combined}, (?P<dur>{DURATION}) secs\]"
            )),
            generational_event,
        ),
        EventPattern::new(
            EventType::CmsSerialOldConcurrentModeFailure,
            &classic(&format!(
                r"\[(?:Full GC|GC){TRIGGER} ?(?:{TIMESTAMP}: )?{concurrent_mode_failure}{tail}"
            )),
            generational_event,
        ),
        EventPattern::new(
            EventType::CmsSerialOld,
            &classic(&format!(r"\[Full GC{TRIGGER} ?(?:{TIMESTAMP}: )?{cms}{tail}")),
            generational_event,
        ),
        EventPattern::new(
            EventType::CmsInitialMark,
            &classic(&format!(
                r"\[GC{TRIGGER} ?\[1 CMS-initial-mark: {SIZE}\({SIZE}\)\] {SIZE}\({SIZE}\), (?P<dur>{DURATION}) secs\]"
            )),
            timed_event,
        ),
        EventPattern::new(
            EventType::CmsRemark,
            &classic(&format!(
                r"\[GC{TRIGGER} ?\[YG occupancy: {SIZE} \({SIZE}\)\].*\[1 CMS-remark: {SIZE}\({SIZE}\)\] {SIZE}\({SIZE}\), (?P<dur>{DURATION}) secs\]"
            )),
            timed_event,
        ),
        // 동시 단계의 시간은 애플리케이션과 겹치므로 기록하지 않습니다.
        EventPattern::new(
            EventType::CmsConcurrent,
            &classic(&format!(
                r"\[CMS-concurrent-{CMS_PHASES}(?:-start\]|: {DURATION}/{DURATION} secs\])"
            )),
            timed_event,
        ),
        EventPattern::new(
            EventType::CmsConcurrent,
            &format!(
                r"^ ?CMS: abort preclean due to time (?P<ts>{TIMESTAMP}): \[CMS-concurrent-abortable-preclean: {DURATION}/{DURATION} secs\]{TIMES_BLOCK}\s*$"
            ),
            timed_event,
        ),
    ]
}
