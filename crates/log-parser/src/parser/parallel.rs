//! Parallel 컬렉터 (`PSYoungGen` + `PSOldGen` / `ParOldGen`)

use heapscope_core::event::EventType;

use super::extract::generational_event;
use super::{EventPattern, classic};
use crate::grammar::{DURATION, GC_TIME_LIMIT, TRIGGER, occupancy, perm_block};

pub(super) fn patterns() -> Vec<EventPattern> {
    let young = occupancy("young");
    let old = occupancy("old");
    let combined = occupancy("combined");
    let perm = perm_block();

    let full_gc = |old_gen: &str| {
        classic(&format!(
            r"\[Full GC{TRIGGER} ?\[PSYoungGen: {young}\] \[{old_gen}: {old}\] {combined}{perm}{GC_TIME_LIMIT}, (?P<dur>{DURATION}) secs\]"
        ))
    };

    vec![
        // `GC--`: young 수집 중 승격 실패
        EventPattern::new(
            EventType::ParallelScavenge,
            &classic(&format!(
                r"\[GC(?:--)?{TRIGGER}(?:--)? ?\[PSYoungGen: {young}\] {combined}, (?P<dur>{DURATION}) secs\]"
            )),
            generational_event,
        ),
        EventPattern::new(
            EventType::ParallelSerialOld,
            &full_gc("PSOldGen"),
            generational_event,
        ),
        EventPattern::new(
            EventType::ParallelCompactingOld,
            &full_gc("ParOldGen"),
            generational_event,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use crate::parser::EventRegistry;
    use heapscope_core::event::{CollectorFamily, EventType, GcEvent};
    use heapscope_core::pipeline::EventParser;
    use heapscope_core::units::Memory;

    fn parse(line: &str) -> GcEvent {
        EventRegistry::global().parse_line(line)
    }

    #[test]
    fn scavenge() {
        let event = parse(
            "0.287: [GC [PSYoungGen: 8704K->1088K(10176K)] 8704K->1640K(33216K), 0.0043650 secs] [Times: user=0.01 sys=0.00, real=0.00 secs]",
        );
        assert_eq!(event.event_type, EventType::ParallelScavenge);
        assert_eq!(event.event_type.collector(), Some(CollectorFamily::Parallel));
        assert_eq!(event.timestamp, 287);
        assert_eq!(event.duration, 4);
        assert_eq!(event.young().unwrap().end, Memory::kilobytes(1088));
        assert_eq!(event.old().unwrap().end, Memory::kilobytes(1640 - 1088));
    }

    #[test]
    fn scavenge_with_promotion_failure_marker() {
        let event = parse(
            "1.500: [GC-- [PSYoungGen: 10176K->10176K(10176K)] 33000K->33100K(33216K), 0.0200000 secs]",
        );
        assert_eq!(event.event_type, EventType::ParallelScavenge);
        let event = parse(
            "1.600: [GC (Allocation Failure) [PSYoungGen: 8704K->1088K(10176K)] 8704K->1640K(33216K), 0.0043650 secs]",
        );
        assert_eq!(event.event_type, EventType::ParallelScavenge);
        assert_eq!(event.trigger.as_deref(), Some("Allocation Failure"));
    }

    #[test]
    fn serial_old_with_perm_gen() {
        let event = parse(
            "2.000: [Full GC [PSYoungGen: 1088K->0K(10176K)] [PSOldGen: 20000K->15000K(23040K)] 21088K->15000K(33216K) [PSPermGen: 13092K->13094K(131072K)], 0.0500000 secs]",
        );
        assert_eq!(event.event_type, EventType::ParallelSerialOld);
        assert_eq!(event.duration, 50);
        assert_eq!(event.old().unwrap().init, Memory::kilobytes(20000));
        assert_eq!(event.perm().unwrap().end, Memory::kilobytes(13094));
    }

    #[test]
    fn compacting_old_jdk8() {
        let event = parse(
            "3.000: [Full GC (Ergonomics) [PSYoungGen: 1088K->0K(10176K)] [ParOldGen: 20000K->15000K(23040K)] 21088K->15000K(33216K), [Metaspace: 2635K->2635K(1056768K)], 0.0800000 secs]",
        );
        assert_eq!(event.event_type, EventType::ParallelCompactingOld);
        assert_eq!(event.trigger.as_deref(), Some("Ergonomics"));
        assert_eq!(event.duration, 80);
    }

    #[test]
    fn gc_time_limit_warning_is_tolerated() {
        let event = parse(
            "4.000: [Full GC [PSYoungGen: 10176K->10000K(10176K)] [ParOldGen: 23040K->23000K(23040K)] 33216K->33000K(33216K) [PSPermGen: 13092K->13094K(131072K)]      GC time would exceed GCTimeLimit of 98%, 0.5000000 secs]",
        );
        assert_eq!(event.event_type, EventType::ParallelCompactingOld);
        assert_eq!(event.duration, 500);
        assert!(event.log_entry.contains("GCTimeLimit"));
    }
}
