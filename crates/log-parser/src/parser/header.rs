//! 로그 헤더 -- JVM 버전, 물리 메모리, 명령줄 옵션, 사용 중인 컬렉터
//!
//! 헤더 이벤트는 타임라인에 속하지 않으므로 타임스탬프는 항상 0입니다.

use heapscope_core::error::ParseError;
use heapscope_core::event::{CollectorFamily, EventData, EventType, GcEvent};
use heapscope_core::units::Memory;
use regex::Captures;

use super::extract::{group, integer};
use super::{EventPattern, unified, unified_gc};
use crate::grammar::SIZE;

pub(super) fn patterns() -> Vec<EventPattern> {
    vec![
        EventPattern::new(
            EventType::HeaderVersion,
            r"^(?:OpenJDK|Java HotSpot\(TM\)) (?:64-Bit )?(?:Server|Client) VM \([^)]+\) for \S+ JRE \((?P<version>[^)]+)\).*$",
            version,
        ),
        EventPattern::new(
            EventType::HeaderVersion,
            &unified(r"gc,init", r"Version: (?P<version>.+?)"),
            version,
        ),
        EventPattern::new(
            EventType::HeaderMemory,
            r"^Memory: \d+k page, physical (?P<phys_kb>\d+)k\(\d+k free\).*$",
            physical_memory,
        ),
        EventPattern::new(
            EventType::HeaderMemory,
            &unified(r"gc,init", &format!(r"Memory: (?P<phys>{SIZE})")),
            physical_memory,
        ),
        EventPattern::new(
            EventType::HeaderCommandLineFlags,
            r"^CommandLine flags: (?P<flags>.*?)\s*$",
            command_line_flags,
        ),
        EventPattern::new(
            EventType::UsingCollector,
            &unified(r"gc", r"Using (?P<collector>[A-Za-z][A-Za-z ]*?)"),
            using_collector,
        ),
        // 일부 JDK는 GC(n) 번호를 붙여 출력
        EventPattern::new(
            EventType::UsingCollector,
            &unified_gc(r"Using (?P<collector>[A-Za-z][A-Za-z ]*?)"),
            using_collector,
        ),
    ]
}

fn version(event_type: EventType, caps: &Captures<'_>, line: &str) -> Result<GcEvent, ParseError> {
    let version = group(caps, "version")?.trim().to_owned();
    Ok(GcEvent::new(event_type, 0, line).with_data(EventData::Version(version)))
}

fn physical_memory(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    let memory = if caps.name("phys_kb").is_some() {
        let kilobytes = integer(caps, "phys_kb")?;
        let kilobytes = i64::try_from(kilobytes)
            .map_err(|e| ParseError::number(&kilobytes.to_string(), e.to_string()))?;
        Memory::kilobytes(kilobytes)
    } else {
        Memory::parse(group(caps, "phys")?)?
    };
    Ok(GcEvent::new(event_type, 0, line).with_data(EventData::PhysicalMemory(memory)))
}

fn command_line_flags(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    let flags = group(caps, "flags")?.to_owned();
    Ok(GcEvent::new(event_type, 0, line).with_data(EventData::JvmOptions(flags)))
}

/// 알 수 없는 컬렉터 이름 (`Epsilon` 등)은 데이터 없이 헤더로만 남습니다.
fn using_collector(
    event_type: EventType,
    caps: &Captures<'_>,
    line: &str,
) -> Result<GcEvent, ParseError> {
    let event = GcEvent::new(event_type, 0, line);
    Ok(match CollectorFamily::from_using(group(caps, "collector")?) {
        Some(family) => event.with_data(EventData::Collector(family)),
        None => event,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::EventRegistry;
    use heapscope_core::pipeline::EventParser;

    fn parse(line: &str) -> GcEvent {
        EventRegistry::global().parse_line(line)
    }

    #[test]
    fn hotspot_version_header() {
        let event = parse(
            "Java HotSpot(TM) 64-Bit Server VM (25.144-b01) for linux-amd64 JRE (1.8.0_144-b01), built on Jul 21 2017 21:57:33 by \"java_re\" with gcc 4.3.0 20080428 (Red Hat 4.3.0-8)",
        );
        assert_eq!(event.event_type, EventType::HeaderVersion);
        assert_eq!(event.timestamp, 0);
        assert_eq!(event.data, EventData::Version("1.8.0_144-b01".to_owned()));
    }

    #[test]
    fn unified_version_header() {
        let event = parse("[0.004s][info][gc,init] Version: 17.0.1+12-39 (release)");
        assert_eq!(event.event_type, EventType::HeaderVersion);
        assert_eq!(
            event.data,
            EventData::Version("17.0.1+12-39 (release)".to_owned())
        );
    }

    #[test]
    fn physical_memory_header() {
        let event = parse("Memory: 4k page, physical 16058700k(1581200k free), swap 0k(0k free)");
        assert_eq!(event.event_type, EventType::HeaderMemory);
        assert_eq!(
            event.data,
            EventData::PhysicalMemory(Memory::kilobytes(16_058_700))
        );

        let event = parse("[0.004s][info][gc,init] Memory: 16G");
        assert_eq!(event.data, EventData::PhysicalMemory(Memory::gigabytes(16)));
    }

    #[test]
    fn command_line_flags_header() {
        let event = parse(
            "CommandLine flags: -XX:InitialHeapSize=1073741824 -XX:MaxHeapSize=1073741824 -XX:+PrintGC ",
        );
        assert_eq!(event.event_type, EventType::HeaderCommandLineFlags);
        assert_eq!(
            event.data,
            EventData::JvmOptions(
                "-XX:InitialHeapSize=1073741824 -XX:MaxHeapSize=1073741824 -XX:+PrintGC".to_owned()
            )
        );
    }

    #[test]
    fn using_collector_header() {
        let event = parse("[0.052s][info][gc] Using G1");
        assert_eq!(event.event_type, EventType::UsingCollector);
        assert_eq!(event.timestamp, 0);
        assert_eq!(event.data, EventData::Collector(CollectorFamily::G1));

        let event = parse("[0.010s][info][gc] Using Concurrent Mark Sweep");
        assert_eq!(event.data, EventData::Collector(CollectorFamily::Cms));
    }

    #[test]
    fn unknown_collector_name_has_no_family() {
        let event = parse("[0.010s][info][gc] Using Epsilon");
        assert_eq!(event.event_type, EventType::UsingCollector);
        assert_eq!(event.data, EventData::None);
    }
}
