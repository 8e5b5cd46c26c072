//! 이벤트 모델 -- GC 로그 한 줄에서 추출한 구조화된 이벤트
//!
//! 정규화된 로그 한 줄은 정확히 하나의 [`GcEvent`]가 됩니다.
//! [`EventType`]은 닫힌 분류 체계이며, 인식하지 못한 줄은
//! [`EventType::Unknown`]으로 표현됩니다 (실패가 아님).
//!
//! 이벤트가 가진 메모리/안전점/헤더 정보는 이벤트 종류마다 조합이 다르므로
//! 닫힌 합 타입 [`EventData`]로 표현합니다.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::units::Memory;

/// 이벤트 종류
///
/// 이름(`name()`)은 리포트와 메트릭 라벨에 쓰이는 안정적인 식별자입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // 로그 헤더
    HeaderVersion,
    HeaderMemory,
    HeaderCommandLineFlags,
    UsingCollector,

    // JDK 공통
    ApplicationConcurrentTime,
    ApplicationStoppedTime,
    Safepoint,
    UnifiedSafepoint,

    // Serial
    SerialNew,
    SerialOld,

    // CMS
    ParNewPromotionFailedCmsConcurrentModeFailure,
    ParNewConcurrentModeFailure,
    ParNewPromotionFailed,
    ParNew,
    CmsSerialOldConcurrentModeFailure,
    CmsSerialOld,
    CmsInitialMark,
    CmsRemark,
    CmsConcurrent,

    // Parallel
    ParallelScavenge,
    ParallelSerialOld,
    ParallelCompactingOld,

    // G1
    G1MixedPause,
    G1YoungPause,
    G1FullGc,
    G1Remark,
    G1Cleanup,
    G1Concurrent,

    // unified logging (JDK9+)
    UnifiedG1MixedPause,
    UnifiedG1YoungPause,
    UnifiedYoung,
    UnifiedFull,
    UnifiedRemark,
    UnifiedCleanup,
    UnifiedConcurrent,

    Truncated,
    Unknown,
}

impl EventType {
    /// 모든 이벤트 종류 (선언 순서)
    pub const ALL: [EventType; 37] = [
        Self::HeaderVersion,
        Self::HeaderMemory,
        Self::HeaderCommandLineFlags,
        Self::UsingCollector,
        Self::ApplicationConcurrentTime,
        Self::ApplicationStoppedTime,
        Self::Safepoint,
        Self::UnifiedSafepoint,
        Self::SerialNew,
        Self::SerialOld,
        Self::ParNewPromotionFailedCmsConcurrentModeFailure,
        Self::ParNewConcurrentModeFailure,
        Self::ParNewPromotionFailed,
        Self::ParNew,
        Self::CmsSerialOldConcurrentModeFailure,
        Self::CmsSerialOld,
        Self::CmsInitialMark,
        Self::CmsRemark,
        Self::CmsConcurrent,
        Self::ParallelScavenge,
        Self::ParallelSerialOld,
        Self::ParallelCompactingOld,
        Self::G1MixedPause,
        Self::G1YoungPause,
        Self::G1FullGc,
        Self::G1Remark,
        Self::G1Cleanup,
        Self::G1Concurrent,
        Self::UnifiedG1MixedPause,
        Self::UnifiedG1YoungPause,
        Self::UnifiedYoung,
        Self::UnifiedFull,
        Self::UnifiedRemark,
        Self::UnifiedCleanup,
        Self::UnifiedConcurrent,
        Self::Truncated,
        Self::Unknown,
    ];

    /// 안정적인 이벤트 이름
    pub const fn name(self) -> &'static str {
        match self {
            Self::HeaderVersion => "HEADER_VERSION",
            Self::HeaderMemory => "HEADER_MEMORY",
            Self::HeaderCommandLineFlags => "HEADER_COMMAND_LINE_FLAGS",
            Self::UsingCollector => "USING_COLLECTOR",
            Self::ApplicationConcurrentTime => "APPLICATION_CONCURRENT_TIME",
            Self::ApplicationStoppedTime => "APPLICATION_STOPPED_TIME",
            Self::Safepoint => "SAFEPOINT",
            Self::UnifiedSafepoint => "UNIFIED_SAFEPOINT",
            Self::SerialNew => "SERIAL_NEW",
            Self::SerialOld => "SERIAL_OLD",
            Self::ParNewPromotionFailedCmsConcurrentModeFailure => {
                "PAR_NEW_PROMOTION_FAILED_CMS_CONCURRENT_MODE_FAILURE"
            }
            Self::ParNewConcurrentModeFailure => "PAR_NEW_CONCURRENT_MODE_FAILURE",
            Self::ParNewPromotionFailed => "PAR_NEW_PROMOTION_FAILED",
            Self::ParNew => "PAR_NEW",
            Self::CmsSerialOldConcurrentModeFailure => "CMS_SERIAL_OLD_CONCURRENT_MODE_FAILURE",
            Self::CmsSerialOld => "CMS_SERIAL_OLD",
            Self::CmsInitialMark => "CMS_INITIAL_MARK",
            Self::CmsRemark => "CMS_REMARK",
            Self::CmsConcurrent => "CMS_CONCURRENT",
            Self::ParallelScavenge => "PARALLEL_SCAVENGE",
            Self::ParallelSerialOld => "PARALLEL_SERIAL_OLD",
            Self::ParallelCompactingOld => "PARALLEL_COMPACTING_OLD",
            Self::G1MixedPause => "G1_MIXED_PAUSE",
            Self::G1YoungPause => "G1_YOUNG_PAUSE",
            Self::G1FullGc => "G1_FULL_GC",
            Self::G1Remark => "G1_REMARK",
            Self::G1Cleanup => "G1_CLEANUP",
            Self::G1Concurrent => "G1_CONCURRENT",
            Self::UnifiedG1MixedPause => "UNIFIED_G1_MIXED_PAUSE",
            Self::UnifiedG1YoungPause => "UNIFIED_G1_YOUNG_PAUSE",
            Self::UnifiedYoung => "UNIFIED_YOUNG",
            Self::UnifiedFull => "UNIFIED_FULL",
            Self::UnifiedRemark => "UNIFIED_REMARK",
            Self::UnifiedCleanup => "UNIFIED_CLEANUP",
            Self::UnifiedConcurrent => "UNIFIED_CONCURRENT",
            Self::Truncated => "TRUNCATED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// 이름으로 이벤트 종류를 찾습니다.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// 애플리케이션 스레드를 멈추는 (stop-the-world) 이벤트인지 여부
    pub const fn is_blocking(self) -> bool {
        matches!(
            self,
            Self::SerialNew
                | Self::SerialOld
                | Self::ParNewPromotionFailedCmsConcurrentModeFailure
                | Self::ParNewConcurrentModeFailure
                | Self::ParNewPromotionFailed
                | Self::ParNew
                | Self::CmsSerialOldConcurrentModeFailure
                | Self::CmsSerialOld
                | Self::CmsInitialMark
                | Self::CmsRemark
                | Self::ParallelScavenge
                | Self::ParallelSerialOld
                | Self::ParallelCompactingOld
                | Self::G1MixedPause
                | Self::G1YoungPause
                | Self::G1FullGc
                | Self::G1Remark
                | Self::G1Cleanup
                | Self::UnifiedG1MixedPause
                | Self::UnifiedG1YoungPause
                | Self::UnifiedYoung
                | Self::UnifiedFull
                | Self::UnifiedRemark
                | Self::UnifiedCleanup
        )
    }

    /// 로그 헤더 이벤트인지 여부 (타임라인에 포함되지 않음)
    pub const fn is_header(self) -> bool {
        matches!(
            self,
            Self::HeaderVersion
                | Self::HeaderMemory
                | Self::HeaderCommandLineFlags
                | Self::UsingCollector
        )
    }

    /// 이벤트 종류만으로 결정되는 컬렉터 계열
    ///
    /// unified 이벤트의 계열은 `Using ...` 헤더에서 얻으므로 `None`입니다.
    pub const fn collector(self) -> Option<CollectorFamily> {
        match self {
            Self::SerialNew | Self::SerialOld => Some(CollectorFamily::Serial),
            Self::ParNewPromotionFailedCmsConcurrentModeFailure
            | Self::ParNewConcurrentModeFailure
            | Self::ParNewPromotionFailed
            | Self::ParNew
            | Self::CmsSerialOldConcurrentModeFailure
            | Self::CmsSerialOld
            | Self::CmsInitialMark
            | Self::CmsRemark
            | Self::CmsConcurrent => Some(CollectorFamily::Cms),
            Self::ParallelScavenge | Self::ParallelSerialOld | Self::ParallelCompactingOld => {
                Some(CollectorFamily::Parallel)
            }
            Self::G1MixedPause
            | Self::G1YoungPause
            | Self::G1FullGc
            | Self::G1Remark
            | Self::G1Cleanup
            | Self::G1Concurrent
            | Self::UnifiedG1MixedPause
            | Self::UnifiedG1YoungPause => Some(CollectorFamily::G1),
            _ => None,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 가비지 컬렉터 계열
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CollectorFamily {
    Serial,
    Parallel,
    Cms,
    G1,
    Shenandoah,
    Z,
}

impl CollectorFamily {
    /// unified `Using <name>` 헤더의 이름으로 계열을 찾습니다.
    pub fn from_using(name: &str) -> Option<Self> {
        match name.trim() {
            "Serial" => Some(Self::Serial),
            "Parallel" => Some(Self::Parallel),
            "Concurrent Mark Sweep" => Some(Self::Cms),
            "G1" => Some(Self::G1),
            "Shenandoah" => Some(Self::Shenandoah),
            "The Z Garbage Collector" | "Z" => Some(Self::Z),
            _ => None,
        }
    }
}

impl fmt::Display for CollectorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "Serial"),
            Self::Parallel => write!(f, "Parallel"),
            Self::Cms => write!(f, "CMS"),
            Self::G1 => write!(f, "G1"),
            Self::Shenandoah => write!(f, "Shenandoah"),
            Self::Z => write!(f, "Z"),
        }
    }
}

/// 한 영역의 점유율: GC 전 / GC 후 / 용량
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub init: Memory,
    pub end: Memory,
    pub capacity: Memory,
}

impl Occupancy {
    pub const fn new(init: Memory, end: Memory, capacity: Memory) -> Self {
        Self {
            init,
            end,
            capacity,
        }
    }

    /// 영역별 차이 (`self - other`)를 계산합니다.
    ///
    /// combined - young 으로 old 영역을 유도할 때 사용합니다.
    pub fn minus(&self, other: &Occupancy) -> Occupancy {
        Occupancy {
            init: self.init.minus(other.init),
            end: self.end.minus(other.end),
            capacity: self.capacity.minus(other.capacity),
        }
    }
}

macro_rules! safepoint_triggers {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// 안전점을 발생시킨 VM 연산
        ///
        /// 알려진 이름은 선언 순서로 정렬되며, 나머지는 [`SafepointTrigger::Other`]로 보존합니다.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SafepointTrigger {
            $($variant,)+
            Other(String),
        }

        impl SafepointTrigger {
            /// VM 연산 이름으로 트리거를 만듭니다.
            pub fn from_name(name: &str) -> Self {
                match name.trim() {
                    $($name => Self::$variant,)+
                    other => Self::Other(other.to_owned()),
                }
            }

            /// 로그에 찍히는 VM 연산 이름
            pub fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $name,)+
                    Self::Other(name) => name,
                }
            }
        }
    };
}

safepoint_triggers! {
    BulkRevokeBias => "BulkRevokeBias",
    CgcOperation => "CGC_Operation",
    Cleanup => "Cleanup",
    CmsFinalRemark => "CMS_Final_Remark",
    CmsInitialMark => "CMS_Initial_Mark",
    CollectForMetadataAllocation => "CollectForMetadataAllocation",
    Deoptimize => "Deoptimize",
    EnableBiasedLocking => "EnableBiasedLocking",
    FindDeadlocks => "FindDeadlocks",
    ForceAsyncSafepoint => "ForceAsyncSafepoint",
    ForceSafepoint => "ForceSafepoint",
    G1CollectForAllocation => "G1CollectForAllocation",
    G1CollectFull => "G1CollectFull",
    G1Concurrent => "G1Concurrent",
    G1IncCollectionPause => "G1IncCollectionPause",
    G1PauseCleanup => "G1PauseCleanup",
    G1PauseRemark => "G1PauseRemark",
    GenCollectForAllocation => "GenCollectForAllocation",
    GenCollectFull => "GenCollectFull",
    GetAllStackTraces => "GetAllStackTraces",
    GetThreadListStackTraces => "GetThreadListStackTraces",
    HandshakeAllThreads => "HandshakeAllThreads",
    HandshakeFallback => "HandshakeFallback",
    HeapDumper => "HeapDumper",
    IcBufferFull => "ICBufferFull",
    NoVmOperation => "no vm operation",
    ParallelGcFailedAllocation => "ParallelGCFailedAllocation",
    ParallelGcSystemGc => "ParallelGCSystemGC",
    PrintJni => "PrintJNI",
    PrintThreads => "PrintThreads",
    RedefineClasses => "RedefineClasses",
    RevokeBias => "RevokeBias",
    ShenandoahDegeneratedGc => "ShenandoahDegeneratedGC",
    ShenandoahFinalMarkStartEvac => "ShenandoahFinalMarkStartEvac",
    ShenandoahInitMark => "ShenandoahInitMark",
    ThreadDump => "ThreadDump",
    ZMarkEnd => "ZMarkEnd",
    ZMarkStart => "ZMarkStart",
    ZRelocateStart => "ZRelocateStart",
}

impl fmt::Display for SafepointTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SafepointTrigger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// 안전점 한 번의 단계별 시간 (나노초)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafepointData {
    pub trigger: SafepointTrigger,
    /// 모든 스레드가 안전점에 도달하기까지
    pub reaching_ns: u64,
    pub cleanup_ns: u64,
    /// 안전점 안에서 VM 연산을 수행한 시간
    pub at_safepoint_ns: u64,
    pub total_ns: u64,
}

/// 이벤트 종류별 부가 정보
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventData {
    /// 메모리 정보가 없는 이벤트 (동시 단계, remark, 잘린 이벤트 등)
    #[default]
    None,
    /// 힙 전체 점유율만 있는 이벤트 (G1, unified)
    Heap {
        combined: Occupancy,
        perm: Option<Occupancy>,
    },
    /// young/old/전체 점유율이 있는 세대별 이벤트
    Generational {
        young: Occupancy,
        old: Occupancy,
        combined: Occupancy,
        perm: Option<Occupancy>,
    },
    Safepoint(SafepointData),
    /// 애플리케이션 정지 시간 (마이크로초)
    StoppedTime { stopped_us: u64, time_to_stop_us: u64 },
    /// 애플리케이션 동시 실행 시간 (마이크로초)
    ConcurrentTime { concurrent_us: u64 },
    Collector(CollectorFamily),
    JvmOptions(String),
    Version(String),
    PhysicalMemory(Memory),
    /// 인식하지 못한 줄. 타임스탬프를 줄에서 얻었는지 여부를 기록합니다.
    Unidentified { timestamp_present: bool },
}

/// GC 로그 한 줄에서 추출한 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GcEvent {
    pub event_type: EventType,
    /// JVM 시작 이후 밀리초
    pub timestamp: u64,
    /// 정지/수행 시간 (밀리초, 절삭)
    pub duration: u64,
    /// GC 원인 (`Allocation Failure`, `System.gc()` 등)
    pub trigger: Option<String>,
    pub data: EventData,
    /// 정규화된 원본 로그 줄
    pub log_entry: String,
}

impl GcEvent {
    pub fn new(event_type: EventType, timestamp: u64, log_entry: impl Into<String>) -> Self {
        Self {
            event_type,
            timestamp,
            duration: 0,
            trigger: None,
            data: EventData::None,
            log_entry: log_entry.into(),
        }
    }

    /// 인식하지 못한 줄을 이벤트로 만듭니다.
    ///
    /// 타임스탬프가 없으면 0으로 두고, 집계 단계에서 직전 이벤트에 고정됩니다.
    pub fn unknown(timestamp: Option<u64>, log_entry: impl Into<String>) -> Self {
        Self::new(EventType::Unknown, timestamp.unwrap_or(0), log_entry).with_data(
            EventData::Unidentified {
                timestamp_present: timestamp.is_some(),
            },
        )
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_trigger(mut self, trigger: Option<String>) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.event_type.is_blocking()
    }

    /// 이벤트 종료 시각 (timestamp + duration)
    pub fn end(&self) -> u64 {
        self.timestamp.saturating_add(self.duration)
    }

    /// 힙 전체 점유율
    pub fn combined(&self) -> Option<&Occupancy> {
        match &self.data {
            EventData::Heap { combined, .. } | EventData::Generational { combined, .. } => {
                Some(combined)
            }
            _ => None,
        }
    }

    pub fn young(&self) -> Option<&Occupancy> {
        match &self.data {
            EventData::Generational { young, .. } => Some(young),
            _ => None,
        }
    }

    pub fn old(&self) -> Option<&Occupancy> {
        match &self.data {
            EventData::Generational { old, .. } => Some(old),
            _ => None,
        }
    }

    /// perm/metaspace 점유율
    pub fn perm(&self) -> Option<&Occupancy> {
        match &self.data {
            EventData::Heap { perm, .. } | EventData::Generational { perm, .. } => perm.as_ref(),
            _ => None,
        }
    }

    pub fn safepoint(&self) -> Option<&SafepointData> {
        match &self.data {
            EventData::Safepoint(data) => Some(data),
            _ => None,
        }
    }

    /// 인식하지 못한 줄이 자체 타임스탬프를 가졌는지 여부
    pub fn has_own_timestamp(&self) -> bool {
        !matches!(
            self.data,
            EventData::Unidentified {
                timestamp_present: false
            }
        )
    }
}

impl fmt::Display for GcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ts={}ms duration={}ms",
            self.event_type, self.timestamp, self.duration
        )?;
        if let Some(trigger) = &self.trigger {
            write!(f, " trigger={trigger}")?;
        }
        Ok(())
    }
}
