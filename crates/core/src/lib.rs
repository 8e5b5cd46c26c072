#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod pipeline;
pub mod units;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, HeapscopeError, ParseError, PipelineError};

// 설정
pub use config::HeapscopeConfig;

// 이벤트
pub use event::{
    CollectorFamily, EventData, EventType, GcEvent, Occupancy, SafepointData, SafepointTrigger,
};

// 파이프라인 trait
pub use pipeline::{EventParser, EventSink};

// 단위
pub use units::{Memory, MemoryUnit};
