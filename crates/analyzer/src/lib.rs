#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`store`]: 이벤트 집계 (`RunStore`)
//! - [`bottleneck`]: 병목 구간 탐지 (`BottleneckEntry`)
//! - [`options`]: JVM 옵션 체크리스트
//! - [`analysis`]: 분석 경고 키 (`AnalysisKey`)
//! - [`jvm_run`]: 실행 요약 스냅샷 (`JvmRun`, `build_run`)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! GcEvent stream -> RunStore (EventSink) -> JvmRun::from_store
//!                                              |
//!                         bottlenecks + options/event checks + throughput
//! ```

pub mod analysis;
pub mod bottleneck;
pub mod error;
pub mod jvm_run;
pub mod options;
pub mod store;

// --- 주요 타입 re-export ---

// 집계
pub use store::{RunStore, SafepointSummary, StoppedTimeSummary, UnidentifiedLine};

// 분석
pub use analysis::AnalysisKey;
pub use bottleneck::{BottleneckEntry, find_bottlenecks};
pub use options::JvmOptions;

// 스냅샷
pub use jvm_run::{JvmRun, build_run};

// 에러
pub use error::AnalyzerError;
