#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`preprocess`]: 얽힌/쪼개진 원시 줄을 이벤트당 한 줄로 정규화
//! - [`datestamp`]: datestamp만 있는 줄을 JVM 시작 기준 타임스탬프로 변환
//! - [`parser`]: 이벤트 레지스트리 (식별 + 필드 추출)
//! - [`grammar`]: 패턴 공통 정규식 조각
//! - [`pipeline`]: 전처리 -> 파싱 오케스트레이션 (순차 / 단계별)
//! - [`source`]: 로그 파일 읽기
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! raw lines -> Preprocessor -> normalized lines -> EventRegistry -> GcEvent stream
//!                 |                                     |
//!          noise + 10 actions                  ordered pattern table
//! ```

pub mod config;
pub mod datestamp;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod pipeline;
pub mod preprocess;
pub mod source;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{GcLogPipeline, StagedSummary};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::LogParserError;

// 전처리
pub use preprocess::{LINE_SEPARATOR, PreprocessAction, PreprocessStats, Preprocessor};

// 파서
pub use parser::{EventPattern, EventRegistry, ParseOutcome};

// 입력
pub use source::{read_log_lines, split_lines};
