//! 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`HeapscopeConfig`](heapscope_core::config::HeapscopeConfig)에서
//! 전처리/파싱 단계에 필요한 값만 골라 검증된 형태로 보관합니다.
//!
//! # 사용 예시
//! ```ignore
//! use heapscope_core::config::HeapscopeConfig;
//! use heapscope_log_parser::config::PipelineConfig;
//!
//! let core_config = HeapscopeConfig::default();
//! let config = PipelineConfig::from_core(&core_config)?;
//! ```

use chrono::NaiveDateTime;
use heapscope_core::config::{HeapscopeConfig, parse_jvm_start};

use crate::error::LogParserError;

/// 전처리/파싱 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// JVM 시작 시각 (datestamp만 있는 줄을 타임스탬프로 바꿀 때 사용)
    pub jvm_start: Option<NaiveDateTime>,
    /// 보관할 인식 불가 줄의 최대 개수
    pub max_unidentified_lines: usize,

    // --- 단계 실행 설정 (core에 없는 추가 필드) ---
    /// 단계 사이 채널 용량 (배치 단위)
    pub channel_capacity: usize,
    /// 단계 사이에 한 번에 전달하는 정규화된 줄 수
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            jvm_start: None,
            max_unidentified_lines: 1000,
            channel_capacity: 16,
            batch_size: 512,
        }
    }
}

impl PipelineConfig {
    /// core 설정에서 파이프라인 설정을 생성합니다.
    ///
    /// core 설정에 없는 단계 실행 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &HeapscopeConfig) -> Result<Self, LogParserError> {
        let jvm_start = core
            .preprocess
            .jvm_start
            .as_deref()
            .map(parse_jvm_start)
            .transpose()
            .map_err(|e| LogParserError::Config {
                field: "preprocess.jvm_start".to_owned(),
                reason: e.to_string(),
            })?;

        let config = Self {
            jvm_start,
            max_unidentified_lines: core.parser.max_unidentified_lines,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogParserError> {
        const MAX_BATCH_SIZE: usize = 100_000;
        const MAX_CHANNEL_CAPACITY: usize = 10_000;

        if self.max_unidentified_lines == 0 {
            return Err(LogParserError::Config {
                field: "max_unidentified_lines".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(LogParserError::Config {
                field: "batch_size".to_owned(),
                reason: format!("must be 1-{}", MAX_BATCH_SIZE),
            });
        }

        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(LogParserError::Config {
                field: "channel_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CHANNEL_CAPACITY),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// JVM 시작 시각을 설정합니다.
    pub fn jvm_start(mut self, start: Option<NaiveDateTime>) -> Self {
        self.config.jvm_start = start;
        self
    }

    /// 보관할 인식 불가 줄 수를 설정합니다.
    pub fn max_unidentified_lines(mut self, max: usize) -> Self {
        self.config.max_unidentified_lines = max;
        self
    }

    /// 단계 사이 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// 배치 크기를 설정합니다.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, LogParserError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
