//! 로그 파서 에러 타입
//!
//! [`LogParserError`]는 전처리/파싱/단계 실행 중 발생하는 에러를 표현합니다.
//! `From<LogParserError> for HeapscopeError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 인식하지 못한 줄, 숫자 변환에 실패한 줄, 달력상 불가능한 datestamp는
//! 에러가 아닙니다. 이런 줄은 UNKNOWN 이벤트가 됩니다.

use heapscope_core::error::{ConfigError, HeapscopeError, PipelineError};

/// 로그 파서 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogParserError {
    /// datestamp만 있는 줄이 있는데 JVM 시작 시각이 설정되지 않음
    #[error(
        "line {line} has a datestamp without a timestamp; set a jvm start datestamp (yyyy-MM-dd HH:mm:ss,SSS)"
    )]
    MissingJvmStart {
        /// 1부터 시작하는 원시 줄 번호
        line: usize,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 단계 태스크 실패 (패닉, 취소)
    #[error("stage error: {0}")]
    Stage(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogParserError> for HeapscopeError {
    fn from(err: LogParserError) -> Self {
        match err {
            LogParserError::MissingJvmStart { line } => {
                HeapscopeError::Config(ConfigError::MissingJvmStart { line })
            }
            LogParserError::Config { field, reason } => {
                HeapscopeError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogParserError::Channel(reason) => {
                HeapscopeError::Pipeline(PipelineError::ChannelSend(reason))
            }
            LogParserError::Stage(reason) => {
                HeapscopeError::Pipeline(PipelineError::StageFailed(reason))
            }
            LogParserError::Io(e) => HeapscopeError::Io(e),
        }
    }
}
