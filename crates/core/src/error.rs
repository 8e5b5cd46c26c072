//! 에러 타입 -- 도메인별 에러 정의

/// heapscope 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HeapscopeError {
    /// 설정 관련 에러 (치명적, 즉시 중단)
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 숫자/단위/날짜 변환 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// datestamp를 상대 타임스탬프로 바꿔야 하는데 JVM 시작 시각이 없음
    #[error(
        "line {line} has a datestamp without a timestamp; a jvm start datestamp is required to convert it"
    )]
    MissingJvmStart { line: usize },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 처리 단계 실패 (태스크 패닉, 조기 종료 등)
    #[error("stage failed: {0}")]
    StageFailed(String),
}

/// 숫자/단위/날짜 변환 에러
///
/// 파서 내부에서는 이 에러가 발생한 줄을 UNKNOWN으로 강등합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// 10진수 문자열 변환 실패
    #[error("invalid number '{value}': {reason}")]
    InvalidNumber { value: String, reason: String },

    /// 메모리 크기 문자열 변환 실패
    #[error("invalid memory size '{0}'")]
    InvalidMemory(String),

    /// datestamp 변환 실패
    #[error("invalid datestamp '{value}': {reason}")]
    InvalidDatestamp { value: String, reason: String },

    /// 정규식은 매칭되었지만 필요한 그룹이 없음
    #[error("missing capture group '{0}'")]
    MissingGroup(String),
}

impl ParseError {
    /// 숫자 변환 에러를 생성합니다.
    pub fn number(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidNumber {
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_jvm_start_display_mentions_line() {
        let err = ConfigError::MissingJvmStart { line: 7 };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("jvm start"));
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let err: HeapscopeError = ConfigError::MissingJvmStart { line: 1 }.into();
        assert!(matches!(
            err,
            HeapscopeError::Config(ConfigError::MissingJvmStart { line: 1 })
        ));
    }

    #[test]
    fn parse_error_number_helper() {
        let err = ParseError::number("1.2.3", "too many separators");
        assert!(err.to_string().contains("1.2.3"));
        assert!(err.to_string().contains("too many separators"));
    }
}
