//! 분석기 에러 타입
//!
//! [`AnalyzerError`]는 `From<AnalyzerError> for HeapscopeError` 변환을 제공합니다.

use heapscope_core::error::{ConfigError, HeapscopeError};

/// 분석기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// 분석 설정 값이 범위를 벗어남
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<AnalyzerError> for HeapscopeError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Config { field, reason } => {
                HeapscopeError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_invalid_value() {
        let err: HeapscopeError = AnalyzerError::Config {
            field: "analysis.throughput_threshold".to_owned(),
            reason: "must be at most 100".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            HeapscopeError::Config(ConfigError::InvalidValue { ref field, .. })
                if field == "analysis.throughput_threshold"
        ));
    }
}
