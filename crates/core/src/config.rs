//! 설정 관리 -- heapscope.toml 파싱 및 런타임 설정
//!
//! [`HeapscopeConfig`]는 전처리/파싱/분석 단계의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`HEAPSCOPE_ANALYSIS_THROUGHPUT_THRESHOLD=80` 형식)
//! 3. 설정 파일 (`heapscope.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), heapscope_core::error::HeapscopeError> {
//! use heapscope_core::config::HeapscopeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HeapscopeConfig::load("heapscope.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HeapscopeConfig::parse("[analysis]\nthroughput_threshold = 80")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HeapscopeError};

/// JVM 시작 datestamp 형식 (`yyyy-MM-dd HH:mm:ss,SSS`)
pub const JVM_START_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// heapscope 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeapscopeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 전처리 설정
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    /// 이벤트 파서 설정
    #[serde(default)]
    pub parser: ParserSection,
    /// 분석 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl HeapscopeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HeapscopeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HeapscopeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HeapscopeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HeapscopeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HeapscopeError> {
        toml::from_str(toml_str).map_err(|e| {
            HeapscopeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HEAPSCOPE_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HEAPSCOPE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "HEAPSCOPE_GENERAL_LOG_FORMAT");

        // Preprocess
        override_opt_string(
            &mut self.preprocess.jvm_start,
            "HEAPSCOPE_PREPROCESS_JVM_START",
        );

        // Parser
        override_usize(
            &mut self.parser.max_unidentified_lines,
            "HEAPSCOPE_PARSER_MAX_UNIDENTIFIED_LINES",
        );

        // Analysis
        override_u32(
            &mut self.analysis.throughput_threshold,
            "HEAPSCOPE_ANALYSIS_THROUGHPUT_THRESHOLD",
        );
        override_u64(
            &mut self.analysis.first_timestamp_threshold_secs,
            "HEAPSCOPE_ANALYSIS_FIRST_TIMESTAMP_THRESHOLD_SECS",
        );
        override_opt_string(
            &mut self.analysis.jvm_options,
            "HEAPSCOPE_ANALYSIS_JVM_OPTIONS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HeapscopeError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // jvm_start 형식 검증
        self.preprocess.jvm_start_datetime()?;

        if self.parser.max_unidentified_lines == 0 {
            return Err(ConfigError::InvalidValue {
                field: "parser.max_unidentified_lines".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.analysis.throughput_threshold > 100 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.throughput_threshold".to_owned(),
                reason: "must be a percentage between 0 and 100".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 전처리 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// JVM 시작 시각 (`yyyy-MM-dd HH:mm:ss,SSS`)
    ///
    /// 타임스탬프 없이 datestamp만 있는 로그를 처리할 때 필요합니다.
    pub jvm_start: Option<String>,
}

impl PreprocessConfig {
    /// `jvm_start`를 파싱합니다. 설정되지 않았으면 `Ok(None)`입니다.
    pub fn jvm_start_datetime(&self) -> Result<Option<NaiveDateTime>, ConfigError> {
        self.jvm_start
            .as_deref()
            .map(parse_jvm_start)
            .transpose()
    }
}

/// `yyyy-MM-dd HH:mm:ss,SSS` 형식의 JVM 시작 시각을 파싱합니다.
pub fn parse_jvm_start(value: &str) -> Result<NaiveDateTime, ConfigError> {
    NaiveDateTime::parse_from_str(value.trim(), JVM_START_FORMAT).map_err(|e| {
        ConfigError::InvalidValue {
            field: "preprocess.jvm_start".to_owned(),
            reason: format!("expected 'yyyy-MM-dd HH:mm:ss,SSS': {e}"),
        }
    })
}

/// 이벤트 파서 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    /// 보관할 인식 불가 줄의 최대 개수 (개수 자체는 항상 정확히 집계)
    pub max_unidentified_lines: usize,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            max_unidentified_lines: 1000,
        }
    }
}

/// 분석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 병목 판정 처리율 기준 (%)
    pub throughput_threshold: u32,
    /// 첫 타임스탬프가 이 값(초)을 넘으면 부분 로그로 판단
    pub first_timestamp_threshold_secs: u64,
    /// JVM 옵션 문자열 (없으면 로그 헤더의 `CommandLine flags:` 사용)
    pub jvm_options: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            throughput_threshold: 90,
            first_timestamp_threshold_secs: 60,
            jvm_options: None,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.trim().is_empty() {
            None
        } else {
            Some(val)
        };
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = HeapscopeConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.preprocess.jvm_start.is_none());
        assert_eq!(config.parser.max_unidentified_lines, 1000);
        assert_eq!(config.analysis.throughput_threshold, 90);
        assert_eq!(config.analysis.first_timestamp_threshold_secs, 60);
    }

    #[test]
    fn default_config_passes_validation() {
        HeapscopeConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = HeapscopeConfig::parse("").unwrap();
        assert_eq!(config.analysis.throughput_threshold, 90);
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[preprocess]
jvm_start = "2009-09-18 00:00:08,172"

[analysis]
throughput_threshold = 75
"#;
        let config = HeapscopeConfig::parse(toml).unwrap();
        assert_eq!(
            config.preprocess.jvm_start.as_deref(),
            Some("2009-09-18 00:00:08,172")
        );
        assert_eq!(config.analysis.throughput_threshold, 75);
        // first_timestamp_threshold_secs는 기본값 유지
        assert_eq!(config.analysis.first_timestamp_threshold_secs, 60);
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let result = HeapscopeConfig::parse("[analysis\nthroughput_threshold = ");
        assert!(matches!(
            result,
            Err(HeapscopeError::Config(ConfigError::ParseFailed { .. }))
        ));
    }

    #[test]
    fn jvm_start_parses_millis() {
        let start = parse_jvm_start("2009-09-18 00:00:08,172").unwrap();
        assert_eq!(start.second(), 8);
        assert_eq!(start.nanosecond(), 172_000_000);
    }

    #[test]
    fn validate_rejects_malformed_jvm_start() {
        let mut config = HeapscopeConfig::default();
        config.preprocess.jvm_start = Some("2009/09/18 00:00:08".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("preprocess.jvm_start"));
    }

    #[test]
    fn validate_rejects_threshold_over_100() {
        let mut config = HeapscopeConfig::default();
        config.analysis.throughput_threshold = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("throughput_threshold"));
    }

    #[test]
    fn validate_rejects_zero_unidentified_limit() {
        let mut config = HeapscopeConfig::default();
        config.parser.max_unidentified_lines = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = HeapscopeConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    #[serial]
    fn env_override_u32_valid() {
        let mut val = 90;
        // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
        unsafe { std::env::set_var("TEST_HEAPSCOPE_U32", "80") };
        override_u32(&mut val, "TEST_HEAPSCOPE_U32");
        assert_eq!(val, 80);
        unsafe { std::env::remove_var("TEST_HEAPSCOPE_U32") };
    }

    #[test]
    #[serial]
    fn env_override_u64_invalid_keeps_original() {
        let mut val = 60;
        // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
        unsafe { std::env::set_var("TEST_HEAPSCOPE_U64_BAD", "sixty") };
        override_u64(&mut val, "TEST_HEAPSCOPE_U64_BAD");
        assert_eq!(val, 60);
        unsafe { std::env::remove_var("TEST_HEAPSCOPE_U64_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_opt_string_blank_clears() {
        let mut val = Some("-Xmx1g".to_owned());
        // SAFETY: serial 테스트에서만 환경변수를 조작합니다.
        unsafe { std::env::set_var("TEST_HEAPSCOPE_OPT", "  ") };
        override_opt_string(&mut val, "TEST_HEAPSCOPE_OPT");
        assert!(val.is_none());
        unsafe { std::env::remove_var("TEST_HEAPSCOPE_OPT") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_HEAPSCOPE_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = HeapscopeConfig::default();
        config.analysis.jvm_options = Some("-Xms1g -Xmx1g".to_owned());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = HeapscopeConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.analysis.jvm_options, config.analysis.jvm_options);
        assert_eq!(
            parsed.parser.max_unidentified_lines,
            config.parser.max_unidentified_lines
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = HeapscopeConfig::from_file("/nonexistent/path/heapscope.toml").await;
        assert!(matches!(
            result,
            Err(HeapscopeError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
