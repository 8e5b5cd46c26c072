//! datestamp 변환
//!
//! `-XX:+PrintGCDateStamps` 로그는 벽시계 datestamp를 찍습니다. 파서는 JVM 시작
//! 이후 밀리초 타임스탬프만 다루므로 전처리 단계에서 다음과 같이 정규화합니다.
//!
//! | 입력 | 결과 |
//! |------|------|
//! | `2010-02-26T09:32:12.486-0600: 14.236: [GC ...` | `14.236: [GC ...` |
//! | `2009-09-18T00:00:09,172: [GC ...` | `1.000: [GC ...` (시작 시각 기준) |
//! | `[2020-03-10T08:03:29.311+0000][0.033s][info][gc] ...` | `[0.033s][info][gc] ...` |
//! | `[2020-03-10T08:03:29.311+0000][info][gc] ...` | `[1.000s][info][gc] ...` |
//!
//! 타임존 오프셋은 무시합니다. 시작 시각과 datestamp 모두 로컬 시각으로 취급합니다.

use std::borrow::Cow;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use heapscope_core::error::ParseError;
use heapscope_core::units::format_secs;
use regex::Regex;
use tracing::warn;

use crate::error::LogParserError;
use crate::grammar::{DATESTAMP, TIMESTAMP};

const DATESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// `DATESTAMP: TIMESTAMP: ` (datestamp가 중복된 경우)
fn redundant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?:{DATESTAMP}): (?P<ts>{TIMESTAMP}): "))
            .expect("valid redundant datestamp regex")
    })
}

/// `DATESTAMP: ` (타임스탬프가 뒤따르지 않는 경우)
fn classic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?P<ds>{DATESTAMP}): "))
            .expect("valid classic datestamp regex")
    })
}

/// unified `[DATESTAMP]` 데코레이터와 뒤따르는 uptime 데코레이터 (선택)
fn unified_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^\[(?P<ds>{DATESTAMP})\](?P<uptime>\[(?:{TIMESTAMP}s|\d{{1,13}}ms)\])?"
        ))
        .expect("valid unified datestamp regex")
    })
}

/// datestamp 텍스트를 로컬 시각으로 파싱합니다. 타임존 오프셋은 버립니다.
pub fn parse_datestamp(text: &str) -> Result<NaiveDateTime, ParseError> {
    // 날짜/시간 부분은 고정 길이 23자 (`yyyy-MM-ddTHH:mm:ss.SSS`)
    let local = text.get(..23).unwrap_or(text).replace(',', ".");
    NaiveDateTime::parse_from_str(&local, DATESTAMP_FORMAT).map_err(|e| {
        ParseError::InvalidDatestamp {
            value: text.to_owned(),
            reason: e.to_string(),
        }
    })
}

/// datestamp를 상대 타임스탬프로 바꾸는 변환기
#[derive(Debug, Clone, Copy)]
pub struct DatestampConverter {
    jvm_start: Option<NaiveDateTime>,
}

impl DatestampConverter {
    pub fn new(jvm_start: Option<NaiveDateTime>) -> Self {
        Self { jvm_start }
    }

    /// 시작 시각이 있어야만 변환할 수 있는 줄인지 검사합니다.
    ///
    /// 상대 타임스탬프 없이 datestamp만 가진 줄이 해당합니다.
    pub fn needs_jvm_start(line: &str) -> bool {
        if let Some(caps) = unified_re().captures(line) {
            return caps.name("uptime").is_none();
        }
        let stripped = redundant_re().replace_all(line, "$ts: ");
        classic_re().is_match(&stripped)
    }

    /// 줄의 datestamp를 정규화합니다. datestamp가 없으면 원본을 빌려 돌려줍니다.
    ///
    /// 정규식은 통과했지만 달력상 불가능한 datestamp (`2010-02-30T...`)가 있으면
    /// 경고만 남기고 원본을 그대로 돌려줍니다. 파서가 그 줄을 UNKNOWN으로 강등합니다.
    /// 에러는 시작 시각이 없는 경우뿐입니다.
    ///
    /// `line_no`는 오류 보고용 1-based 줄 번호입니다.
    pub fn convert<'a>(&self, line: &'a str, line_no: usize) -> Result<Cow<'a, str>, LogParserError> {
        if let Some(caps) = unified_re().captures(line) {
            let rest = &line[caps.get(0).map_or(0, |m| m.end())..];
            if let Some(uptime) = caps.name("uptime") {
                return Ok(Cow::Owned(format!("{}{rest}", uptime.as_str())));
            }
            let Some(millis) = self.relative_millis(&caps["ds"], line_no)? else {
                return Ok(Cow::Borrowed(line));
            };
            return Ok(Cow::Owned(format!("[{}s]{rest}", format_secs(millis))));
        }

        let stripped = redundant_re().replace_all(line, "$ts: ");
        if !classic_re().is_match(&stripped) {
            return Ok(stripped);
        }

        let mut converted = String::with_capacity(stripped.len());
        let mut last = 0;
        for caps in classic_re().captures_iter(&stripped) {
            let (Some(whole), Some(ds)) = (caps.get(0), caps.name("ds")) else {
                continue;
            };
            let Some(millis) = self.relative_millis(ds.as_str(), line_no)? else {
                return Ok(Cow::Borrowed(line));
            };
            converted.push_str(&stripped[last..whole.start()]);
            converted.push_str(&format_secs(millis));
            converted.push_str(": ");
            last = whole.end();
        }
        converted.push_str(&stripped[last..]);
        Ok(Cow::Owned(converted))
    }

    /// 시작 시각 이후 경과 밀리초. 시작 시각보다 이른 datestamp는 0으로 고정합니다.
    ///
    /// 파싱할 수 없는 datestamp는 `None`입니다.
    fn relative_millis(
        &self,
        datestamp: &str,
        line_no: usize,
    ) -> Result<Option<u64>, LogParserError> {
        let start = self
            .jvm_start
            .ok_or(LogParserError::MissingJvmStart { line: line_no })?;
        let at = match parse_datestamp(datestamp) {
            Ok(at) => at,
            Err(e) => {
                warn!(
                    line = line_no,
                    datestamp,
                    error = %e,
                    "unparseable datestamp, passing line through"
                );
                return Ok(None);
            }
        };

        let elapsed = (at - start).num_milliseconds();
        if elapsed < 0 {
            warn!(
                line = line_no,
                datestamp, "datestamp precedes jvm start, clamping to 0"
            );
            return Ok(Some(0));
        }
        Ok(Some(u64::try_from(elapsed).unwrap_or(u64::MAX)))
    }
}
