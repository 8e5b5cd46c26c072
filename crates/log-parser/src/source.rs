//! GC 로그 파일 읽기
//!
//! GC 로그는 한 번에 끝까지 읽습니다 (추적 모드 없음). JVM이 중간에 잘린
//! 멀티바이트 문자를 남기는 경우가 있어 잘못된 UTF-8은 대체 문자로 바꿉니다.

use std::path::Path;

use tracing::debug;

use crate::error::LogParserError;

/// 텍스트를 원시 줄로 나눕니다. `\n`과 `\r\n` 종결자를 모두 인정합니다.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}

/// 로그 파일 전체를 원시 줄로 읽습니다.
///
/// 빈 파일은 줄이 없는 정상 입력입니다.
pub async fn read_log_lines(path: &Path) -> Result<Vec<String>, LogParserError> {
    let bytes = tokio::fs::read(path).await?;
    let lines = split_lines(&String::from_utf8_lossy(&bytes));
    debug!(path = %path.display(), bytes = bytes.len(), lines = lines.len(), "gc log read");
    Ok(lines)
}
