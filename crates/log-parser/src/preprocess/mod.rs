//! 전처리기 -- 원시 GC 로그를 이벤트당 한 줄로 정규화합니다.
//!
//! # 처리 순서
//!
//! 1. 노이즈 줄 제거 ([`noise`])
//! 2. datestamp 정규화 ([`DatestampConverter`])
//! 3. (이전, 현재, 다음) 창으로 한 번 훑으며 [`ACTIONS`] 테이블 적용
//! 4. 어떤 액션도 처리하지 않은 줄은 그대로 통과
//!
//! datestamp만 있는 줄이 있는데 JVM 시작 시각이 없으면 출력 없이
//! [`LogParserError::MissingJvmStart`]를 돌려줍니다.
//!
//! 정규화된 출력을 다시 전처리해도 결과는 같습니다.

pub mod action;
pub mod buffer;
pub mod noise;

use chrono::NaiveDateTime;
use metrics::counter;
use tracing::{debug, info};

use heapscope_core::metrics::{
    LABEL_ACTION, PREPROCESS_LINES_DISCARDED_TOTAL, PREPROCESS_LINES_MERGED_TOTAL,
    PREPROCESS_LINES_READ_TOTAL,
};

use crate::datestamp::DatestampConverter;
use crate::error::LogParserError;

pub use action::{ACTIONS, Outcome, PreprocessAction, Window, first_match};
pub use buffer::LineBuffer;

/// 정규화된 줄을 파일로 쓸 때 사용하는 줄 구분자
pub const LINE_SEPARATOR: &str = "\n";

/// 한 번의 전처리 실행 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    /// 읽은 원시 줄 수
    pub lines_read: usize,
    /// 버린 줄 수 (노이즈 포함)
    pub discarded: usize,
    /// 다른 줄에 합쳐진 줄 수
    pub merged: usize,
    /// 출력한 정규화된 줄 수
    pub emitted: usize,
}

/// GC 로그 전처리기
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    jvm_start: Option<NaiveDateTime>,
    converter: DatestampConverter,
}

impl Preprocessor {
    /// 전처리기를 생성합니다.
    ///
    /// `jvm_start`는 datestamp만 있는 로그를 상대 타임스탬프로 바꿀 때 필요합니다.
    pub fn new(jvm_start: Option<NaiveDateTime>) -> Self {
        Self {
            jvm_start,
            converter: DatestampConverter::new(jvm_start),
        }
    }

    /// 원시 줄을 정규화된 줄로 변환합니다.
    pub fn process<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<String>, LogParserError> {
        let mut normalized = Vec::new();
        self.process_batched(lines, usize::MAX, |batch| {
            normalized.extend(batch);
            Ok(())
        })?;
        Ok(normalized)
    }

    /// 원시 줄을 정규화하며 완성된 줄을 `batch_size` 단위로 `sink`에 넘깁니다.
    ///
    /// 마지막 배치는 더 작을 수 있습니다. 배치를 나누어도 출력 순서와 내용은
    /// [`process`](Self::process)와 같습니다.
    pub fn process_batched<S, F>(
        &self,
        lines: &[S],
        batch_size: usize,
        mut sink: F,
    ) -> Result<PreprocessStats, LogParserError>
    where
        S: AsRef<str>,
        F: FnMut(Vec<String>) -> Result<(), LogParserError>,
    {
        self.check_jvm_start(lines)?;

        let mut stats = PreprocessStats {
            lines_read: lines.len(),
            ..PreprocessStats::default()
        };
        counter!(PREPROCESS_LINES_READ_TOTAL).increment(lines.len() as u64);

        let cleaned = self.clean(lines, &mut stats)?;
        let mut buffer = LineBuffer::new();

        for (idx, current) in cleaned.iter().enumerate() {
            let window = Window {
                prior: idx.checked_sub(1).map(|i| cleaned[i].as_str()),
                current,
                next: cleaned.get(idx + 1).map(String::as_str),
                open: buffer.is_open(),
            };

            match first_match(&window) {
                Some((action, outcome)) => {
                    record(action, &outcome, &mut stats);
                    apply(&mut buffer, outcome);
                }
                None => buffer.emit(current.clone()),
            }

            if buffer.completed() >= batch_size {
                let batch = buffer.take_completed();
                stats.emitted += batch.len();
                sink(batch)?;
            }
        }

        let rest = buffer.finish();
        if !rest.is_empty() {
            stats.emitted += rest.len();
            sink(rest)?;
        }

        info!(
            lines_read = stats.lines_read,
            discarded = stats.discarded,
            merged = stats.merged,
            emitted = stats.emitted,
            "preprocessing complete"
        );
        Ok(stats)
    }

    /// datestamp만 있는 줄이 있는데 시작 시각이 없으면 첫 줄 번호로 실패합니다.
    fn check_jvm_start<S: AsRef<str>>(&self, lines: &[S]) -> Result<(), LogParserError> {
        if self.jvm_start.is_some() {
            return Ok(());
        }
        match lines.iter().position(|line| {
            let line = line.as_ref();
            !noise::is_noise(line) && DatestampConverter::needs_jvm_start(line)
        }) {
            Some(idx) => Err(LogParserError::MissingJvmStart { line: idx + 1 }),
            None => Ok(()),
        }
    }

    /// 노이즈를 버리고 datestamp를 정규화합니다.
    fn clean<S: AsRef<str>>(
        &self,
        lines: &[S],
        stats: &mut PreprocessStats,
    ) -> Result<Vec<String>, LogParserError> {
        let mut cleaned = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            if noise::is_noise(line) {
                stats.discarded += 1;
                counter!(PREPROCESS_LINES_DISCARDED_TOTAL, LABEL_ACTION => "noise").increment(1);
                continue;
            }
            cleaned.push(self.converter.convert(line, idx + 1)?.into_owned());
        }
        Ok(cleaned)
    }
}

fn apply(buffer: &mut LineBuffer, outcome: Outcome) {
    match outcome {
        Outcome::Discard => {}
        Outcome::Append(text) => buffer.append(&text),
        Outcome::Terminate(text) => buffer.terminate(&text),
        Outcome::AppendDeferring { open, deferred } => {
            buffer.append(&open);
            buffer.defer(deferred);
        }
        Outcome::CompleteThenAppend { complete, open } => {
            buffer.emit(complete);
            buffer.append(&open);
        }
        Outcome::Complete(lines) => {
            for line in lines {
                buffer.emit(line);
            }
        }
    }
}

fn record(action: PreprocessAction, outcome: &Outcome, stats: &mut PreprocessStats) {
    match outcome {
        Outcome::Discard => {
            stats.discarded += 1;
            counter!(PREPROCESS_LINES_DISCARDED_TOTAL, LABEL_ACTION => action.name()).increment(1);
        }
        Outcome::Append(_)
        | Outcome::Terminate(_)
        | Outcome::AppendDeferring { .. }
        | Outcome::CompleteThenAppend { .. } => {
            stats.merged += 1;
            counter!(PREPROCESS_LINES_MERGED_TOTAL, LABEL_ACTION => action.name()).increment(1);
        }
        Outcome::Complete(_) => {
            debug!(action = action.name(), "line rewritten");
        }
    }
}
