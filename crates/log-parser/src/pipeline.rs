//! 파이프라인 오케스트레이션 -- 전처리와 파싱의 전체 흐름을 관리합니다.
//!
//! 기본 경로는 단일 스레드 배치 처리입니다 ([`GcLogPipeline::run`]).
//! [`GcLogPipeline::run_staged`]는 두 단계를 별도의 blocking 태스크로 나누고
//! bounded 채널로 연결하여, 전처리가 끝나기 전에 이벤트를 흘려보냅니다.
//! 두 경로의 결과는 같습니다.
//!
//! # 내부 아키텍처
//! ```text
//! raw lines -> Preprocessor -> mpsc<Vec<String>> -> EventRegistry -> mpsc<GcEvent> -> caller
//!              (spawn_blocking)                    (spawn_blocking)
//! ```

use std::time::Instant;

use heapscope_core::event::{EventType, GcEvent};
use heapscope_core::metrics::PIPELINE_RUN_DURATION_SECONDS;
use heapscope_core::pipeline::EventParser;
use metrics::histogram;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::LogParserError;
use crate::parser::{EventRegistry, ParseOutcome, record_event};
use crate::preprocess::{PreprocessStats, Preprocessor};

/// 단계별 실행 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagedSummary {
    /// 전처리 통계
    pub preprocess: PreprocessStats,
    /// 전달한 이벤트 수 (UNKNOWN 포함)
    pub events: usize,
    /// 인식하지 못한 줄 수
    pub unidentified: usize,
}

/// GC 로그 전처리/파싱 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use heapscope_log_parser::{GcLogPipeline, PipelineConfig};
///
/// let pipeline = GcLogPipeline::new(PipelineConfig::default())?;
/// let outcome = pipeline.run(&lines)?;
/// println!("{} events", outcome.events.len());
/// ```
#[derive(Debug, Clone)]
pub struct GcLogPipeline {
    config: PipelineConfig,
    preprocessor: Preprocessor,
}

impl GcLogPipeline {
    /// 검증된 설정으로 파이프라인을 생성합니다.
    pub fn new(config: PipelineConfig) -> Result<Self, LogParserError> {
        config.validate()?;
        let preprocessor = Preprocessor::new(config.jvm_start);
        Ok(Self {
            config,
            preprocessor,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 전처리만 수행합니다.
    pub fn preprocess<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<String>, LogParserError> {
        self.preprocessor.process(lines)
    }

    /// 원시 줄을 전처리하고 파싱합니다 (단일 스레드).
    pub fn run<S: AsRef<str>>(&self, lines: &[S]) -> Result<ParseOutcome, LogParserError> {
        let started = Instant::now();

        let normalized = self.preprocessor.process(lines)?;
        let outcome =
            EventRegistry::global().parse_lines(&normalized, self.config.max_unidentified_lines);

        histogram!(PIPELINE_RUN_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        info!(
            lines = lines.len(),
            events = outcome.events.len(),
            unidentified = outcome.unidentified_count,
            "gc log parsed"
        );
        Ok(outcome)
    }

    /// 전처리와 파싱을 별도 태스크에서 실행하고 이벤트를 `events_tx`로 보냅니다.
    ///
    /// 호출자는 반환을 기다리는 동안 `events_tx`의 수신측을 소비해야 합니다.
    /// 수신측이 닫히면 [`LogParserError::Channel`]로 끝납니다.
    pub async fn run_staged(
        &self,
        lines: Vec<String>,
        events_tx: mpsc::Sender<GcEvent>,
    ) -> Result<StagedSummary, LogParserError> {
        let started = Instant::now();
        let (batch_tx, mut batch_rx) = mpsc::channel::<Vec<String>>(self.config.channel_capacity);

        let preprocessor = self.preprocessor;
        let batch_size = self.config.batch_size;
        let preprocess = tokio::task::spawn_blocking(move || {
            preprocessor.process_batched(&lines, batch_size, |batch| {
                batch_tx
                    .blocking_send(batch)
                    .map_err(|e| LogParserError::Channel(format!("normalized lines: {e}")))
            })
        });

        let parse = tokio::task::spawn_blocking(move || {
            let registry = EventRegistry::global();
            let mut events = 0usize;
            let mut unidentified = 0usize;
            while let Some(batch) = batch_rx.blocking_recv() {
                debug!(lines = batch.len(), "parsing normalized batch");
                for line in &batch {
                    let event = registry.parse_line(line);
                    record_event(&event);
                    if event.event_type == EventType::Unknown {
                        unidentified += 1;
                    }
                    events += 1;
                    events_tx
                        .blocking_send(event)
                        .map_err(|e| LogParserError::Channel(format!("events: {e}")))?;
                }
            }
            Ok::<_, LogParserError>((events, unidentified))
        });

        let (preprocessed, parsed) = tokio::join!(preprocess, parse);
        let preprocess = preprocessed
            .map_err(|e| LogParserError::Stage(format!("preprocess task: {e}")))??;
        let (events, unidentified) =
            parsed.map_err(|e| LogParserError::Stage(format!("parse task: {e}")))??;

        histogram!(PIPELINE_RUN_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        info!(events, unidentified, "staged gc log run complete");
        Ok(StagedSummary {
            preprocess,
            events,
            unidentified,
        })
    }
}
