//! `heapscope analyze` command handler
//!
//! Runs the staged pipeline (preprocess -> parse) and aggregates events into a
//! [`RunStore`] concurrently, then renders the [`JvmRun`] snapshot.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use heapscope_analyzer::{BottleneckEntry, JvmRun, RunStore};
use heapscope_core::config::HeapscopeConfig;
use heapscope_core::event::GcEvent;
use heapscope_core::pipeline::EventSink;
use heapscope_core::units::{Memory, format_secs};
use heapscope_log_parser::{GcLogPipeline, read_log_lines};

use crate::cli::AnalyzeArgs;
use crate::commands::preprocess::pipeline_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, format_millis};

/// Parsed events buffered between the parse stage and the aggregator.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Execute the `analyze` command.
pub async fn execute(
    args: AnalyzeArgs,
    config: &HeapscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = analyze_file(&args, config).await?;
    writer.render(&report)
}

/// Read, parse and aggregate one GC log.
///
/// An empty file yields a valid run with no events.
///
/// # Errors
///
/// - I/O failure reading the log (exit code 10)
/// - datestamp-only lines without a JVM start (exit code 2)
/// - invalid analysis settings (exit code 2)
pub async fn analyze_file(
    args: &AnalyzeArgs,
    config: &HeapscopeConfig,
) -> Result<AnalyzeReport, CliError> {
    let pipeline = GcLogPipeline::new(pipeline_config(config, args.jvm_start.clone())?)?;
    let mut analysis = config.analysis.clone();
    if let Some(threshold) = args.threshold {
        analysis.throughput_threshold = threshold;
    }

    let lines = read_log_lines(&args.file).await?;

    let store = Arc::new(RunStore::new(pipeline.config().max_unidentified_lines));
    let (events_tx, mut events_rx) = mpsc::channel::<GcEvent>(EVENT_CHANNEL_CAPACITY);
    let sink = Arc::clone(&store);
    let aggregator = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            sink.accept(event);
        }
    });

    // 실패해도 송신측이 닫히므로 집계 태스크는 항상 끝남
    let staged = pipeline.run_staged(lines, events_tx).await;
    aggregator
        .await
        .map_err(|e| CliError::Command(format!("aggregation task failed: {e}")))?;
    let summary = staged?;

    let run = JvmRun::from_store(&store, args.jvm_options.as_deref(), &analysis)?;
    info!(
        file = %args.file.display(),
        events = summary.events,
        unidentified = summary.unidentified,
        "gc log analyzed"
    );

    Ok(AnalyzeReport {
        source: args.file.display().to_string(),
        lines_read: summary.preprocess.lines_read,
        lines_discarded: summary.preprocess.discarded,
        lines_merged: summary.preprocess.merged,
        throughput_threshold: analysis.throughput_threshold,
        run,
        show_unidentified: args.show_unidentified,
    })
}

/// Analysis result for one log file.
#[derive(Serialize)]
pub struct AnalyzeReport {
    pub source: String,
    pub lines_read: usize,
    pub lines_discarded: usize,
    pub lines_merged: usize,
    pub throughput_threshold: u32,
    #[serde(flatten)]
    pub run: JvmRun,
    #[serde(skip)]
    pub show_unidentified: bool,
}

fn memory_or_dash(memory: Option<Memory>) -> String {
    memory.map_or_else(|| "-".to_owned(), |m| m.to_string())
}

fn timestamp_or_dash(timestamp: Option<u64>) -> String {
    timestamp.map_or_else(|| "-".to_owned(), |ts| format!("{}s", format_secs(ts)))
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let run = &self.run;
        writeln!(w, "GC Log: {}", self.source.bold())?;
        writeln!(
            w,
            "  Lines: {} read, {} discarded, {} merged",
            self.lines_read, self.lines_discarded, self.lines_merged
        )?;

        let collectors: Vec<String> = run.collectors.iter().map(ToString::to_string).collect();
        writeln!(
            w,
            "  Collectors: {}",
            if collectors.is_empty() {
                "-".to_owned()
            } else {
                collectors.join(", ")
            }
        )?;
        if let Some(version) = &run.jvm_version {
            writeln!(w, "  JVM: {version}")?;
        }
        if let Some(memory) = run.physical_memory {
            writeln!(w, "  Physical memory: {memory}")?;
        }
        if let Some(options) = &run.jvm_options {
            writeln!(w, "  Options: {options}")?;
        }
        writeln!(
            w,
            "  Timeline: {} .. {}",
            timestamp_or_dash(run.first_timestamp),
            timestamp_or_dash(run.last_timestamp)
        )?;

        writeln!(w)?;
        writeln!(w, "{}", "Pauses".bold())?;
        writeln!(w, "  Blocking events: {}", run.blocking_event_count)?;
        writeln!(w, "  Max pause: {}", format_millis(run.max_pause))?;
        writeln!(w, "  Total pause: {}", format_millis(run.total_pause))?;
        let throughput = format!("{}%", run.throughput);
        let throughput = if run.throughput < u64::from(self.throughput_threshold) {
            throughput.red().bold()
        } else {
            throughput.green()
        };
        writeln!(w, "  Throughput: {throughput}")?;

        writeln!(w)?;
        writeln!(w, "{}", "Memory".bold())?;
        writeln!(
            w,
            "  Heap: max occupancy {}, max after GC {}, max space {}",
            memory_or_dash(run.max_heap_occupancy),
            memory_or_dash(run.max_heap_after_gc),
            memory_or_dash(run.max_heap_space)
        )?;
        writeln!(
            w,
            "  Perm/Metaspace: max occupancy {}, max space {}",
            memory_or_dash(run.max_perm_occupancy),
            memory_or_dash(run.max_perm_space)
        )?;

        if !run.bottlenecks.is_empty() {
            writeln!(w)?;
            writeln!(
                w,
                "{} (throughput < {}%)",
                "Bottlenecks".bold(),
                self.throughput_threshold
            )?;
            for entry in &run.bottlenecks {
                match entry {
                    BottleneckEntry::Event(event) => writeln!(
                        w,
                        "  {:>12}s  {:<40} {}",
                        format_secs(event.timestamp),
                        event.event_type.to_string(),
                        format_millis(event.duration)
                    )?,
                    BottleneckEntry::Ellipsis => writeln!(w, "  {:>12}", "...")?,
                }
            }
        }

        if !run.safepoint_metrics.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", "Safepoints".bold())?;
            writeln!(w, "  {:<32} {:>8} {:>12} {:>12}", "TRIGGER", "COUNT", "TOTAL", "MAX")?;
            for summary in &run.safepoint_metrics {
                writeln!(
                    w,
                    "  {:<32} {:>8} {:>12} {:>12}",
                    summary.trigger.to_string(),
                    summary.count,
                    format_millis(summary.total_millis()),
                    format_millis(summary.max_millis())
                )?;
            }
        }

        if run.stopped_time.count > 0 {
            writeln!(w)?;
            writeln!(w, "{}", "Stopped Time".bold())?;
            writeln!(
                w,
                "  {} stops, total {}, max {}",
                run.stopped_time.count,
                format_millis(run.stopped_time.total_millis()),
                format_millis(run.stopped_time.max_millis())
            )?;
        }

        writeln!(w)?;
        writeln!(w, "{}", "Analysis".bold())?;
        if run.analysis.is_empty() {
            writeln!(w, "  {}", "no issues found".green())?;
        }
        for key in &run.analysis {
            let key_text = key.key();
            let colored_key = if key_text.starts_with("error.") {
                key_text.red().bold()
            } else if key_text.starts_with("warn.") {
                key_text.yellow()
            } else {
                key_text.cyan()
            };
            writeln!(w, "  {colored_key}")?;
        }

        if run.unidentified_count > 0 {
            writeln!(w)?;
            writeln!(
                w,
                "{}: {}",
                "Unidentified lines".bold(),
                run.unidentified_count.to_string().yellow()
            )?;
            if self.show_unidentified {
                for line in &run.unidentified_lines {
                    writeln!(w, "  {:>12}s  {}", format_secs(line.timestamp), line.line)?;
                }
                let hidden = run.unidentified_count - run.unidentified_lines.len();
                if hidden > 0 {
                    writeln!(w, "  ... {hidden} more not retained")?;
                }
            }
        }

        Ok(())
    }
}
