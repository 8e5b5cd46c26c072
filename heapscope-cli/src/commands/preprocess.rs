//! `heapscope preprocess` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use heapscope_core::config::HeapscopeConfig;
use heapscope_log_parser::{GcLogPipeline, PipelineConfig, read_log_lines};

use crate::cli::PreprocessArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `preprocess` command.
pub async fn execute(
    args: PreprocessArgs,
    config: &HeapscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let pipeline = GcLogPipeline::new(pipeline_config(config, args.jvm_start)?)?;

    let raw = read_log_lines(&args.file).await?;
    let lines = pipeline.preprocess(&raw)?;
    info!(
        file = %args.file.display(),
        raw_lines = raw.len(),
        normalized_lines = lines.len(),
        "gc log preprocessed"
    );

    writer.render(&PreprocessReport {
        source: args.file.display().to_string(),
        raw_lines: raw.len(),
        lines,
    })
}

/// Pipeline settings from the configuration, with a `--jvm-start` override.
pub fn pipeline_config(
    config: &HeapscopeConfig,
    jvm_start: Option<String>,
) -> Result<PipelineConfig, CliError> {
    let mut config = config.clone();
    if jvm_start.is_some() {
        config.preprocess.jvm_start = jvm_start;
    }
    Ok(PipelineConfig::from_core(&config)?)
}

/// Normalized log, one event per line.
#[derive(Serialize)]
pub struct PreprocessReport {
    pub source: String,
    pub raw_lines: usize,
    pub lines: Vec<String>,
}

impl Render for PreprocessReport {
    // bare lines only, so the output can be fed back to `analyze`
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for line in &self.lines {
            writeln!(w, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_jvm_start_override() {
        let config = HeapscopeConfig::default();
        let pipeline = pipeline_config(&config, Some("2010-02-26 09:32:11,486".to_owned()))
            .expect("valid jvm start");
        assert!(pipeline.jvm_start.is_some());

        let without = pipeline_config(&config, None).expect("defaults are valid");
        assert!(without.jvm_start.is_none());
    }

    #[test]
    fn test_pipeline_config_invalid_jvm_start_is_config_error() {
        let err = pipeline_config(&HeapscopeConfig::default(), Some("yesterday".to_owned()))
            .expect_err("bad jvm start should fail");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_preprocess_report_text_is_one_line_per_event() {
        let report = PreprocessReport {
            source: "gc.log".to_owned(),
            raw_lines: 3,
            lines: vec!["1.000: a".to_owned(), "2.000: b".to_owned()],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("should render");
        assert_eq!(String::from_utf8(buffer).expect("utf8"), "1.000: a\n2.000: b\n");
    }
}
