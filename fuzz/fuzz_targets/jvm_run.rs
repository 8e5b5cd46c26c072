#![no_main]

use heapscope_analyzer::build_run;
use heapscope_core::config::AnalysisConfig;
use heapscope_log_parser::{GcLogPipeline, PipelineConfig, split_lines};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(pipeline) = GcLogPipeline::new(PipelineConfig::default()) else {
        return;
    };
    let lines = split_lines(&String::from_utf8_lossy(data));
    let Ok(outcome) = pipeline.run(&lines) else {
        return;
    };

    let run = build_run(outcome.events, None, &AnalysisConfig::default())
        .expect("default analysis config is valid");
    assert!(run.throughput <= 100);
    assert!(run.max_pause <= run.total_pause);
});
