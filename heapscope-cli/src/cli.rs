//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "heapscope.toml";

/// heapscope -- JVM garbage collection log analyzer.
///
/// Use `heapscope <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "heapscope", version, about, long_about = None)]
pub struct Cli {
    /// Path to the heapscope.toml configuration file.
    ///
    /// When omitted, `heapscope.toml` is used if present and defaults otherwise.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a GC log and report pauses, bottlenecks and warnings.
    Analyze(AnalyzeArgs),

    /// Print the normalized log (one event per line) without parsing it.
    Preprocess(PreprocessArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- analyze ----

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// GC log file to analyze.
    pub file: PathBuf,

    /// JVM start datestamp (yyyy-MM-dd HH:mm:ss,SSS) for datestamp-only logs.
    #[arg(long)]
    pub jvm_start: Option<String>,

    /// JVM options to check (defaults to the log's "CommandLine flags:" header).
    #[arg(long, allow_hyphen_values = true)]
    pub jvm_options: Option<String>,

    /// Throughput threshold (%) below which adjacent pauses are a bottleneck.
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub threshold: Option<u32>,

    /// Print every unidentified line instead of only the count.
    #[arg(long)]
    pub show_unidentified: bool,
}

// ---- preprocess ----

#[derive(Args, Debug)]
pub struct PreprocessArgs {
    /// GC log file to normalize.
    pub file: PathBuf,

    /// JVM start datestamp (yyyy-MM-dd HH:mm:ss,SSS) for datestamp-only logs.
    #[arg(long)]
    pub jvm_start: Option<String>,
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file.
    Validate,

    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, preprocess, parser, analysis).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_analyze_defaults() {
        let cli = Cli::try_parse_from(["heapscope", "analyze", "gc.log"]).expect("should parse");
        assert!(cli.config.is_none(), "config should default to None");
        assert_eq!(cli.output, OutputFormat::Text);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.file, PathBuf::from("gc.log"));
                assert!(args.jvm_start.is_none());
                assert!(args.jvm_options.is_none());
                assert!(args.threshold.is_none());
                assert!(!args.show_unidentified);
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_all_options() {
        let cli = Cli::try_parse_from([
            "heapscope",
            "analyze",
            "gc.log",
            "--jvm-start",
            "2010-02-26 09:32:11,486",
            "--jvm-options",
            "-Xms1g -Xmx2g",
            "--threshold",
            "80",
            "--output",
            "json",
        ])
        .expect("should parse");
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.jvm_start.as_deref(), Some("2010-02-26 09:32:11,486"));
                assert_eq!(args.jvm_options.as_deref(), Some("-Xms1g -Xmx2g"));
                assert_eq!(args.threshold, Some(80));
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_threshold_out_of_range() {
        let result = Cli::try_parse_from(["heapscope", "analyze", "gc.log", "--threshold", "101"]);
        assert!(result.is_err(), "threshold above 100 should be rejected");
    }

    #[test]
    fn test_cli_parse_analyze_requires_file() {
        let result = Cli::try_parse_from(["heapscope", "analyze"]);
        assert!(result.is_err(), "analyze without a file should fail");
    }

    #[test]
    fn test_cli_parse_preprocess() {
        let cli = Cli::try_parse_from(["heapscope", "preprocess", "gc.log"]).expect("should parse");
        match cli.command {
            Commands::Preprocess(args) => assert_eq!(args.file, PathBuf::from("gc.log")),
            _ => panic!("expected Preprocess command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from([
            "heapscope",
            "--config",
            "custom.toml",
            "config",
            "show",
            "--section",
            "analysis",
        ])
        .expect("should parse");
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("analysis")),
            _ => panic!("expected Config Show command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "heapscope",
            "config",
            "validate",
            "--log-level",
            "debug",
            "--output",
            "json",
        ])
        .expect("global flags should be accepted after the subcommand");
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_cli_parse_invalid_output_format() {
        let result = Cli::try_parse_from(["heapscope", "--output", "yaml", "config", "validate"]);
        assert!(result.is_err(), "unknown output format should fail");
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
