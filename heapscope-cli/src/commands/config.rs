//! `heapscope config` command handler and configuration loading

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use heapscope_core::config::HeapscopeConfig;
use heapscope_core::error::{ConfigError, HeapscopeError};

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const SECTIONS: [&str; 4] = ["general", "preprocess", "parser", "analysis"];

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A TOML file on disk.
    File(PathBuf),
    /// No file: built-in defaults plus env overrides.
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("(defaults)"),
        }
    }
}

/// Load the effective configuration.
///
/// An explicit `--config` path must exist. Without one, `heapscope.toml` in the
/// working directory is used when present and built-in defaults otherwise.
/// Environment overrides are applied in both cases.
pub async fn load_config(
    explicit: Option<&Path>,
) -> (ConfigSource, Result<HeapscopeConfig, CliError>) {
    if let Some(path) = explicit {
        let source = ConfigSource::File(path.to_path_buf());
        return (source, HeapscopeConfig::load(path).await.map_err(CliError::from));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    match HeapscopeConfig::load(&default_path).await {
        Err(HeapscopeError::Config(ConfigError::FileNotFound { .. })) => {
            debug!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
            let mut config = HeapscopeConfig::default();
            config.apply_env_overrides();
            let result = config.validate().map(|()| config).map_err(CliError::from);
            (ConfigSource::Defaults, result)
        }
        result => (
            ConfigSource::File(default_path),
            result.map_err(CliError::from),
        ),
    }
}

/// Execute the `config` command.
pub fn execute(
    args: ConfigArgs,
    source: &ConfigSource,
    loaded: Result<HeapscopeConfig, CliError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(source, loaded, writer),
        ConfigAction::Show { section } => execute_show(source, loaded?, section, writer),
    }
}

/// Report whether the configuration loaded and validated.
///
/// # Errors
///
/// Returns `CliError::Config` after rendering the report when the configuration is invalid.
fn execute_validate(
    source: &ConfigSource,
    loaded: Result<HeapscopeConfig, CliError>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(source = %source, "validating configuration");

    let report = ConfigValidationReport {
        source: source.to_string(),
        valid: loaded.is_ok(),
        errors: loaded.err().map(|e| e.to_string()).into_iter().collect(),
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

fn execute_show(
    source: &ConfigSource,
    config: HeapscopeConfig,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = build_config_report(source, &config, section.as_deref())?;
    writer.render(&report)
}

/// Serialize the whole configuration or one section of it.
///
/// # Errors
///
/// Returns `CliError::Command` if the section name is unknown.
pub fn build_config_report(
    source: &ConfigSource,
    config: &HeapscopeConfig,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let serialized = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("preprocess") => toml::to_string_pretty(&config.preprocess),
        Some("parser") => toml::to_string_pretty(&config.parser),
        Some("analysis") => toml::to_string_pretty(&config.analysis),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: {})",
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        source: source.to_string(),
        section: section.map(str::to_owned),
        config_toml: serialized.unwrap_or_else(|e| format!("(serialization error: {e})")),
        config: config.clone(),
    })
}

/// Configuration display report.
///
/// JSON output carries the structured configuration; text output the TOML form.
#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
    pub config: HeapscopeConfig,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.section {
            Some(section) => writeln!(
                w,
                "Configuration {} (source: {})",
                format!("[{section}]").bold(),
                self.source
            )?,
            None => writeln!(w, "Configuration (source: {})", self.source.bold())?,
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    /// Empty when valid.
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(payload: &impl Render) -> String {
        let mut buffer = Vec::new();
        payload
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_config_report_full_config() {
        let report = build_config_report(
            &ConfigSource::Defaults,
            &HeapscopeConfig::default(),
            None,
        )
        .expect("full config should serialize");

        let output = render(&report);
        assert!(output.contains("(defaults)"));
        assert!(output.contains("[analysis]"));
        assert!(output.contains("throughput_threshold = 90"));
    }

    #[test]
    fn test_config_report_single_section() {
        let source = ConfigSource::File(PathBuf::from("heapscope.toml"));
        let report = build_config_report(&source, &HeapscopeConfig::default(), Some("parser"))
            .expect("parser section should serialize");

        let output = render(&report);
        assert!(output.contains("[parser]"));
        assert!(output.contains("max_unidentified_lines = 1000"));
        assert!(!output.contains("throughput_threshold"));
    }

    #[test]
    fn test_config_report_unknown_section() {
        let result =
            build_config_report(&ConfigSource::Defaults, &HeapscopeConfig::default(), Some("ebpf"));
        match result {
            Err(CliError::Command(msg)) => assert!(msg.contains("unknown section: ebpf")),
            _ => panic!("expected Command error"),
        }
    }

    #[test]
    fn test_config_report_json_has_structured_config() {
        let report = build_config_report(
            &ConfigSource::Defaults,
            &HeapscopeConfig::default(),
            Some("analysis"),
        )
        .expect("should build");
        let json = serde_json::to_value(&report).expect("should serialize");
        assert_eq!(json["section"], "analysis");
        assert_eq!(json["config"]["analysis"]["throughput_threshold"], 90);
        assert!(json.get("config_toml").is_none());
    }

    #[test]
    fn test_validation_report_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'general.log_level'".to_owned()],
        };
        let output = render(&report);
        assert!(output.contains("INVALID"));
        assert!(output.contains("general.log_level"));
    }

    #[test]
    fn test_execute_validate_reports_load_failure() {
        let writer = OutputWriter::new(crate::cli::OutputFormat::Json);
        let loaded = Err(CliError::Config("boom".to_owned()));
        let result = execute_validate(&ConfigSource::Defaults, loaded, &writer);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[tokio::test]
    async fn test_load_config_explicit_missing_file() {
        let (source, result) = load_config(Some(Path::new("/nonexistent/heapscope.toml"))).await;
        assert_eq!(
            source,
            ConfigSource::File(PathBuf::from("/nonexistent/heapscope.toml"))
        );
        let err = result.expect_err("missing explicit config should fail");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_load_config_explicit_file() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let path = dir.path().join("heapscope.toml");
        std::fs::write(&path, "[analysis]\nthroughput_threshold = 75\n").expect("should write");

        let (_, result) = load_config(Some(&path)).await;
        let config = result.expect("valid config should load");
        assert_eq!(config.analysis.throughput_threshold, 75);
    }
}
