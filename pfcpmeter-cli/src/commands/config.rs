//! `pfcpmeter config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use pfcpmeter_core::config::PfcpmeterConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const SECTIONS: [&str; 6] = ["general", "window", "label", "capture", "output", "batch"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if the file is missing, unparsable or holds invalid values.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match PfcpmeterConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
///
/// A missing file is not an error here: the defaults are shown instead.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` for an unknown section.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let source = if tokio::fs::try_exists(config_path).await.unwrap_or(false) {
        config_path.display().to_string()
    } else {
        "(defaults)".to_owned()
    };
    let config = PfcpmeterConfig::load_or_default(config_path).await?;
    let report = build_report(&config, source, section)?;

    writer.render(&report)
}

fn build_report(
    config: &PfcpmeterConfig,
    source: String,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let serialized = match section.as_deref() {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("window") => toml::to_string_pretty(&config.window),
        Some("label") => toml::to_string_pretty(&config.label),
        Some("capture") => toml::to_string_pretty(&config.capture),
        Some("output") => toml::to_string_pretty(&config.output),
        Some("batch") => toml::to_string_pretty(&config.batch),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    let config_toml = serialized
        .map_err(|e| CliError::Command(format!("failed to serialize configuration: {}", e)))?;

    Ok(ConfigReport {
        source,
        section,
        config_toml,
    })
}

/// Effective configuration, whole or one section.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path, or `(defaults)` when no file exists
    pub source: String,
    /// Section shown (`None` = all)
    pub section: Option<String>,
    /// Serialized TOML
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match self.section {
            Some(ref section) => {
                let section_label = format!("[{}]", section);
                writeln!(
                    w,
                    "Configuration {} (source: {})",
                    section_label.bold(),
                    self.source
                )?;
            }
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
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
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

    fn render(report: &impl Render) -> String {
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_build_report_full_config() {
        let report = build_report(&PfcpmeterConfig::default(), "test.toml".to_owned(), None)
            .expect("default config should serialize");

        assert!(report.section.is_none());
        for section in SECTIONS {
            assert!(
                report.config_toml.contains(&format!("[{}]", section)),
                "should contain [{}]",
                section
            );
        }
    }

    #[test]
    fn test_build_report_single_section() {
        let report = build_report(
            &PfcpmeterConfig::default(),
            "test.toml".to_owned(),
            Some("window".to_owned()),
        )
        .expect("window section should serialize");

        assert!(report.config_toml.contains("interval = 120.0"));
        assert!(!report.config_toml.contains("tshark_path"));
    }

    #[test]
    fn test_build_report_unknown_section() {
        let err = build_report(
            &PfcpmeterConfig::default(),
            "test.toml".to_owned(),
            Some("ebpf".to_owned()),
        )
        .err()
        .expect("unknown section should fail");

        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("unknown section: ebpf"));
    }

    #[test]
    fn test_config_report_render_text_specific_section() {
        let report = ConfigReport {
            source: "/etc/pfcpmeter.toml".to_owned(),
            section: Some("label".to_owned()),
            config_toml: "normal_threshold = 0.8\n".to_owned(),
        };

        let output = render(&report);
        assert!(output.contains("[label]"), "should show section name");
        assert!(output.contains("/etc/pfcpmeter.toml"));
        assert!(output.contains("normal_threshold"));
    }

    #[test]
    fn test_validation_report_render_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["invalid value for 'window.interval'".to_owned()],
        };

        let output = render(&report);
        assert!(output.contains("INVALID"));
        assert!(output.contains("window.interval"));
    }

    #[test]
    fn test_validation_report_json_shape() {
        let report = ConfigValidationReport {
            source: "ok.toml".to_owned(),
            valid: true,
            errors: Vec::new(),
        };

        let json = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(json["valid"], true);
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));
    }
}
