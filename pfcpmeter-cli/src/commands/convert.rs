//! `pfcpmeter convert` command handler

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pfcpmeter_core::config::PfcpmeterConfig;
use pfcpmeter_dataset::{
    BatchReport, BatchRunner, DatasetConfig, DatasetPipelineBuilder, DecodedCsvExtractor,
};

use crate::cli::ConvertArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `convert` command.
///
/// A file input is converted on its own; a directory input converts every
/// capture in it whose extension matches `capture.extensions`.
///
/// # Errors
///
/// Returns `CliError::CapturesFailed` when at least one capture failed. The
/// datasets of the other captures are still written.
pub async fn execute(
    args: ConvertArgs,
    mut config: PfcpmeterConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    let dataset_config = DatasetConfig::from_core(&config)?;
    let interval = dataset_config.interval;
    let output_dir = dataset_config.output_dir.clone();

    let mut builder = DatasetPipelineBuilder::new().config(dataset_config);
    if args.decoded {
        builder = builder.extractor(Arc::new(DecodedCsvExtractor::new()));
    }
    let pipeline = Arc::new(builder.build()?);

    let metadata = tokio::fs::metadata(&args.input).await.map_err(|e| {
        CliError::Command(format!("cannot read input {}: {}", args.input.display(), e))
    })?;

    let cancel = CancellationToken::new();
    let signal_guard = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling conversion");
            signal_guard.cancel();
        }
    });

    info!(
        input = %args.input.display(),
        output_dir = %output_dir.display(),
        interval,
        extractor = pipeline.extractor_name(),
        "starting conversion"
    );

    let runner = BatchRunner::new(pipeline).cancel_token(cancel);
    let result = if metadata.is_dir() {
        runner.run_directory(&args.input).await
    } else {
        Ok(runner.run(vec![args.input.clone()]).await)
    };
    signal_task.abort();
    let batch = result?;

    let report = ConvertReport {
        input: args.input,
        output_dir,
        interval,
        batch,
    };
    writer.render(&report)?;

    if report.batch.has_failures() {
        return Err(CliError::CapturesFailed(report.batch.failed.len()));
    }

    Ok(())
}

/// Command-line flags take precedence over the file and the environment.
fn apply_overrides(config: &mut PfcpmeterConfig, args: &ConvertArgs) {
    if let Some(ref dir) = args.output_dir {
        config.output.directory = dir.display().to_string();
    }
    if let Some(interval) = args.interval {
        config.window.interval = interval;
    }
    if let Some(ref label) = args.label {
        config.label.fixed = Some(label.clone());
    }
    if let Some(ref closure) = args.closure {
        config.window.closure = closure.clone();
    }
    if args.keep_intermediate {
        config.output.keep_intermediate = true;
    }
    if !args.extensions.is_empty() {
        config.capture.extensions = args.extensions.clone();
    }
    if let Some(workers) = args.workers {
        config.batch.workers = workers;
    }
    if let Some(ref tshark) = args.tshark {
        config.capture.tshark_path = tshark.clone();
    }
}

/// Result of one `convert` invocation.
#[derive(Serialize)]
pub struct ConvertReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub interval: f64,
    #[serde(flatten)]
    pub batch: BatchReport,
}

impl Render for ConvertReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Convert: {} -> {} (interval {}s)",
            self.input.display().to_string().bold(),
            self.output_dir.display(),
            self.interval
        )?;
        writeln!(w)?;

        for r in &self.batch.succeeded {
            let labels = r
                .labels
                .iter()
                .map(|(label, count)| format!("{}={}", label, count))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(
                w,
                "  {} {} -> {}",
                "OK".green().bold(),
                file_name(&r.capture),
                r.output.display()
            )?;
            writeln!(
                w,
                "     records: {}  skipped: {}  unknown: {}  windows: {}  [{}]",
                r.records, r.skipped, r.unknown, r.windows, labels
            )?;
            if let Some(ref intermediate) = r.intermediate {
                writeln!(w, "     decoded: {}", intermediate.display())?;
            }
        }

        for f in &self.batch.failed {
            writeln!(
                w,
                "  {} {}: {}",
                "FAILED".red().bold(),
                file_name(&f.capture),
                f.error.red()
            )?;
        }

        writeln!(w)?;
        let summary = format!(
            "{} processed, {} failed",
            self.batch.succeeded.len(),
            self.batch.failed.len()
        );
        if self.batch.has_failures() {
            writeln!(w, "Summary: {}", summary.yellow().bold())?;
        } else {
            writeln!(w, "Summary: {}", summary.bold())?;
        }

        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
