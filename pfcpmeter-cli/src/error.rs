//! CLI-specific error types and exit code mapping

use pfcpmeter_core::error::PfcpmeterError;
use pfcpmeter_dataset::DatasetError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// At least one capture in a conversion run failed.
    #[error("{0} capture(s) failed")]
    CapturesFailed(usize),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from pfcpmeter-core.
    #[error("{0}")]
    Core(#[from] PfcpmeterError),

    /// Wrapped error from the dataset pipeline.
    #[error("{0}")]
    Dataset(#[from] DatasetError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                           |
    /// |------|-----------------------------------|
    /// | 0    | Success                           |
    /// | 1    | General / command error           |
    /// | 2    | Configuration error               |
    /// | 5    | One or more captures failed       |
    /// | 10   | IO error                          |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Core(PfcpmeterError::Config(_))
            | Self::Dataset(DatasetError::Config { .. }) => 2,
            Self::CapturesFailed(_) => 5,
            Self::Io(_) | Self::Core(PfcpmeterError::Io(_)) | Self::Dataset(DatasetError::Io(_)) => {
                10
            }
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Dataset(_) => 1,
        }
    }
}
