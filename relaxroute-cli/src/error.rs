//! Error types emitted by the relaxroute CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use relaxroute_core::FormLabelError;
use relaxroute_data::{TestsetError, ToolCommandError};
use thiserror::Error;

/// Errors emitted by the relaxroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The backend host is not an absolute URL.
    #[error("host {host:?} is not an absolute URL: {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },
    /// The fetch concurrency must be at least one.
    #[error("threads must be at least 1")]
    InvalidThreads,
    /// The form labels cannot name the run's directories.
    #[error(transparent)]
    InvalidLabels(#[from] FormLabelError),
    /// A collaborator command line is unusable.
    #[error("invalid --{field}: {source}")]
    InvalidTool {
        field: &'static str,
        #[source]
        source: ToolCommandError,
    },
    /// Logging could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
    /// The output directory is left over from an earlier run.
    #[error("output directory {path:?} already exists")]
    OutputExists { path: Utf8PathBuf },
    /// The output directory could not be created.
    #[error("failed to create output directory {path:?}: {source}")]
    CreateOutput {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Planning or building the testsets failed.
    #[error(transparent)]
    Testset(#[from] TestsetError),
    /// The run summary file could not be created.
    #[error("failed to create run summary {path:?}: {source}")]
    CreateSummary {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The run summary could not be written.
    #[error("failed to write run summary {path:?}: {source}")]
    WriteSummary {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// At least one testset stopped before its report was produced.
    #[error("testsets failed: {labels} (see {summary:?})")]
    LabelsFailed {
        labels: String,
        summary: Utf8PathBuf,
    },
}
