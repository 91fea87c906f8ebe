//! Log verbosity and subscriber installation.
//!
//! Library crates log through `log`; the subscriber installed here bridges
//! those records into `tracing-subscriber`'s formatter. `RUST_LOG` wins over
//! the configured verbosity when set.

use clap::ValueEnum;
use relaxroute_core::CRITICAL_TARGET;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::CliError;

/// How much the run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Everything, including per-stage details.
    Debug,
    /// Stage progress and warnings.
    #[default]
    Info,
    /// Failures, mismatches and status lines.
    Error,
    /// Per-testset status lines and the report listing only.
    Critical,
}

impl Verbosity {
    /// Filter directive for this verbosity.
    #[must_use]
    pub fn directive(self) -> String {
        match self {
            Self::Debug => "debug".to_owned(),
            Self::Info => "info".to_owned(),
            Self::Error => "error".to_owned(),
            Self::Critical => format!("off,{CRITICAL_TARGET}=error"),
        }
    }

    /// Level name forwarded to the collaborator tools.
    #[must_use]
    pub const fn tool_level(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// The filter in effect: `RUST_LOG` if set and valid, else this
    /// verbosity.
    pub(crate) fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }
}

/// Install the global subscriber.
pub(crate) fn init(verbosity: Verbosity) -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(verbosity.filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
