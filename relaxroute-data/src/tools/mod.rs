//! Collaborators backed by external command-line tools.
//!
//! Each adapter runs one configured [`ToolCommand`] per call and waits for it
//! to exit. Standard output is captured so the extractor and report tools can
//! report their record counts on their last non-empty line; standard error
//! is passed through to the terminal.
//!
//! A tool fails the call when it cannot be started, exits unsuccessfully,
//! reports no parsable count, or leaves its output artifact unwritten.

mod adapters;


use std::fmt;
use std::process::{Command, Stdio};
use std::str::FromStr;

use camino::Utf8Path;
use log::debug;
use relaxroute_core::CollaboratorError;
use thiserror::Error;

pub use adapters::{CommandConverter, CommandExtractor, CommandFetcher, CommandReporter};

/// Default free-form converter command.
pub const DEFAULT_CONVERT_TOOL: &str = "freeform-to-csv";
/// Default route fetcher command.
pub const DEFAULT_FETCH_TOOL: &str = "fetch-routes";
/// Default response extractor command.
pub const DEFAULT_EXTRACT_TOOL: &str = "convert-to-csv";
/// Default report generator command.
pub const DEFAULT_REPORT_TOOL: &str = "produce-report";

/// Errors raised when parsing a tool command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCommandError {
    /// The command line names no program.
    #[error("tool command is empty")]
    Empty,
}

/// A program plus the leading arguments placed before the stage's own.
///
/// # Examples
///
/// ```
/// use relaxroute_data::ToolCommand;
///
/// let tool: ToolCommand = "python3 -m rq.fetch_routes".parse()?;
/// assert_eq!(tool.program(), "python3");
/// assert_eq!(tool.args(), ["-m", "rq.fetch_routes"]);
/// # Ok::<(), relaxroute_data::ToolCommandError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    /// A tool run without leading arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append leading arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Leading arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the tool with `stage_args` appended and return its standard
    /// output.
    fn run(&self, stage_args: &[String]) -> Result<String, CollaboratorError> {
        debug!("Running {self}");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(stage_args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| CollaboratorError::Launch {
                tool: self.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed {
                tool: self.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Read the count a tool printed on its last non-empty output line.
    fn parse_count(&self, stdout: &str) -> Result<usize, CollaboratorError> {
        let line = stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .unwrap_or_default();
        line.parse().map_err(|_| CollaboratorError::MissingCount {
            tool: self.to_string(),
            line: line.to_owned(),
        })
    }

    /// Fail unless the tool left a file at `path`.
    fn require_artifact(&self, path: &Utf8Path) -> Result<(), CollaboratorError> {
        if matches!(relaxroute_fs::file_is_file(path), Ok(true)) {
            Ok(())
        } else {
            Err(CollaboratorError::MissingArtifact {
                tool: self.to_string(),
                path: path.to_path_buf(),
            })
        }
    }
}

impl FromStr for ToolCommand {
    type Err = ToolCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let program = words.next().ok_or(ToolCommandError::Empty)?;
        Ok(Self::new(program).with_args(words))
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
