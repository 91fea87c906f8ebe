//! Errors raised while planning or building testsets.

use std::io;

use camino::Utf8PathBuf;
use relaxroute_core::{CollaboratorError, LabelError, TestsetLabel, TestsetPairError};
use thiserror::Error;

/// Failures that abort the run before any pipeline stage starts.
#[derive(Debug, Error)]
pub enum TestsetError {
    /// An input file does not exist.
    #[error("input file {path:?} does not exist")]
    MissingInput {
        /// Path given on the command line.
        path: Utf8PathBuf,
    },
    /// No label can be derived from an input path.
    #[error(transparent)]
    Label(#[from] LabelError),
    /// Two inputs share a base file name.
    #[error("testset {label} repeats: {first:?} and {second:?}")]
    DuplicateLabel {
        /// Clashing label.
        label: TestsetLabel,
        /// Input that claimed the label first.
        first: Utf8PathBuf,
        /// Input that repeated it.
        second: Utf8PathBuf,
    },
    /// A working directory could not be created.
    #[error("failed to create testset directory {path:?}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A tabular input could not be copied into the run.
    #[error("failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        /// Input file.
        from: Utf8PathBuf,
        /// Ground-truth destination.
        to: Utf8PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The free-form converter failed.
    #[error("failed to convert {path:?} into a tabular testset: {source}")]
    Convert {
        /// Free-form input file.
        path: Utf8PathBuf,
        /// Converter failure.
        #[source]
        source: CollaboratorError,
    },
    /// The ground-truth testset could not be read.
    #[error("failed to read testset {path:?}: {source}")]
    Read {
        /// Ground-truth CSV file.
        path: Utf8PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
    /// The relaxed testset could not be written.
    #[error("failed to write testset {path:?}: {source}")]
    Write {
        /// Relaxed CSV file.
        path: Utf8PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
    /// A request identifier appears more than once in one testset.
    #[error("testset {path:?} repeats request id {id:?}")]
    DuplicateId {
        /// Ground-truth CSV file.
        path: Utf8PathBuf,
        /// Repeated identifier.
        id: String,
    },
    /// The two forms could not be paired.
    #[error(transparent)]
    Pair(#[from] TestsetPairError),
}
