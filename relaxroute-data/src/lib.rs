//! Tabular testset I/O and the external-tool collaborators.
//!
//! Responsibilities:
//! - Plan testsets from input files and reject missing or clashing inputs.
//! - Write the ground-truth and relaxed CSV forms of every testset.
//! - Drive the converter, fetcher, extractor and report tools as child
//!   processes behind the `relaxroute-core` collaborator traits.
//!
//! Boundaries:
//! - Relaxation rules and pipeline sequencing live in `relaxroute-core`.
//! - The tools' own behaviour (HTTP, response parsing, diffing) is opaque.

#![forbid(unsafe_code)]

pub mod testset;
pub mod tools;

pub use testset::{InputFormat, PlannedTestset, TestsetBuilder, TestsetError, plan_testsets};
pub use tools::{
    CommandConverter, CommandExtractor, CommandFetcher, CommandReporter, DEFAULT_CONVERT_TOOL,
    DEFAULT_EXTRACT_TOOL, DEFAULT_FETCH_TOOL, DEFAULT_REPORT_TOOL, ToolCommand, ToolCommandError,
};
