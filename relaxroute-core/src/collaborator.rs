//! Interfaces of the external collaborators driven by the pipeline.
//!
//! The pipeline never talks to a routing backend itself. Converting
//! free-form inputs, fetching routes, parsing responses and diffing the two
//! forms are delegated to implementations of the traits below. Each call is
//! synchronous: it returns only once its artifact is complete.

use std::fmt;
use std::io;
use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::artifact::{ExtractedArtifact, ResponseArtifact};
use crate::testset::TestsetArtifact;

/// Connection and request options shared by every backend call.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendOptions {
    /// Base URL of the routing backend.
    pub host: String,
    /// Access token for the backend.
    pub token: String,
    /// Routing profile, e.g. `mapbox/driving-traffic`.
    pub profile: String,
    /// Query parameters applied to every request, in URI form.
    pub default_query: Option<String>,
    /// Request-level parallelism hint for a single fetch.
    pub threads: NonZeroUsize,
}

impl fmt::Debug for BackendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendOptions")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("profile", &self.profile)
            .field("default_query", &self.default_query)
            .field("threads", &self.threads)
            .finish()
    }
}

/// Inputs of a [`RouteFetcher::fetch`] call.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    /// Backend to query.
    pub backend: &'a BackendOptions,
    /// Testset whose requests are fetched.
    pub testset: &'a TestsetArtifact,
    /// Where the response artifact must be written.
    pub output: &'a Utf8Path,
}

/// Inputs of a [`ResponseExtractor::extract`] call.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    /// Backend the responses came from.
    pub backend: &'a BackendOptions,
    /// Testset that produced the responses.
    pub testset: &'a TestsetArtifact,
    /// Responses to parse.
    pub responses: &'a ResponseArtifact,
    /// Where the extracted table must be written.
    pub output: &'a Utf8Path,
}

/// Inputs of a [`ReportGenerator::compare`] call.
#[derive(Debug, Clone, Copy)]
pub struct CompareRequest<'a> {
    /// Label of the first (ground-truth) side.
    pub first_label: &'a str,
    /// Label of the second (relaxed) side.
    pub second_label: &'a str,
    /// Extracted results of the first side.
    pub first: &'a ExtractedArtifact,
    /// Extracted results of the second side.
    pub second: &'a ExtractedArtifact,
    /// Where the report must be written.
    pub output: &'a Utf8Path,
    /// Human-readable experiment title.
    pub experiment_name: &'a str,
}

/// Errors raised by collaborator implementations.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be started.
    #[error("failed to launch {tool}: {source}")]
    Launch {
        /// Collaborator name.
        tool: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The collaborator ran but reported failure.
    #[error("{tool} failed: {status}")]
    Failed {
        /// Collaborator name.
        tool: String,
        /// Exit status or failure description.
        status: String,
    },
    /// The collaborator did not report a usable record count.
    #[error("{tool} did not report a record count (last output line {line:?})")]
    MissingCount {
        /// Collaborator name.
        tool: String,
        /// Last non-empty line of its output.
        line: String,
    },
    /// The collaborator finished without writing its artifact.
    #[error("{tool} did not write {path:?}")]
    MissingArtifact {
        /// Collaborator name.
        tool: String,
        /// Expected artifact location.
        path: Utf8PathBuf,
    },
}

/// Converts a free-form testset into the canonical tabular schema.
pub trait FreeformConverter {
    /// Write the tabular form of `input` to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when conversion fails.
    fn convert(&self, input: &Utf8Path, output: &Utf8Path) -> Result<(), CollaboratorError>;
}

/// Fetches routes for every request of a testset.
///
/// A failed row must not abort the whole fetch; it shows up later as a
/// response count lower than the request count.
pub trait RouteFetcher {
    /// Fetch routes and write one response artifact.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the fetch as a whole fails.
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<ResponseArtifact, CollaboratorError>;
}

/// Parses backend responses into a table of route results.
pub trait ResponseExtractor {
    /// Extract route results, reporting how many rows were parsed.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when extraction fails.
    fn extract(&self, request: &ExtractRequest<'_>)
    -> Result<ExtractedArtifact, CollaboratorError>;
}

/// Compares the extracted results of the two forms.
pub trait ReportGenerator {
    /// Match records by identifier, write the report and return how many
    /// pairs were compared.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when report generation fails.
    fn compare(&self, request: &CompareRequest<'_>) -> Result<usize, CollaboratorError>;
}
