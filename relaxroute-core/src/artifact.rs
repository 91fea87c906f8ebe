//! Typed handles for the artifacts produced by each pipeline stage.
//!
//! Stages pass these handles rather than bare paths so the form and record
//! count of every file travel with it.

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::testset::{Form, TestsetLabel};

/// Raw backend responses fetched for one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseArtifact {
    /// Form of the requests that were fetched.
    pub form: Form,
    /// Location of the response JSON file.
    pub path: Utf8PathBuf,
}

/// Route results parsed out of a [`ResponseArtifact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedArtifact {
    /// Form of the requests the results belong to.
    pub form: Form,
    /// Location of the extracted CSV file.
    pub path: Utf8PathBuf,
    /// Number of result rows the extractor parsed.
    pub records: usize,
}

/// Comparison of the two extracted forms of one testset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// Testset the report covers.
    pub label: TestsetLabel,
    /// Location of the report CSV file.
    pub path: Utf8PathBuf,
    /// Number of record pairs matched by identifier and compared.
    pub compared: usize,
}
