//! Core domain for comparing ground-truth routing requests with their
//! relaxed, endpoints-only counterparts.
//!
//! Responsibilities:
//! - Derive relaxed query strings from per-waypoint ones.
//! - Model testsets, their two forms and the artifacts each stage writes.
//! - Sequence the external collaborators per testset and reconcile counts.
//!
//! Boundaries:
//! - No HTTP transport and no parsing of backend responses; both live
//!   behind the collaborator traits.
//! - Tabular I/O of testsets lives in `relaxroute-data`.

#![forbid(unsafe_code)]

pub mod artifact;
pub mod collaborator;
pub mod layout;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod testset;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{ComparisonReport, ExtractedArtifact, ResponseArtifact};
pub use collaborator::{
    BackendOptions, CollaboratorError, CompareRequest, ExtractRequest, FetchRequest,
    FreeformConverter, ReportGenerator, ResponseExtractor, RouteFetcher,
};
pub use layout::{RunLayout, SUMMARY_FILE_NAME};
pub use pipeline::{
    CRITICAL_TARGET, Collaborators, LabelOutcome, LabelRun, Pipeline, PipelineError,
    Reconciliation, RunSummary, Stage, SummaryRecord,
};
pub use query::{PerWaypointParam, QueryParams, QueryRelaxError, WAYPOINT_DELIMITER, relax_query};
pub use record::{RECORD_FIELDS, RequestRecord};
pub use testset::{
    DEFAULT_GROUND_TRUTH_LABEL, DEFAULT_RELAXED_LABEL, Form, FormLabelError, FormLabels, FormPair,
    LabelError, TestsetArtifact, TestsetLabel, TestsetPair, TestsetPairError,
};
