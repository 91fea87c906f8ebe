//! Facade crate for relaxroute.
//!
//! This crate re-exports the core domain types and, behind the `tools`
//! feature, the CSV testset builder and the external-tool collaborators.

#![forbid(unsafe_code)]

pub use relaxroute_core::{
    BackendOptions, CollaboratorError, Collaborators, ComparisonReport, ExtractedArtifact, Form,
    FormLabels, FormPair, FreeformConverter, LabelOutcome, PerWaypointParam, Pipeline,
    PipelineError, QueryRelaxError, Reconciliation, ReportGenerator, RequestRecord,
    ResponseArtifact, ResponseExtractor, RouteFetcher, RunLayout, RunSummary, Stage,
    TestsetArtifact, TestsetLabel, TestsetPair, relax_query,
};

#[cfg(feature = "tools")]
pub use relaxroute_data::{
    CommandConverter, CommandExtractor, CommandFetcher, CommandReporter, PlannedTestset,
    TestsetBuilder, TestsetError, ToolCommand, plan_testsets,
};
