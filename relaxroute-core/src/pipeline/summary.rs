//! Run-wide summary of every processed testset.

use std::fmt;

use camino::Utf8Path;
use serde::Serialize;

use super::PipelineError;
use super::reconcile::{LabelOutcome, Reconciliation};
use crate::testset::{FormPair, TestsetLabel};

/// What happened to one testset.
#[derive(Debug)]
pub struct LabelRun {
    /// Testset label.
    pub label: TestsetLabel,
    /// Requests in each form of the testset, absent when it failed to build.
    pub requested: Option<usize>,
    /// Outcome of the stages, or the stage failure that stopped them.
    pub result: Result<LabelOutcome, PipelineError>,
}

/// Outcome of a whole run, in input order.
#[derive(Debug, Default)]
pub struct RunSummary {
    runs: Vec<LabelRun>,
}

/// Serializable view of one [`LabelRun`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRecord<'a> {
    /// Testset label.
    pub label: &'a TestsetLabel,
    /// Requests in each form, absent when the testset failed to build.
    pub requested: Option<usize>,
    /// Report location, absent when the testset failed.
    pub report: Option<&'a Utf8Path>,
    /// Compared record pairs, absent when the testset failed.
    pub compared: Option<usize>,
    /// Extracted rows per form, absent when the testset failed.
    pub extracted: Option<FormPair<usize>>,
    /// Reconciliation status, absent when the testset failed.
    pub reconciliation: Option<Reconciliation>,
    /// Failure message when the testset failed.
    pub error: Option<String>,
}

impl RunSummary {
    /// Collect the runs of every testset.
    #[must_use]
    pub const fn new(runs: Vec<LabelRun>) -> Self {
        Self { runs }
    }

    /// Every testset run, in input order.
    #[must_use]
    pub fn runs(&self) -> &[LabelRun] {
        &self.runs
    }

    /// Report location of every testset that completed.
    pub fn reports(&self) -> impl Iterator<Item = (&TestsetLabel, &Utf8Path)> {
        self.outcomes()
            .map(|outcome| (&outcome.label, outcome.report.path.as_path()))
    }

    /// Outcomes of every testset that completed.
    pub fn outcomes(&self) -> impl Iterator<Item = &LabelOutcome> {
        self.runs.iter().filter_map(|run| run.result.as_ref().ok())
    }

    /// Labels whose stages failed.
    #[must_use]
    pub fn failed_labels(&self) -> Vec<&TestsetLabel> {
        self.runs
            .iter()
            .filter(|run| run.result.is_err())
            .map(|run| &run.label)
            .collect()
    }

    /// Labels that completed with a count mismatch.
    #[must_use]
    pub fn mismatched_labels(&self) -> Vec<&TestsetLabel> {
        self.outcomes()
            .filter(|outcome| !outcome.reconciliation.is_matched())
            .map(|outcome| &outcome.label)
            .collect()
    }

    /// Whether every testset went through every stage.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.runs.iter().all(|run| run.result.is_ok())
    }

    /// Serializable records, one per testset.
    #[must_use]
    pub fn records(&self) -> Vec<SummaryRecord<'_>> {
        self.runs.iter().map(SummaryRecord::from_run).collect()
    }

    /// Display adapter listing each completed label with its report path.
    #[must_use]
    pub const fn report_listing(&self) -> ReportListing<'_> {
        ReportListing(self)
    }
}

impl<'a> SummaryRecord<'a> {
    fn from_run(run: &'a LabelRun) -> Self {
        match &run.result {
            Ok(outcome) => Self {
                label: &run.label,
                requested: run.requested,
                report: Some(outcome.report.path.as_path()),
                compared: Some(outcome.compared()),
                extracted: Some(outcome.extracted),
                reconciliation: Some(outcome.reconciliation),
                error: None,
            },
            Err(err) => Self {
                label: &run.label,
                requested: run.requested,
                report: None,
                compared: None,
                extracted: None,
                reconciliation: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Renders `{label: path, ...}` for the completed testsets of a run.
#[derive(Debug, Clone, Copy)]
pub struct ReportListing<'a>(&'a RunSummary);

impl fmt::Display for ReportListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut separator = "";
        for (label, path) in self.0.reports() {
            write!(f, "{separator}{label}: {path}")?;
            separator = ", ";
        }
        f.write_str("}")
    }
}
