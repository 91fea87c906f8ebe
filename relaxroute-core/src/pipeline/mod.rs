//! Per-testset orchestration: fetch, extract, report, reconcile.
//!
//! Testsets are processed one at a time in input order. Within a testset the
//! stages run strictly in sequence and each collaborator call completes
//! before the next begins. A testset that could not be built, or whose
//! collaborator fails, stops alone; the remaining testsets still run.
//!
//! Only the pipeline knows how many requests a testset held, so it is the
//! place where silent drops anywhere in the chain are detected: the number
//! of compared pairs must equal the number of requests.

mod reconcile;
mod summary;

use std::error::Error as StdError;
use std::fmt;

use log::{debug, error, info, warn};
use serde::Serialize;
use thiserror::Error;

pub use reconcile::{LabelOutcome, Reconciliation};
pub use summary::{LabelRun, ReportListing, RunSummary, SummaryRecord};

use crate::artifact::{ComparisonReport, ExtractedArtifact, ResponseArtifact};
use crate::collaborator::{
    BackendOptions, CollaboratorError, CompareRequest, ExtractRequest, FetchRequest,
    ReportGenerator, ResponseExtractor, RouteFetcher,
};
use crate::layout::RunLayout;
use crate::testset::{Form, FormPair, TestsetArtifact, TestsetLabel, TestsetPair};

/// Log target for run status lines that must survive the quietest verbosity.
pub const CRITICAL_TARGET: &str = "relaxroute::critical";

/// A pipeline stage driven by a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Testset construction, before any collaborator runs.
    Build,
    /// Route fetching.
    Fetch,
    /// Response extraction.
    Extract,
    /// Report generation.
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Build => "build",
            Self::Fetch => "fetch",
            Self::Extract => "extract",
            Self::Report => "report",
        })
    }
}

/// Failures that stop a single testset.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The testset's two forms could not be written.
    #[error("testset {label}: could not be built: {source}")]
    Build {
        /// Testset being built.
        label: TestsetLabel,
        /// Builder failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A per-form stage failed.
    #[error("testset {label}: {stage} stage failed for the {form} form: {source}")]
    FormStage {
        /// Testset being processed.
        label: TestsetLabel,
        /// Failed stage.
        stage: Stage,
        /// Form being processed.
        form: Form,
        /// Collaborator failure.
        #[source]
        source: CollaboratorError,
    },
    /// Report generation failed.
    #[error("testset {label}: report stage failed: {source}")]
    Report {
        /// Testset being processed.
        label: TestsetLabel,
        /// Collaborator failure.
        #[source]
        source: CollaboratorError,
    },
}

impl PipelineError {
    /// Testset the failure belongs to.
    #[must_use]
    pub const fn label(&self) -> &TestsetLabel {
        match self {
            Self::Build { label, .. }
            | Self::FormStage { label, .. }
            | Self::Report { label, .. } => label,
        }
    }

    /// Stage at which the testset stopped.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Build { .. } => Stage::Build,
            Self::FormStage { stage, .. } => *stage,
            Self::Report { .. } => Stage::Report,
        }
    }
}

/// The collaborators a pipeline drives.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Fetches routes for a testset.
    pub fetcher: &'a dyn RouteFetcher,
    /// Parses fetched responses.
    pub extractor: &'a dyn ResponseExtractor,
    /// Compares the two forms.
    pub reporter: &'a dyn ReportGenerator,
}

impl fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Sequences the stages for every testset of a run.
#[derive(Debug)]
pub struct Pipeline<'a> {
    collaborators: Collaborators<'a>,
    backend: &'a BackendOptions,
    layout: &'a RunLayout,
}

impl<'a> Pipeline<'a> {
    /// Build a pipeline writing into `layout` and querying `backend`.
    #[must_use]
    pub const fn new(
        collaborators: Collaborators<'a>,
        backend: &'a BackendOptions,
        layout: &'a RunLayout,
    ) -> Self {
        Self {
            collaborators,
            backend,
            layout,
        }
    }

    /// Process every testset in order and summarise the run.
    ///
    /// Failures and count mismatches are logged per testset and recorded in
    /// the summary; neither stops the remaining testsets.
    #[must_use]
    pub fn run(&self, testsets: &[TestsetPair]) -> RunSummary {
        summarise(testsets.iter().map(|pair| self.run_built(pair)).collect())
    }

    /// Like [`Self::run`], for testsets that may have failed to build.
    ///
    /// A [`PipelineError::Build`] entry is logged and recorded as a failed
    /// testset without contacting any collaborator.
    #[must_use]
    pub fn run_prepared(&self, testsets: Vec<Result<TestsetPair, PipelineError>>) -> RunSummary {
        let runs = testsets
            .into_iter()
            .map(|prepared| match prepared {
                Ok(pair) => self.run_built(&pair),
                Err(err) => {
                    log_failure(&err, None);
                    LabelRun {
                        label: err.label().clone(),
                        requested: None,
                        result: Err(err),
                    }
                }
            })
            .collect();
        summarise(runs)
    }

    fn run_built(&self, pair: &TestsetPair) -> LabelRun {
        let result = self.run_testset(pair);
        self.log_result(pair, &result);
        LabelRun {
            label: pair.label().clone(),
            requested: Some(pair.requests()),
            result,
        }
    }

    /// Run every stage for one testset.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] naming the testset and stage when a
    /// collaborator fails.
    pub fn run_testset(&self, pair: &TestsetPair) -> Result<LabelOutcome, PipelineError> {
        let label = pair.label();
        if pair.is_degenerate() {
            warn!("Testset {label}: both forms are identical, the comparison will show no relaxation effect");
        }
        let responses = pair
            .artifacts()
            .try_map(|form, testset| self.fetch(label, form, testset))?;
        let extracted = pair.artifacts().try_map(|form, testset| {
            self.extract(label, form, testset, responses.get(form))
        })?;
        let report = self.report(label, &extracted)?;
        Ok(LabelOutcome::reconcile(pair, &extracted, report))
    }

    fn fetch(
        &self,
        label: &TestsetLabel,
        form: Form,
        testset: &TestsetArtifact,
    ) -> Result<ResponseArtifact, PipelineError> {
        info!("Fetching routes specified in '{}'", testset.path);
        let output = self.layout.response_json(label, form);
        let request = FetchRequest {
            backend: self.backend,
            testset,
            output: &output,
        };
        self.collaborators
            .fetcher
            .fetch(&request)
            .map_err(|source| PipelineError::FormStage {
                label: label.clone(),
                stage: Stage::Fetch,
                form,
                source,
            })
    }

    fn extract(
        &self,
        label: &TestsetLabel,
        form: Form,
        testset: &TestsetArtifact,
        responses: &ResponseArtifact,
    ) -> Result<ExtractedArtifact, PipelineError> {
        info!("Extracting data specified in '{}'", responses.path);
        let output = self.layout.response_csv(label, form);
        let request = ExtractRequest {
            backend: self.backend,
            testset,
            responses,
            output: &output,
        };
        let extracted = self
            .collaborators
            .extractor
            .extract(&request)
            .map_err(|source| PipelineError::FormStage {
                label: label.clone(),
                stage: Stage::Extract,
                form,
                source,
            })?;
        debug!(
            "Extracted data on responses in '{}': {} routes",
            responses.path, extracted.records
        );
        Ok(extracted)
    }

    fn report(
        &self,
        label: &TestsetLabel,
        extracted: &FormPair<ExtractedArtifact>,
    ) -> Result<ComparisonReport, PipelineError> {
        let output = self.layout.report_file(label);
        let labels = self.layout.labels();
        let experiment_name = format!(
            "{label}: {} vs {}",
            labels.ground_truth(),
            labels.relaxed()
        );
        let request = CompareRequest {
            first_label: labels.ground_truth(),
            second_label: labels.relaxed(),
            first: &extracted.ground_truth,
            second: &extracted.relaxed,
            output: &output,
            experiment_name: &experiment_name,
        };
        let compared = self
            .collaborators
            .reporter
            .compare(&request)
            .map_err(|source| PipelineError::Report {
                label: label.clone(),
                source,
            })?;
        Ok(ComparisonReport {
            label: label.clone(),
            path: output,
            compared,
        })
    }

    fn log_result(&self, pair: &TestsetPair, result: &Result<LabelOutcome, PipelineError>) {
        let labels = self.layout.labels();
        let label = pair.label();
        let requested = pair.requests();
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                log_failure(err, Some(requested));
                return;
            }
        };
        let compared = outcome.compared();
        let FormPair {
            ground_truth,
            relaxed,
        } = outcome.extracted;
        error!(
            target: CRITICAL_TARGET,
            "Testset {label}: produced comparison for {compared}/{requested} routes \
             ({ground_truth} for {}, {relaxed} for {})",
            labels.ground_truth(),
            labels.relaxed()
        );
        match outcome.reconciliation {
            Reconciliation::Matched => {}
            Reconciliation::Missing { count } => error!(
                "Testset {label}: number of requests {requested} does not match the number of \
                 compared routes {compared}: {count} missing ({ground_truth} extracted for {}, \
                 {relaxed} for {})",
                labels.ground_truth(),
                labels.relaxed()
            ),
            Reconciliation::Surplus { count } => error!(
                "Testset {label}: number of requests {requested} does not match the number of \
                 compared routes {compared}: {count} more than requested ({ground_truth} \
                 extracted for {}, {relaxed} for {})",
                labels.ground_truth(),
                labels.relaxed()
            ),
        }
    }
}

fn summarise(runs: Vec<LabelRun>) -> RunSummary {
    let summary = RunSummary::new(runs);
    error!(target: CRITICAL_TARGET, "Reports are {}", summary.report_listing());
    summary
}

fn log_failure(err: &PipelineError, requested: Option<usize>) {
    error!("{err}");
    let label = err.label();
    let stage = err.stage();
    match requested {
        Some(requested) => error!(
            target: CRITICAL_TARGET,
            "Testset {label}: stopped at the {stage} stage, produced no comparison for {requested} routes"
        ),
        None => error!(
            target: CRITICAL_TARGET,
            "Testset {label}: stopped at the {stage} stage, produced no comparison"
        ),
    }
}
