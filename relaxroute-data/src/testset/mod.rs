//! Testset planning and construction.
//!
//! Planning validates every input before anything is written: each file must
//! exist and its base name must be unique across the run. Building then lays
//! out both forms of each testset under the run's [`RunLayout`]:
//!
//! 1. create the ground-truth, relaxed and report directories;
//! 2. copy a `.csv` input verbatim, or hand any other input to the
//!    [`FreeformConverter`];
//! 3. derive the relaxed form row by row.
//!
//! Tabular inputs are not validated beyond what reading their rows needs.
//! A testset that fails to build fails alone; the others are still built.

mod error;
mod relax;


use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use relaxroute_core::{
    Form, FreeformConverter, PipelineError, RunLayout, TestsetArtifact, TestsetLabel,
    TestsetPair,
};

pub use error::TestsetError;

/// How an input file becomes a ground-truth testset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Already in the canonical CSV schema; copied as is.
    Tabular,
    /// Any other format; converted by the [`FreeformConverter`].
    Freeform,
}

impl InputFormat {
    /// Classify `path` by its extension.
    #[must_use]
    pub fn of(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("csv") => Self::Tabular,
            _ => Self::Freeform,
        }
    }
}

/// An input file accepted for the run, with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTestset {
    /// Label derived from the file's base name.
    pub label: TestsetLabel,
    /// Input file.
    pub input: Utf8PathBuf,
    /// How the input is turned into a tabular testset.
    pub format: InputFormat,
}

/// Validate `inputs` and assign each one its label, in input order.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8PathBuf;
/// use relaxroute_data::plan_testsets;
///
/// let inputs = [Utf8PathBuf::from("suites/urban.csv")];
/// let plan = plan_testsets(&inputs)?;
/// assert_eq!(plan[0].label.as_str(), "urban");
/// # Ok::<(), relaxroute_data::TestsetError>(())
/// ```
///
/// # Errors
///
/// Returns [`TestsetError::MissingInput`] when a file does not exist and
/// [`TestsetError::DuplicateLabel`] when two files share a base name.
pub fn plan_testsets<P: AsRef<Utf8Path>>(inputs: &[P]) -> Result<Vec<PlannedTestset>, TestsetError> {
    let mut plan: Vec<PlannedTestset> = Vec::with_capacity(inputs.len());
    for raw in inputs {
        let input = raw.as_ref();
        if !matches!(relaxroute_fs::file_is_file(input), Ok(true)) {
            return Err(TestsetError::MissingInput {
                path: input.to_path_buf(),
            });
        }
        let label = TestsetLabel::from_input(input)?;
        if let Some(existing) = plan.iter().find(|planned| planned.label == label) {
            return Err(TestsetError::DuplicateLabel {
                label,
                first: existing.input.clone(),
                second: input.to_path_buf(),
            });
        }
        plan.push(PlannedTestset {
            label,
            input: input.to_path_buf(),
            format: InputFormat::of(input),
        });
    }
    Ok(plan)
}

/// Writes the ground-truth and relaxed forms of planned testsets.
pub struct TestsetBuilder<'a> {
    layout: &'a RunLayout,
    converter: &'a dyn FreeformConverter,
}

impl fmt::Debug for TestsetBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestsetBuilder")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<'a> TestsetBuilder<'a> {
    /// Build testsets under `layout`, converting free-form inputs with
    /// `converter`.
    #[must_use]
    pub const fn new(layout: &'a RunLayout, converter: &'a dyn FreeformConverter) -> Self {
        Self { layout, converter }
    }

    /// Build every planned testset, in plan order.
    ///
    /// A testset that cannot be built comes back as a
    /// [`PipelineError::Build`] wrapping its [`TestsetError`], ready for
    /// [`relaxroute_core::Pipeline::run_prepared`].
    #[must_use]
    pub fn build_all(&self, plan: &[PlannedTestset]) -> Vec<Result<TestsetPair, PipelineError>> {
        plan.iter()
            .map(|planned| {
                self.build(planned).map_err(|source| PipelineError::Build {
                    label: planned.label.clone(),
                    source: Box::new(source),
                })
            })
            .collect()
    }

    /// Write both forms of one testset.
    ///
    /// # Errors
    ///
    /// Returns [`TestsetError`] when a directory or file cannot be written,
    /// the converter fails, the ground-truth file cannot be read, or it
    /// repeats a request id.
    pub fn build(&self, planned: &PlannedTestset) -> Result<TestsetPair, TestsetError> {
        let label = &planned.label;
        let dirs = Form::BOTH
            .map(|form| self.layout.form_dir(label, form))
            .into_iter()
            .chain([self.layout.report_dir(label)]);
        for dir in dirs {
            relaxroute_fs::ensure_dir(&dir)
                .map_err(|source| TestsetError::CreateDir { path: dir, source })?;
        }

        let ground_truth = self.layout.testset_file(label, Form::GroundTruth);
        let relaxed = self.layout.testset_file(label, Form::Relaxed);
        self.write_ground_truth(planned, &ground_truth)?;
        let relaxation = relax::relax_testset(label, &ground_truth, &relaxed)?;

        let labels = self.layout.labels();
        if !relaxation.had_waypoints {
            warn!(
                "Testset {label}: {rel} file '{relaxed}' generated from {gt} file '{ground_truth}' is the same!",
                rel = labels.relaxed(),
                gt = labels.ground_truth(),
            );
        }
        if !relaxation.unrelaxed_ids.is_empty() {
            warn!(
                "Testset {label}: {count} queries copied without relaxation",
                count = relaxation.unrelaxed_ids.len()
            );
        }
        info!("Testset {label}: {} requests", relaxation.records);

        let artifact = |form, path| TestsetArtifact {
            form,
            path,
            records: relaxation.records,
        };
        Ok(TestsetPair::new(
            label.clone(),
            artifact(Form::GroundTruth, ground_truth),
            artifact(Form::Relaxed, relaxed),
            !relaxation.had_waypoints,
            relaxation.unrelaxed_ids,
        )?)
    }

    fn write_ground_truth(
        &self,
        planned: &PlannedTestset,
        ground_truth: &Utf8Path,
    ) -> Result<(), TestsetError> {
        match planned.format {
            InputFormat::Tabular => {
                debug!("Copying {} to {ground_truth}", planned.input);
                relaxroute_fs::copy_file(&planned.input, ground_truth)
                    .map(drop)
                    .map_err(|source| TestsetError::Copy {
                        from: planned.input.clone(),
                        to: ground_truth.to_path_buf(),
                        source,
                    })
            }
            InputFormat::Freeform => {
                debug!("Converting {} to {ground_truth}", planned.input);
                self.converter
                    .convert(&planned.input, ground_truth)
                    .map_err(|source| TestsetError::Convert {
                        path: planned.input.clone(),
                        source,
                    })
            }
        }
    }
}
