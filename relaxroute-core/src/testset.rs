//! Testset labels, forms and the matched ground-truth/relaxed pair.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use thiserror::Error;

use crate::layout::SUMMARY_FILE_NAME;

/// Default run label for the ground-truth form.
pub const DEFAULT_GROUND_TRUTH_LABEL: &str = "gt";
/// Default run label for the relaxed form.
pub const DEFAULT_RELAXED_LABEL: &str = "rel";

/// Name of a testset, derived from its input file's base name.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use relaxroute_core::TestsetLabel;
///
/// let label = TestsetLabel::from_input(Utf8Path::new("suites/berlin.json"))?;
/// assert_eq!(label.as_str(), "berlin");
/// # Ok::<(), relaxroute_core::LabelError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TestsetLabel(String);

/// Errors raised when deriving a [`TestsetLabel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    /// The path has no file name to derive a label from.
    #[error("cannot derive a testset label from {path:?}")]
    NoFileStem {
        /// Input path without a usable file name.
        path: Utf8PathBuf,
    },
    /// The label would name a run-level path in the output root.
    #[error("testset label {label:?} derived from {path:?} is reserved for the run summary")]
    Reserved {
        /// Reserved label.
        label: String,
        /// Input path the label was derived from.
        path: Utf8PathBuf,
    },
}

impl TestsetLabel {
    /// Derive the label of the testset read from `input`: its file name with
    /// the final extension removed.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::NoFileStem`] when `input` has no file name and
    /// [`LabelError::Reserved`] when the label would collide with the run
    /// summary.
    pub fn from_input(input: &Utf8Path) -> Result<Self, LabelError> {
        let stem = input
            .file_stem()
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| LabelError::NoFileStem {
                path: input.to_path_buf(),
            })?;
        if stem == SUMMARY_FILE_NAME {
            return Err(LabelError::Reserved {
                label: stem.to_owned(),
                path: input.to_path_buf(),
            });
        }
        Ok(Self(stem.to_owned()))
    }

    /// Borrow the label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestsetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the two request representations an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    /// The original multi-waypoint requests.
    GroundTruth,
    /// Requests reduced to their start and destination.
    Relaxed,
}

impl Form {
    /// Both forms in processing order.
    pub const BOTH: [Self; 2] = [Self::GroundTruth, Self::Relaxed];
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GroundTruth => "ground-truth",
            Self::Relaxed => "relaxed",
        })
    }
}

/// A value held once per [`Form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FormPair<T> {
    /// Value for the ground-truth form.
    pub ground_truth: T,
    /// Value for the relaxed form.
    pub relaxed: T,
}

impl<T> FormPair<T> {
    /// Pair up two values.
    pub const fn new(ground_truth: T, relaxed: T) -> Self {
        Self {
            ground_truth,
            relaxed,
        }
    }

    /// Borrow the value for `form`.
    pub const fn get(&self, form: Form) -> &T {
        match form {
            Form::GroundTruth => &self.ground_truth,
            Form::Relaxed => &self.relaxed,
        }
    }

    /// Apply a fallible function to both values, ground truth first.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`; the relaxed value is not
    /// visited when the ground-truth value fails.
    pub fn try_map<U, E>(&self, mut f: impl FnMut(Form, &T) -> Result<U, E>) -> Result<FormPair<U>, E> {
        let ground_truth = f(Form::GroundTruth, &self.ground_truth)?;
        let relaxed = f(Form::Relaxed, &self.relaxed)?;
        Ok(FormPair::new(ground_truth, relaxed))
    }

    /// Apply an infallible function to both values.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> FormPair<U> {
        FormPair::new(f(&self.ground_truth), f(&self.relaxed))
    }
}

/// Run labels naming each form in file names and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLabels {
    ground_truth: String,
    relaxed: String,
}

/// Errors raised when validating [`FormLabels`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormLabelError {
    /// A label is empty.
    #[error("the {form} label must not be empty")]
    Empty {
        /// Form whose label is empty.
        form: Form,
    },
    /// A label would not form a single path component.
    #[error("the {form} label {label:?} must be a single path component")]
    NotPathComponent {
        /// Form whose label is invalid.
        form: Form,
        /// Offending label.
        label: String,
    },
    /// Both forms share a label, so their artifacts would collide.
    #[error("the ground-truth and relaxed labels are both {label:?}")]
    Identical {
        /// Shared label.
        label: String,
    },
}

impl FormLabels {
    /// Validate a pair of run labels.
    ///
    /// # Errors
    ///
    /// Returns [`FormLabelError`] when a label is empty, contains a path
    /// separator or is `.`/`..`, or when both labels are equal.
    pub fn new(
        ground_truth: impl Into<String>,
        relaxed: impl Into<String>,
    ) -> Result<Self, FormLabelError> {
        let labels = Self {
            ground_truth: ground_truth.into(),
            relaxed: relaxed.into(),
        };
        for form in Form::BOTH {
            validate_label(form, labels.label(form))?;
        }
        if labels.ground_truth == labels.relaxed {
            return Err(FormLabelError::Identical {
                label: labels.ground_truth,
            });
        }
        Ok(labels)
    }

    /// Label used for `form`.
    #[must_use]
    pub fn label(&self, form: Form) -> &str {
        match form {
            Form::GroundTruth => &self.ground_truth,
            Form::Relaxed => &self.relaxed,
        }
    }

    /// Label used for the ground-truth form.
    #[must_use]
    pub fn ground_truth(&self) -> &str {
        &self.ground_truth
    }

    /// Label used for the relaxed form.
    #[must_use]
    pub fn relaxed(&self) -> &str {
        &self.relaxed
    }
}

impl Default for FormLabels {
    fn default() -> Self {
        Self {
            ground_truth: DEFAULT_GROUND_TRUTH_LABEL.to_owned(),
            relaxed: DEFAULT_RELAXED_LABEL.to_owned(),
        }
    }
}

fn validate_label(form: Form, label: &str) -> Result<(), FormLabelError> {
    if label.is_empty() {
        return Err(FormLabelError::Empty { form });
    }
    if label == "." || label == ".." || label.contains(['/', '\\']) {
        return Err(FormLabelError::NotPathComponent {
            form,
            label: label.to_owned(),
        });
    }
    Ok(())
}

/// A tabular testset written for one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestsetArtifact {
    /// Form of the requests in the file.
    pub form: Form,
    /// Location of the CSV file.
    pub path: Utf8PathBuf,
    /// Number of request records in the file.
    pub records: usize,
}

/// Errors raised when pairing testset artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestsetPairError {
    /// An artifact was supplied in the wrong slot.
    #[error("testset {label}: expected a {expected} artifact, found {found}")]
    FormMismatch {
        /// Testset being paired.
        label: TestsetLabel,
        /// Form required by the slot.
        expected: Form,
        /// Form of the supplied artifact.
        found: Form,
    },
    /// The two forms disagree on the number of records.
    #[error("testset {label}: {ground_truth} ground-truth records but {relaxed} relaxed records")]
    CountMismatch {
        /// Testset being paired.
        label: TestsetLabel,
        /// Records in the ground-truth form.
        ground_truth: usize,
        /// Records in the relaxed form.
        relaxed: usize,
    },
}

/// The ground-truth and relaxed testsets derived from one input file.
///
/// Both forms always hold the same number of records in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestsetPair {
    label: TestsetLabel,
    artifacts: FormPair<TestsetArtifact>,
    degenerate: bool,
    unrelaxed_ids: Vec<String>,
}

impl TestsetPair {
    /// Pair the two artifacts of `label`.
    ///
    /// `degenerate` marks a pair whose forms are identical because no
    /// request carried waypoints. `unrelaxed_ids` lists requests whose query
    /// could not be relaxed and was copied unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TestsetPairError`] when the artifacts are in the wrong slots
    /// or hold different numbers of records.
    pub fn new(
        label: TestsetLabel,
        ground_truth: TestsetArtifact,
        relaxed: TestsetArtifact,
        degenerate: bool,
        unrelaxed_ids: Vec<String>,
    ) -> Result<Self, TestsetPairError> {
        for (expected, artifact) in [(Form::GroundTruth, &ground_truth), (Form::Relaxed, &relaxed)] {
            if artifact.form != expected {
                return Err(TestsetPairError::FormMismatch {
                    label,
                    expected,
                    found: artifact.form,
                });
            }
        }
        if ground_truth.records != relaxed.records {
            return Err(TestsetPairError::CountMismatch {
                label,
                ground_truth: ground_truth.records,
                relaxed: relaxed.records,
            });
        }
        Ok(Self {
            label,
            artifacts: FormPair::new(ground_truth, relaxed),
            degenerate,
            unrelaxed_ids,
        })
    }

    /// Label of the testset.
    #[must_use]
    pub const fn label(&self) -> &TestsetLabel {
        &self.label
    }

    /// Number of requests in each form.
    #[must_use]
    pub const fn requests(&self) -> usize {
        self.artifacts.ground_truth.records
    }

    /// Artifact written for `form`.
    #[must_use]
    pub const fn artifact(&self, form: Form) -> &TestsetArtifact {
        self.artifacts.get(form)
    }

    /// Both artifacts.
    #[must_use]
    pub const fn artifacts(&self) -> &FormPair<TestsetArtifact> {
        &self.artifacts
    }

    /// Whether both forms are content-identical.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Requests whose query was copied unrelaxed.
    #[must_use]
    pub fn unrelaxed_ids(&self) -> &[String] {
        &self.unrelaxed_ids
    }
}
