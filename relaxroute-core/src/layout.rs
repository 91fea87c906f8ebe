//! On-disk layout of a run's output tree.
//!
//! ```text
//! <root>/
//!   summary.json
//!   <label>/
//!     <gt>/<label>_<gt>.csv
//!     <gt>/<label>_response.json
//!     <gt>/<label>_response.csv
//!     <rel>/<label>_<rel>.csv
//!     <rel>/<label>_response.json
//!     <rel>/<label>_response.csv
//!     <label>/<label>_report.csv
//! ```
//!
//! Every testset owns its `<root>/<label>` subtree, so no two labels ever
//! write to the same path.

use camino::{Utf8Path, Utf8PathBuf};

use crate::testset::{Form, FormLabels, TestsetLabel};

/// File name of the machine-readable run summary.
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Resolves artifact locations beneath a run's output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: Utf8PathBuf,
    labels: FormLabels,
}

impl RunLayout {
    /// Lay out a run under `root`, naming form directories with `labels`.
    pub fn new(root: impl Into<Utf8PathBuf>, labels: FormLabels) -> Self {
        Self {
            root: root.into(),
            labels,
        }
    }

    /// Output root of the run.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Labels naming the two forms.
    #[must_use]
    pub const fn labels(&self) -> &FormLabels {
        &self.labels
    }

    /// Directory owned by one testset.
    #[must_use]
    pub fn testset_dir(&self, label: &TestsetLabel) -> Utf8PathBuf {
        self.root.join(label.as_str())
    }

    /// Working directory for one form of a testset.
    #[must_use]
    pub fn form_dir(&self, label: &TestsetLabel, form: Form) -> Utf8PathBuf {
        self.testset_dir(label).join(self.labels.label(form))
    }

    /// Tabular testset for one form.
    #[must_use]
    pub fn testset_file(&self, label: &TestsetLabel, form: Form) -> Utf8PathBuf {
        self.form_dir(label, form)
            .join(format!("{label}_{}.csv", self.labels.label(form)))
    }

    /// Backend responses fetched for one form.
    #[must_use]
    pub fn response_json(&self, label: &TestsetLabel, form: Form) -> Utf8PathBuf {
        self.form_dir(label, form)
            .join(format!("{label}_response.json"))
    }

    /// Route results extracted for one form.
    #[must_use]
    pub fn response_csv(&self, label: &TestsetLabel, form: Form) -> Utf8PathBuf {
        self.form_dir(label, form).join(format!("{label}_response.csv"))
    }

    /// Directory holding the comparison report.
    #[must_use]
    pub fn report_dir(&self, label: &TestsetLabel) -> Utf8PathBuf {
        self.testset_dir(label).join(label.as_str())
    }

    /// Comparison report of a testset.
    #[must_use]
    pub fn report_file(&self, label: &TestsetLabel) -> Utf8PathBuf {
        self.report_dir(label).join(format!("{label}_report.csv"))
    }

    /// Machine-readable summary of the whole run.
    #[must_use]
    pub fn summary_file(&self) -> Utf8PathBuf {
        self.root.join(SUMMARY_FILE_NAME)
    }
}
