//! Reconciliation of requested against compared record counts.

use serde::Serialize;

use crate::artifact::{ComparisonReport, ExtractedArtifact};
use crate::testset::{FormPair, TestsetLabel, TestsetPair};

/// Result of checking a testset's request count against its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Every request was compared.
    Matched,
    /// Fewer pairs were compared than requests were made.
    Missing {
        /// Requests without a compared pair.
        count: usize,
    },
    /// More pairs were compared than requests were made.
    Surplus {
        /// Compared pairs beyond the request count.
        count: usize,
    },
}

impl Reconciliation {
    /// Compare the requested count with the compared count.
    ///
    /// # Examples
    ///
    /// ```
    /// use relaxroute_core::Reconciliation;
    ///
    /// assert_eq!(Reconciliation::between(3, 3), Reconciliation::Matched);
    /// assert_eq!(Reconciliation::between(3, 2), Reconciliation::Missing { count: 1 });
    /// ```
    #[must_use]
    pub const fn between(requested: usize, compared: usize) -> Self {
        if compared < requested {
            Self::Missing {
                count: requested - compared,
            }
        } else if compared > requested {
            Self::Surplus {
                count: compared - requested,
            }
        } else {
            Self::Matched
        }
    }

    /// Whether the counts agree.
    #[must_use]
    pub const fn is_matched(self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// A testset that went through every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelOutcome {
    /// Testset label.
    pub label: TestsetLabel,
    /// Requests in each form of the testset.
    pub requested: usize,
    /// Result rows extracted per form.
    pub extracted: FormPair<usize>,
    /// The comparison report.
    pub report: ComparisonReport,
    /// Requested versus compared.
    pub reconciliation: Reconciliation,
}

impl LabelOutcome {
    pub(crate) fn reconcile(
        pair: &TestsetPair,
        extracted: &FormPair<ExtractedArtifact>,
        report: ComparisonReport,
    ) -> Self {
        let requested = pair.requests();
        Self {
            label: pair.label().clone(),
            requested,
            extracted: extracted.map(|artifact| artifact.records),
            reconciliation: Reconciliation::between(requested, report.compared),
            report,
        }
    }

    /// Number of record pairs in the report.
    #[must_use]
    pub const fn compared(&self) -> usize {
        self.report.compared
    }
}
