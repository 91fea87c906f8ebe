//! Scripted, in-process collaborators used by unit and behaviour tests.
//!
//! [`ScriptedBackend`] stands in for the fetcher, extractor and report
//! generator at once. It never contacts a backend: extraction reports the
//! testset's record count minus any rows scripted to go missing, and the
//! report compares as many pairs as both sides have in common.
//!
//! [`captured_logs`] installs a process-wide logger that keeps every record,
//! so tests can assert on the lines a run emits.

use std::cell::RefCell;
use std::fs;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::artifact::{ExtractedArtifact, ResponseArtifact};
use crate::collaborator::{
    CollaboratorError, CompareRequest, ExtractRequest, FetchRequest, FreeformConverter,
    ReportGenerator, ResponseExtractor, RouteFetcher,
};
use crate::pipeline::{Collaborators, Stage};
use crate::testset::{Form, FormPair};

/// A collaborator call observed by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCall {
    /// Stage that was invoked.
    pub stage: Stage,
    /// Form processed, absent for the report stage.
    pub form: Option<Form>,
    /// Artifact the call was asked to write.
    pub output: Utf8PathBuf,
}

#[derive(Debug, Clone)]
struct ScriptedFailure {
    stage: Stage,
    form: Option<Form>,
    label: Option<String>,
}

/// In-memory fetcher, extractor and report generator.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    dropped: FormPair<usize>,
    failure: Option<ScriptedFailure>,
    calls: RefCell<Vec<BackendCall>>,
}

impl ScriptedBackend {
    /// A backend that loses nothing and never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lose `count` rows of `form` during extraction.
    #[must_use]
    pub fn dropping(mut self, form: Form, count: usize) -> Self {
        match form {
            Form::GroundTruth => self.dropped.ground_truth = count,
            Form::Relaxed => self.dropped.relaxed = count,
        }
        self
    }

    /// Fail `stage` for `form` (any form when `None`) of every testset.
    #[must_use]
    pub fn failing(mut self, stage: Stage, form: Option<Form>) -> Self {
        self.failure = Some(ScriptedFailure {
            stage,
            form,
            label: None,
        });
        self
    }

    /// Fail `stage` for `form` only for the testset named `label`.
    #[must_use]
    pub fn failing_for(mut self, label: &str, stage: Stage, form: Option<Form>) -> Self {
        self.failure = Some(ScriptedFailure {
            stage,
            form,
            label: Some(label.to_owned()),
        });
        self
    }

    /// Calls observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }

    /// Borrow this backend as the full set of pipeline collaborators.
    #[must_use]
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            fetcher: self,
            extractor: self,
            reporter: self,
        }
    }

    fn record(
        &self,
        stage: Stage,
        form: Option<Form>,
        output: &Utf8Path,
    ) -> Result<(), CollaboratorError> {
        self.calls.borrow_mut().push(BackendCall {
            stage,
            form,
            output: output.to_path_buf(),
        });
        let Some(failure) = &self.failure else {
            return Ok(());
        };
        let form_matches = failure.form.is_none() || failure.form == form;
        let label_matches = failure.label.as_ref().is_none_or(|label| {
            output
                .file_name()
                .is_some_and(|name| name.starts_with(&format!("{label}_")))
        });
        if failure.stage == stage && form_matches && label_matches {
            return Err(CollaboratorError::Failed {
                tool: format!("scripted {stage}"),
                status: "scripted failure".to_owned(),
            });
        }
        Ok(())
    }
}

impl RouteFetcher for ScriptedBackend {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<ResponseArtifact, CollaboratorError> {
        self.record(Stage::Fetch, Some(request.testset.form), request.output)?;
        Ok(ResponseArtifact {
            form: request.testset.form,
            path: request.output.to_path_buf(),
        })
    }
}

impl ResponseExtractor for ScriptedBackend {
    fn extract(
        &self,
        request: &ExtractRequest<'_>,
    ) -> Result<ExtractedArtifact, CollaboratorError> {
        let form = request.responses.form;
        self.record(Stage::Extract, Some(form), request.output)?;
        let dropped = *self.dropped.get(form);
        Ok(ExtractedArtifact {
            form,
            path: request.output.to_path_buf(),
            records: request.testset.records.saturating_sub(dropped),
        })
    }
}

impl ReportGenerator for ScriptedBackend {
    fn compare(&self, request: &CompareRequest<'_>) -> Result<usize, CollaboratorError> {
        self.record(Stage::Report, None, request.output)?;
        let compared = request.first.records.min(request.second.records);
        if let Some(dir) = request.output.parent() {
            fs::create_dir_all(dir).map_err(|err| CollaboratorError::Failed {
                tool: "scripted report".to_owned(),
                status: err.to_string(),
            })?;
        }
        let mut report = format!(
            "pair,{},{}\n",
            request.first_label, request.second_label
        );
        for index in 0..compared {
            report.push_str(&format!("{index},ok,ok\n"));
        }
        fs::write(request.output, report).map_err(|err| CollaboratorError::Failed {
            tool: "scripted report".to_owned(),
            status: err.to_string(),
        })?;
        Ok(compared)
    }
}

/// Converter writing fixed tabular contents for every input.
#[derive(Debug, Default)]
pub struct StaticConverter {
    contents: String,
    rejected: Option<String>,
    inputs: RefCell<Vec<Utf8PathBuf>>,
}

impl StaticConverter {
    /// Write `contents` as the converted testset.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            rejected: None,
            inputs: RefCell::new(Vec::new()),
        }
    }

    /// Fail the conversion of any input whose file name is `file_name`.
    #[must_use]
    pub fn rejecting(mut self, file_name: &str) -> Self {
        self.rejected = Some(file_name.to_owned());
        self
    }

    /// Inputs converted so far.
    #[must_use]
    pub fn inputs(&self) -> Vec<Utf8PathBuf> {
        self.inputs.borrow().clone()
    }
}

impl FreeformConverter for StaticConverter {
    fn convert(&self, input: &Utf8Path, output: &Utf8Path) -> Result<(), CollaboratorError> {
        self.inputs.borrow_mut().push(input.to_path_buf());
        if self.rejected.as_deref().is_some_and(|name| input.file_name() == Some(name)) {
            return Err(CollaboratorError::Failed {
                tool: "static converter".to_owned(),
                status: format!("rejected {input}"),
            });
        }
        fs::write(output, &self.contents).map_err(|err| CollaboratorError::Failed {
            tool: "static converter".to_owned(),
            status: err.to_string(),
        })
    }
}

/// One log record kept by [`LogCapture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    /// Record level.
    pub level: Level,
    /// Record target.
    pub target: String,
    /// Rendered message.
    pub message: String,
}

/// Logger keeping every record emitted in the process.
///
/// Tests run in parallel and share it, so assertions should look for lines
/// naming something unique to the test, such as a testset label.
#[derive(Debug)]
pub struct LogCapture {
    lines: Mutex<Vec<CapturedLine>>,
}

static CAPTURE: LogCapture = LogCapture {
    lines: Mutex::new(Vec::new()),
};

/// Install the capturing logger, if no logger is installed yet, and return it.
#[must_use]
pub fn captured_logs() -> &'static LogCapture {
    if log::set_logger(&CAPTURE).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    &CAPTURE
}

impl LogCapture {
    /// Captured lines whose message contains `needle`, in emission order.
    #[must_use]
    pub fn containing(&self, needle: &str) -> Vec<CapturedLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|line| line.message.contains(needle))
            .cloned()
            .collect()
    }
}

impl Log for LogCapture {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedLine {
                level: record.level(),
                target: record.target().to_owned(),
                message: record.args().to_string(),
            });
    }

    fn flush(&self) {}
}
