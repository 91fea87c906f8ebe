//! One adapter per collaborator trait, each building its tool's argv.

use camino::Utf8Path;
use relaxroute_core::{
    BackendOptions, CollaboratorError, CompareRequest, ExtractRequest, ExtractedArtifact,
    FetchRequest, FreeformConverter, ReportGenerator, ResponseArtifact, ResponseExtractor,
    RouteFetcher,
};

use super::ToolCommand;

/// Runs `<tool> <input> <output>`.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    tool: ToolCommand,
}

impl CommandConverter {
    /// Wrap the converter command.
    #[must_use]
    pub const fn new(tool: ToolCommand) -> Self {
        Self { tool }
    }
}

impl FreeformConverter for CommandConverter {
    fn convert(&self, input: &Utf8Path, output: &Utf8Path) -> Result<(), CollaboratorError> {
        self.tool
            .run(&[input.to_string(), output.to_string()])?;
        self.tool.require_artifact(output)
    }
}

/// Runs the route fetcher once per testset form.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    tool: ToolCommand,
    logger: String,
}

impl CommandFetcher {
    /// Wrap the fetcher command; `logger` is forwarded as its verbosity.
    pub fn new(tool: ToolCommand, logger: impl Into<String>) -> Self {
        Self {
            tool,
            logger: logger.into(),
        }
    }
}

impl RouteFetcher for CommandFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<ResponseArtifact, CollaboratorError> {
        self.tool.run(&fetch_args(request, &self.logger))?;
        self.tool.require_artifact(request.output)?;
        Ok(ResponseArtifact {
            form: request.testset.form,
            path: request.output.to_path_buf(),
        })
    }
}

/// Runs the response extractor and reads the extracted row count.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    tool: ToolCommand,
    logger: String,
}

impl CommandExtractor {
    /// Wrap the extractor command; `logger` is forwarded as its verbosity.
    pub fn new(tool: ToolCommand, logger: impl Into<String>) -> Self {
        Self {
            tool,
            logger: logger.into(),
        }
    }
}

impl ResponseExtractor for CommandExtractor {
    fn extract(
        &self,
        request: &ExtractRequest<'_>,
    ) -> Result<ExtractedArtifact, CollaboratorError> {
        let stdout = self.tool.run(&extract_args(request, &self.logger))?;
        let records = self.tool.parse_count(&stdout)?;
        self.tool.require_artifact(request.output)?;
        Ok(ExtractedArtifact {
            form: request.testset.form,
            path: request.output.to_path_buf(),
            records,
        })
    }
}

/// Runs the report generator and reads the compared pair count.
#[derive(Debug, Clone)]
pub struct CommandReporter {
    tool: ToolCommand,
    logger: String,
}

impl CommandReporter {
    /// Wrap the report command; `logger` is forwarded as its verbosity.
    pub fn new(tool: ToolCommand, logger: impl Into<String>) -> Self {
        Self {
            tool,
            logger: logger.into(),
        }
    }
}

impl ReportGenerator for CommandReporter {
    fn compare(&self, request: &CompareRequest<'_>) -> Result<usize, CollaboratorError> {
        let stdout = self.tool.run(&compare_args(request, &self.logger))?;
        let compared = self.tool.parse_count(&stdout)?;
        self.tool.require_artifact(request.output)?;
        Ok(compared)
    }
}

fn push_query(args: &mut Vec<String>, backend: &BackendOptions) {
    if let Some(query) = &backend.default_query {
        args.extend(["--query".to_owned(), query.clone()]);
    }
}

/// `<host> <testset> <token> <output> --profile P [--query Q] --threads N --logger L`
pub(super) fn fetch_args(request: &FetchRequest<'_>, logger: &str) -> Vec<String> {
    let backend = request.backend;
    let mut args = vec![
        backend.host.clone(),
        request.testset.path.to_string(),
        backend.token.clone(),
        request.output.to_string(),
        "--profile".to_owned(),
        backend.profile.clone(),
    ];
    push_query(&mut args, backend);
    args.extend([
        "--threads".to_owned(),
        backend.threads.to_string(),
        "--logger".to_owned(),
        logger.to_owned(),
    ]);
    args
}

/// `<host> <testset> <responses> <token> --output_file O [--query Q] --profile P --logger L`
pub(super) fn extract_args(request: &ExtractRequest<'_>, logger: &str) -> Vec<String> {
    let backend = request.backend;
    let mut args = vec![
        backend.host.clone(),
        request.testset.path.to_string(),
        request.responses.path.to_string(),
        backend.token.clone(),
        "--output_file".to_owned(),
        request.output.to_string(),
    ];
    push_query(&mut args, backend);
    args.extend([
        "--profile".to_owned(),
        backend.profile.clone(),
        "--logger".to_owned(),
        logger.to_owned(),
    ]);
    args
}

pub(super) fn compare_args(request: &CompareRequest<'_>, logger: &str) -> Vec<String> {
    [
        ("--first-label", request.first_label.to_owned()),
        ("--second-label", request.second_label.to_owned()),
        ("--first-csv", request.first.path.to_string()),
        ("--second-csv", request.second.path.to_string()),
        ("--output-file", request.output.to_string()),
        ("--experiment-name", request.experiment_name.to_owned()),
        ("--logger", logger.to_owned()),
    ]
    .into_iter()
    .flat_map(|(flag, value)| [flag.to_owned(), value])
    .collect()
}
