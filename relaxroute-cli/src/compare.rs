//! `compare` command: configuration, validation and run wiring.

use std::io;
use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use clap::Parser;
use log::{debug, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use relaxroute_core::{
    BackendOptions, Collaborators, DEFAULT_GROUND_TRUTH_LABEL, DEFAULT_RELAXED_LABEL, FormLabels,
    Pipeline, RunLayout, RunSummary,
};
use relaxroute_data::{
    CommandConverter, CommandExtractor, CommandFetcher, CommandReporter, DEFAULT_CONVERT_TOOL,
    DEFAULT_EXTRACT_TOOL, DEFAULT_FETCH_TOOL, DEFAULT_REPORT_TOOL, TestsetBuilder, ToolCommand,
    plan_testsets,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::logging::Verbosity;
use crate::{
    ARG_CONVERT_TOOL, ARG_EXTRACT_TOOL, ARG_FETCH_TOOL, ARG_FIRST_LABEL, ARG_HOST, ARG_INPUTS,
    ARG_LOG_LEVEL, ARG_OUTPUT, ARG_PROFILE, ARG_QUERY, ARG_REPORT_TOOL, ARG_SECOND_LABEL,
    ARG_THREADS, ARG_TOKEN, CliError, ENV_HOST, ENV_INPUTS, ENV_PROFILE, ENV_TOKEN,
};

/// CLI arguments for the `compare` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Derive a relaxed testset from every ground-truth testset, fetch routes \
                 for both forms, extract the results and produce one comparison report \
                 per testset. Options can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Compare ground-truth and relaxed routes"
)]
#[ortho_config(prefix = "RELAXROUTE")]
pub(crate) struct CompareArgs {
    /// Ground-truth testsets, free-form or CSV files.
    #[arg(value_name = ARG_INPUTS)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) inputs: Vec<Utf8PathBuf>,
    /// Directory to save the results to; must not exist yet.
    #[arg(short = 'o', long = ARG_OUTPUT, value_name = "dir")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Address of the routing backend, e.g. "https://api.mapbox.com".
    #[arg(long = ARG_HOST, value_name = "url")]
    #[serde(default)]
    pub(crate) host: Option<String>,
    /// Access token for the routing backend.
    #[arg(long = ARG_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) token: Option<String>,
    /// Routing profile, e.g. "mapbox/driving-traffic".
    #[arg(long = ARG_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// Default query parameters for every request, in URI form.
    #[arg(long = ARG_QUERY, value_name = "query")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Number of threads the fetcher may use.
    #[arg(long = ARG_THREADS, value_name = "n")]
    #[serde(default)]
    pub(crate) threads: Option<usize>,
    /// Label for the ground-truth form's files and results.
    #[arg(long = ARG_FIRST_LABEL, value_name = "label")]
    #[serde(default)]
    pub(crate) first_label: Option<String>,
    /// Label for the relaxed form's files and results.
    #[arg(long = ARG_SECOND_LABEL, value_name = "label")]
    #[serde(default)]
    pub(crate) second_label: Option<String>,
    /// Verbosity of the output.
    #[arg(long = ARG_LOG_LEVEL, value_enum, value_name = "level")]
    #[serde(default)]
    pub(crate) log_level: Option<Verbosity>,
    /// Command converting free-form testsets to CSV.
    #[arg(long = ARG_CONVERT_TOOL, value_name = "command")]
    #[serde(default)]
    pub(crate) convert_tool: Option<String>,
    /// Command fetching routes for a testset.
    #[arg(long = ARG_FETCH_TOOL, value_name = "command")]
    #[serde(default)]
    pub(crate) fetch_tool: Option<String>,
    /// Command extracting route results from responses.
    #[arg(long = ARG_EXTRACT_TOOL, value_name = "command")]
    #[serde(default)]
    pub(crate) extract_tool: Option<String>,
    /// Command producing the comparison report.
    #[arg(long = ARG_REPORT_TOOL, value_name = "command")]
    #[serde(default)]
    pub(crate) report_tool: Option<String>,
}

impl CompareArgs {
    pub(crate) fn into_config(self) -> Result<CompareConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CompareConfig::try_from(merged)
    }
}

/// External commands standing in for each collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ToolSet {
    pub(crate) convert: ToolCommand,
    pub(crate) fetch: ToolCommand,
    pub(crate) extract: ToolCommand,
    pub(crate) report: ToolCommand,
}

impl ToolSet {
    fn resolve(
        value: Option<String>,
        default: &str,
        field: &'static str,
    ) -> Result<ToolCommand, CliError> {
        value
            .as_deref()
            .unwrap_or(default)
            .parse()
            .map_err(|source| CliError::InvalidTool { field, source })
    }
}

/// Resolved `compare` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompareConfig {
    pub(crate) inputs: Vec<Utf8PathBuf>,
    pub(crate) output: Utf8PathBuf,
    pub(crate) backend: BackendOptions,
    pub(crate) labels: FormLabels,
    pub(crate) verbosity: Verbosity,
    pub(crate) tools: ToolSet,
}

impl TryFrom<CompareArgs> for CompareConfig {
    type Error = CliError;

    fn try_from(args: CompareArgs) -> Result<Self, Self::Error> {
        if args.inputs.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_INPUTS,
                env: ENV_INPUTS,
            });
        }
        let host = args.host.ok_or(CliError::MissingArgument {
            field: ARG_HOST,
            env: ENV_HOST,
        })?;
        if let Err(source) = Url::parse(&host) {
            return Err(CliError::InvalidHost { host, source });
        }
        let token = args.token.ok_or(CliError::MissingArgument {
            field: ARG_TOKEN,
            env: ENV_TOKEN,
        })?;
        let profile = args.profile.ok_or(CliError::MissingArgument {
            field: ARG_PROFILE,
            env: ENV_PROFILE,
        })?;
        let threads =
            NonZeroUsize::new(args.threads.unwrap_or(1)).ok_or(CliError::InvalidThreads)?;
        let labels = FormLabels::new(
            args.first_label
                .unwrap_or_else(|| DEFAULT_GROUND_TRUTH_LABEL.to_owned()),
            args.second_label
                .unwrap_or_else(|| DEFAULT_RELAXED_LABEL.to_owned()),
        )?;
        let tools = ToolSet {
            convert: ToolSet::resolve(args.convert_tool, DEFAULT_CONVERT_TOOL, ARG_CONVERT_TOOL)?,
            fetch: ToolSet::resolve(args.fetch_tool, DEFAULT_FETCH_TOOL, ARG_FETCH_TOOL)?,
            extract: ToolSet::resolve(args.extract_tool, DEFAULT_EXTRACT_TOOL, ARG_EXTRACT_TOOL)?,
            report: ToolSet::resolve(args.report_tool, DEFAULT_REPORT_TOOL, ARG_REPORT_TOOL)?,
        };
        Ok(Self {
            inputs: args.inputs,
            output: args.output.unwrap_or_else(default_output_dir),
            backend: BackendOptions {
                host,
                token,
                profile,
                default_query: args.query.filter(|query| !query.is_empty()),
                threads,
            },
            labels,
            verbosity: args.log_level.unwrap_or_default(),
            tools,
        })
    }
}

/// `results/test-<local timestamp>`.
fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(format!(
        "results/test-{}",
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    ))
}

/// Run the whole comparison and write `summary.json`.
///
/// Testsets are planned before the output directory is created, so a
/// missing or clashing input leaves nothing behind.
pub(crate) fn execute(config: &CompareConfig) -> Result<RunSummary, CliError> {
    debug!("Running compare with {config:?}");
    let plan = plan_testsets(&config.inputs)?;
    create_output_dir(&config.output)?;
    let layout = RunLayout::new(config.output.clone(), config.labels.clone());

    let converter = CommandConverter::new(config.tools.convert.clone());
    let testsets = TestsetBuilder::new(&layout, &converter).build_all(&plan);

    let level = config.verbosity.tool_level();
    let fetcher = CommandFetcher::new(config.tools.fetch.clone(), level);
    let extractor = CommandExtractor::new(config.tools.extract.clone(), level);
    let reporter = CommandReporter::new(config.tools.report.clone(), level);
    let collaborators = Collaborators {
        fetcher: &fetcher,
        extractor: &extractor,
        reporter: &reporter,
    };
    let summary = Pipeline::new(collaborators, &config.backend, &layout).run_prepared(testsets);

    let summary_path = layout.summary_file();
    write_summary(&summary, &summary_path)?;
    info!("Run summary written to {summary_path}");

    let failed = summary.failed_labels();
    if !failed.is_empty() {
        let labels = failed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CliError::LabelsFailed {
            labels,
            summary: summary_path,
        });
    }
    Ok(summary)
}

fn create_output_dir(path: &Utf8Path) -> Result<(), CliError> {
    relaxroute_fs::create_new_dir(path).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            CliError::OutputExists {
                path: path.to_path_buf(),
            }
        } else {
            CliError::CreateOutput {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn write_summary(summary: &RunSummary, path: &Utf8Path) -> Result<(), CliError> {
    let file = relaxroute_fs::create_utf8_file(path).map_err(|source| {
        CliError::CreateSummary {
            path: path.to_path_buf(),
            source,
        }
    })?;
    serde_json::to_writer_pretty(file, &summary.records()).map_err(|source| {
        CliError::WriteSummary {
            path: path.to_path_buf(),
            source,
        }
    })
}
