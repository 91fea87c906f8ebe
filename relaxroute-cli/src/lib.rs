//! Command-line interface comparing ground-truth routing requests with their
//! relaxed, endpoints-only counterparts.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod compare;
mod error;
mod logging;

pub use error::CliError;
pub use logging::Verbosity;

use compare::CompareArgs;

const ARG_INPUTS: &str = "input";
const ARG_OUTPUT: &str = "output";
const ARG_HOST: &str = "host";
const ARG_TOKEN: &str = "token";
const ARG_PROFILE: &str = "profile";
const ARG_QUERY: &str = "query";
const ARG_THREADS: &str = "threads";
const ARG_FIRST_LABEL: &str = "first-label";
const ARG_SECOND_LABEL: &str = "second-label";
const ARG_LOG_LEVEL: &str = "log-level";
const ARG_CONVERT_TOOL: &str = "convert-tool";
const ARG_FETCH_TOOL: &str = "fetch-tool";
const ARG_EXTRACT_TOOL: &str = "extract-tool";
const ARG_REPORT_TOOL: &str = "report-tool";
const ENV_INPUTS: &str = "RELAXROUTE_CMDS_COMPARE_INPUTS";
const ENV_HOST: &str = "RELAXROUTE_CMDS_COMPARE_HOST";
const ENV_TOKEN: &str = "RELAXROUTE_CMDS_COMPARE_TOKEN";
const ENV_PROFILE: &str = "RELAXROUTE_CMDS_COMPARE_PROFILE";

/// Run the relaxroute CLI with the current process arguments and
/// environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, a
/// precondition of the run fails, or any testset stops before its report.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Compare(args) => {
            let config = args.into_config()?;
            logging::init(config.verbosity)?;
            compare::execute(&config)?;
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "relaxroute",
    about = "Compare routes for ground-truth requests with routes for the same requests \
             relaxed to their endpoints",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build testset pairs, fetch both forms and report the differences.
    Compare(CompareArgs),
}

#[cfg(test)]
mod tests;
