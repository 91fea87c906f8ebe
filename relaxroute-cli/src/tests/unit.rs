//! Focused unit tests covering `compare` configuration validation.

use super::helpers::{Workspace, valid_args};
use super::*;
use crate::compare::{CompareArgs, CompareConfig, execute};
use relaxroute_core::{FormLabelError, LabelError};
use relaxroute_data::{DEFAULT_FETCH_TOOL, TestsetError, ToolCommand};
use rstest::rstest;

fn missing(field: &'static str) -> CompareArgs {
    let mut args = valid_args();
    match field {
        ARG_HOST => args.host = None,
        ARG_TOKEN => args.token = None,
        ARG_PROFILE => args.profile = None,
        ARG_INPUTS => args.inputs.clear(),
        other => panic!("no such field {other}"),
    }
    args
}

#[rstest]
#[case(ARG_INPUTS, ENV_INPUTS)]
#[case(ARG_HOST, ENV_HOST)]
#[case(ARG_TOKEN, ENV_TOKEN)]
#[case(ARG_PROFILE, ENV_PROFILE)]
fn converting_without_required_fields_errors(
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let err = CompareConfig::try_from(missing(field)).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: absent,
            env,
        } => {
            assert_eq!(absent, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn defaults_fill_optional_fields() {
    let config = CompareConfig::try_from(valid_args()).expect("valid arguments");
    assert_eq!(config.backend.threads.get(), 1);
    assert_eq!(config.labels, relaxroute_core::FormLabels::default());
    assert_eq!(config.verbosity, Verbosity::Info);
    assert_eq!(config.tools.fetch, ToolCommand::new(DEFAULT_FETCH_TOOL));
    assert_eq!(config.backend.default_query, None);
    assert!(config.output.as_str().starts_with("results/test-"));
}

#[rstest]
#[case("api.example.com")]
#[case("")]
fn relative_host_is_rejected(#[case] host: &str) {
    let args = CompareArgs {
        host: Some(host.to_owned()),
        ..valid_args()
    };
    let err = CompareConfig::try_from(args).expect_err("relative host");
    assert!(matches!(err, CliError::InvalidHost { host: rejected, .. } if rejected == host));
}

#[rstest]
fn zero_threads_are_rejected() {
    let args = CompareArgs {
        threads: Some(0),
        ..valid_args()
    };
    let err = CompareConfig::try_from(args).expect_err("zero threads");
    assert!(matches!(err, CliError::InvalidThreads));
}

#[rstest]
fn identical_labels_are_rejected() {
    let args = CompareArgs {
        first_label: Some("same".to_owned()),
        second_label: Some("same".to_owned()),
        ..valid_args()
    };
    let err = CompareConfig::try_from(args).expect_err("identical labels");
    assert!(matches!(
        err,
        CliError::InvalidLabels(FormLabelError::Identical { .. })
    ));
}

#[rstest]
fn blank_tool_is_rejected() {
    let args = CompareArgs {
        report_tool: Some("   ".to_owned()),
        ..valid_args()
    };
    let err = CompareConfig::try_from(args).expect_err("blank tool");
    assert!(matches!(
        err,
        CliError::InvalidTool {
            field: ARG_REPORT_TOOL,
            ..
        }
    ));
}

#[rstest]
fn tool_commands_keep_leading_arguments() {
    let args = CompareArgs {
        fetch_tool: Some("python3 -m rq.fetch_routes".to_owned()),
        query: Some(String::new()),
        ..valid_args()
    };
    let config = CompareConfig::try_from(args).expect("valid arguments");
    assert_eq!(
        config.tools.fetch,
        ToolCommand::new("python3").with_args(["-m", "rq.fetch_routes"])
    );
    assert_eq!(config.backend.default_query, None);
}

#[rstest]
fn cli_parses_the_compare_subcommand() {
    let cli = Cli::try_parse_from([
        "relaxroute",
        "compare",
        "a.csv",
        "b.txt",
        "--host",
        "https://api.example.com",
        "--threads",
        "4",
        "--log-level",
        "critical",
        "--first-label",
        "full",
    ])
    .expect("arguments parse");
    let Command::Compare(args) = cli.command;
    assert_eq!(args.inputs.len(), 2);
    assert_eq!(args.threads, Some(4));
    assert_eq!(args.log_level, Some(Verbosity::Critical));
    assert_eq!(args.first_label.as_deref(), Some("full"));
}

#[rstest]
fn token_never_appears_in_config_debug_output() {
    let config = CompareConfig::try_from(valid_args()).expect("valid arguments");
    assert!(!format!("{config:?}").contains("sk.secret"));
}

#[rstest]
fn input_named_like_the_summary_is_rejected_before_output_exists() {
    let workspace = Workspace::new();
    let input = workspace.root().join("summary.json.csv");
    std::fs::write(&input, "id,desc,expected,src,waypoints,dst,query\n").expect("write input");
    let mut config = workspace.config("exit 1", "exit 1");
    config.inputs.push(input);

    let err = execute(&config).expect_err("reserved label");

    assert!(matches!(
        err,
        CliError::Testset(TestsetError::Label(LabelError::Reserved { .. }))
    ));
    assert!(!workspace.output().exists());
}
