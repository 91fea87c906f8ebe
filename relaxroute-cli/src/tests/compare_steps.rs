//! Behaviour-driven step definitions driving `compare` runs with scripted
//! tools.

use super::helpers::{
    EXTRACT_ALL, EXTRACT_LOSING_RELAXED, FETCH_FAILS, FETCH_OK, Workspace,
};
use super::*;
use crate::compare::{CompareConfig, execute};
use relaxroute_core::{Form, RunLayout, RunSummary, SUMMARY_FILE_NAME, TestsetLabel};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::{cell::RefCell, fs};

/// Scenario state for a single `compare` run.
struct CompareWorld {
    workspace: Workspace,
    config: RefCell<Option<CompareConfig>>,
    outcome: RefCell<Option<Result<RunSummary, CliError>>>,
}

impl CompareWorld {
    fn configure(&self, fetch: &str, extract: &str) {
        self.config
            .replace(Some(self.workspace.config(fetch, extract)));
    }

    fn summary(&self) -> Vec<Value> {
        let path = self.workspace.output().join(SUMMARY_FILE_NAME);
        let contents = fs::read_to_string(&path).expect("summary should be written");
        serde_json::from_str(&contents).expect("summary is a JSON array")
    }

    fn summary_for(&self, label: &str) -> Value {
        self.summary()
            .into_iter()
            .find(|record| record["label"] == label)
            .unwrap_or_else(|| panic!("no summary record for {label}"))
    }
}

#[fixture]
fn compare_world() -> CompareWorld {
    CompareWorld {
        workspace: Workspace::new(),
        config: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a tabular testset with three requests")]
fn tabular_testset(#[from(compare_world)] world: &CompareWorld) {
    assert!(world.workspace.root().join("suite.csv").is_file());
}

#[given("tools that lose nothing")]
fn lossless_tools(#[from(compare_world)] world: &CompareWorld) {
    world.configure(FETCH_OK, EXTRACT_ALL);
}

#[given("an extractor that loses one relaxed response")]
fn lossy_extractor(#[from(compare_world)] world: &CompareWorld) {
    world.configure(FETCH_OK, EXTRACT_LOSING_RELAXED);
}

#[given("a fetch tool that always fails")]
fn failing_fetch(#[from(compare_world)] world: &CompareWorld) {
    world.configure(FETCH_FAILS, EXTRACT_ALL);
}

#[given("a free-form input {name:word} the converter cannot read")]
fn unconvertible_input(#[from(compare_world)] world: &CompareWorld, name: String) {
    let path = world.workspace.root().join(name.trim_matches('"'));
    fs::write(&path, "A -> B").expect("write free-form input");
    let mut config = world.config.borrow_mut();
    let config = config.as_mut().expect("tools should be configured");
    config.inputs.insert(0, path);
}

#[given("the output directory already exists")]
fn existing_output(#[from(compare_world)] world: &CompareWorld) {
    fs::create_dir_all(world.workspace.output()).expect("create output directory");
}

#[when("I run the compare command")]
fn run_compare(#[from(compare_world)] world: &CompareWorld) {
    let config = world.config.borrow();
    let config = config.as_ref().expect("tools should be configured");
    world.outcome.replace(Some(execute(config)));
}

#[then("the run succeeds")]
fn run_succeeds(#[from(compare_world)] world: &CompareWorld) {
    let outcome = world.outcome.borrow();
    let result = outcome.as_ref().expect("outcome should exist");
    assert!(result.is_ok(), "run failed: {result:?}");
}

#[then("the report for {label:word} exists")]
fn report_exists(#[from(compare_world)] world: &CompareWorld, label: String) {
    let label = TestsetLabel::from_input(label.trim_matches('"').as_ref()).expect("label");
    let layout = RunLayout::new(world.workspace.output(), Default::default());
    let report = layout.report_file(&label);
    assert!(report.is_file(), "missing report {report}");
    for form in Form::BOTH {
        assert!(layout.response_csv(&label, form).is_file());
    }
}

#[then("the summary marks {label:word} as matched")]
fn summary_matched(#[from(compare_world)] world: &CompareWorld, label: String) {
    let record = world.summary_for(label.trim_matches('"'));
    assert_eq!(record["reconciliation"]["status"], "matched");
    assert_eq!(record["requested"], 3);
    assert_eq!(record["compared"], 3);
}

#[then("the summary marks {label:word} as missing {count} request")]
fn summary_missing(#[from(compare_world)] world: &CompareWorld, label: String, count: u64) {
    let record = world.summary_for(label.trim_matches('"'));
    assert_eq!(record["reconciliation"]["status"], "missing");
    assert_eq!(record["reconciliation"]["count"], count);
    assert_eq!(record["extracted"]["ground_truth"], 3);
    assert_eq!(record["extracted"]["relaxed"], 2);
}

#[then("the run fails naming {label:word}")]
fn run_fails(#[from(compare_world)] world: &CompareWorld, label: String) {
    let outcome = world.outcome.borrow();
    match outcome.as_ref().expect("outcome should exist") {
        Err(CliError::LabelsFailed { labels, .. }) => {
            assert_eq!(labels, label.trim_matches('"'));
        }
        other => panic!("expected LabelsFailed, found {other:?}"),
    }
}

#[then("the summary records a fetch failure for {label:word}")]
fn summary_failure(#[from(compare_world)] world: &CompareWorld, label: String) {
    let record = world.summary_for(label.trim_matches('"'));
    assert!(record["report"].is_null());
    let error = record["error"].as_str().expect("error message");
    assert!(error.contains("fetch"), "unexpected error {error}");
}

#[then("the summary records a build failure for {label:word}")]
fn summary_build_failure(#[from(compare_world)] world: &CompareWorld, label: String) {
    let record = world.summary_for(label.trim_matches('"'));
    assert!(record["requested"].is_null());
    assert!(record["report"].is_null());
    let error = record["error"].as_str().expect("error message");
    assert!(error.contains("could not be built"), "unexpected error {error}");
}

#[then("the run is rejected because the output exists")]
fn output_exists(#[from(compare_world)] world: &CompareWorld) {
    let outcome = world.outcome.borrow();
    match outcome.as_ref().expect("outcome should exist") {
        Err(CliError::OutputExists { path }) => assert_eq!(*path, world.workspace.output()),
        other => panic!("expected OutputExists, found {other:?}"),
    }
}

#[scenario(path = "tests/features/compare.feature", name = "every request is compared")]
fn every_request_compared(#[from(compare_world)] world: CompareWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/compare.feature", name = "a relaxed response goes missing")]
fn relaxed_response_missing(#[from(compare_world)] world: CompareWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/compare.feature", name = "a failing fetch tool fails the run")]
fn failing_fetch_fails_run(#[from(compare_world)] world: CompareWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/compare.feature",
    name = "an existing output directory is rejected"
)]
fn existing_output_rejected(#[from(compare_world)] world: CompareWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/compare.feature",
    name = "an unconvertible input fails alone"
)]
fn unconvertible_input_fails_alone(#[from(compare_world)] world: CompareWorld) {
    let _ = world;
}
