//! Behavioural tests for testset planning and building using rstest-bdd.

use std::cell::RefCell;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use relaxroute_core::test_support::StaticConverter;
use relaxroute_core::{
    Form, FormLabels, PipelineError, RequestRecord, RunLayout, Stage, TestsetPair,
};
use relaxroute_data::{TestsetBuilder, TestsetError, plan_testsets};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const HEADER: &str = "id,desc,expected,src,waypoints,dst,query\n";

/// World state for testset builder scenarios.
struct BuilderWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    inputs: RefCell<Vec<Utf8PathBuf>>,
    result: RefCell<Option<Result<Vec<Result<TestsetPair, PipelineError>>, TestsetError>>>,
}

impl BuilderWorld {
    fn add_input(&self, quoted: &str, contents: Option<&str>) {
        // Gherkin quotes arrive with the captured word.
        let path = self.root.join(quoted.trim_matches('"'));
        if let Some(contents) = contents {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create input directory");
            }
            fs::write(&path, contents).expect("write input");
        }
        self.inputs.borrow_mut().push(path);
    }

    fn pair(&self, label: &str) -> TestsetPair {
        let result = self.result.borrow();
        let pairs = result
            .as_ref()
            .expect("testsets should have been built")
            .as_ref()
            .expect("build should succeed");
        pairs
            .iter()
            .filter_map(|built| built.as_ref().ok())
            .find(|pair| pair.label().as_str() == label)
            .cloned()
            .unwrap_or_else(|| panic!("no testset labelled {label}"))
    }

    fn build_failure(&self, label: &str) -> (Stage, String) {
        let result = self.result.borrow();
        let built = result
            .as_ref()
            .expect("testsets should have been built")
            .as_ref()
            .expect("planning should succeed");
        built
            .iter()
            .filter_map(|built| built.as_ref().err())
            .find(|err| err.label().as_str() == label)
            .map(|err| (err.stage(), err.to_string()))
            .unwrap_or_else(|| panic!("testset {label} did not fail"))
    }

    fn error_message(&self) -> String {
        let result = self.result.borrow();
        match result.as_ref().expect("testsets should have been built") {
            Ok(_) => panic!("expected the build to fail"),
            Err(err) => err.to_string(),
        }
    }
}

#[fixture]
fn world() -> BuilderWorld {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    BuilderWorld {
        _dir: dir,
        root,
        inputs: RefCell::new(Vec::new()),
        result: RefCell::new(None),
    }
}

#[given("a tabular input {name:word} with a waypoint request")]
fn given_waypoint_input(world: &BuilderWorld, name: String) {
    let contents = format!("{HEADER}1,a,ok,A,wp1;wp2,B,layers=0;1;2\n2,b,ok,C,,D,\n");
    world.add_input(&name, Some(&contents));
}

#[given("a tabular input {name:word} without waypoints")]
fn given_plain_input(world: &BuilderWorld, name: String) {
    let contents = format!("{HEADER}1,a,ok,A,,B,\n");
    world.add_input(&name, Some(&contents));
}

#[given("a tabular input {name:word} with a short row")]
fn given_ragged_input(world: &BuilderWorld, name: String) {
    let contents = format!("{HEADER}1,a,ok,A,wp1;wp2,B,layers=0;1;2\n2,short,ok\n");
    world.add_input(&name, Some(&contents));
}

#[given("a free-form input {name:word}")]
fn given_freeform_input(world: &BuilderWorld, name: String) {
    world.add_input(&name, Some("A -> B"));
}

#[given("a missing input {name:word}")]
fn given_missing_input(world: &BuilderWorld, name: String) {
    world.add_input(&name, None);
}

#[when("the testsets are built")]
fn when_built(world: &BuilderWorld) {
    let layout = RunLayout::new(world.root.join("run"), FormLabels::default());
    let converter =
        StaticConverter::new(format!("{HEADER}1,a,ok,A,,B,\n")).rejecting("broken.txt");
    let inputs = world.inputs.borrow();
    let result = plan_testsets(inputs.as_slice())
        .map(|plan| TestsetBuilder::new(&layout, &converter).build_all(&plan));
    world.result.replace(Some(result));
}

#[then("testset {label:word} has {count} requests in each form")]
fn then_request_count(world: &BuilderWorld, label: String, count: usize) {
    let pair = world.pair(label.trim_matches('"'));
    assert_eq!(pair.requests(), count);
    for form in Form::BOTH {
        assert_eq!(pair.artifact(form).records, count);
    }
}

#[then("the relaxed form of {label:word} has no waypoints")]
fn then_no_waypoints(world: &BuilderWorld, label: String) {
    let pair = world.pair(label.trim_matches('"'));
    let records: Vec<RequestRecord> = csv::Reader::from_path(&pair.artifact(Form::Relaxed).path)
        .expect("open relaxed testset")
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("relaxed testset parses");
    assert!(records.iter().all(|record| record.waypoints.is_empty()));
    assert_eq!(
        records.first().map(|record| record.query.as_str()),
        Some("layers=0;2")
    );
}

#[then("testset {label:word} is not degenerate")]
fn then_not_degenerate(world: &BuilderWorld, label: String) {
    assert!(!world.pair(label.trim_matches('"')).is_degenerate());
}

#[then("testset {label:word} is degenerate")]
fn then_degenerate(world: &BuilderWorld, label: String) {
    assert!(world.pair(label.trim_matches('"')).is_degenerate());
}

#[then("the run fails naming testset {label:word}")]
fn then_fails_naming_label(world: &BuilderWorld, label: String) {
    let message = world.error_message();
    assert!(
        message.contains(&format!("testset {}", label.trim_matches('"'))),
        "unexpected error: {message}"
    );
}

#[then("testset {label:word} failed to build")]
fn then_build_failed(world: &BuilderWorld, label: String) {
    let (stage, message) = world.build_failure(label.trim_matches('"'));
    assert_eq!(stage, Stage::Build);
    assert!(message.contains("broken.txt"), "unexpected error: {message}");
}

#[then("the run fails naming path {path:word}")]
fn then_fails_naming_path(world: &BuilderWorld, path: String) {
    let message = world.error_message();
    let expected = Utf8Path::new(path.trim_matches('"'));
    assert!(message.contains(expected.as_str()), "unexpected error: {message}");
}

#[scenario(path = "tests/features/testset_builder.feature", index = 0)]
fn tabular_input_copied_and_relaxed(world: BuilderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/testset_builder.feature", index = 1)]
fn input_without_waypoints_flagged(world: BuilderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/testset_builder.feature", index = 2)]
fn shared_base_names_rejected(world: BuilderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/testset_builder.feature", index = 3)]
fn missing_input_aborts(world: BuilderWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/testset_builder.feature", index = 4)]
fn failed_build_isolated(world: BuilderWorld) {
    let _ = world;
}
