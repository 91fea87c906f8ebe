//! Test helpers for building `compare` configurations and scripted tools.

use super::*;
use crate::compare::{CompareArgs, CompareConfig, ToolSet};
use camino::Utf8PathBuf;
use relaxroute_core::{BackendOptions, FormLabels};
use relaxroute_data::ToolCommand;
use std::{fs, num::NonZeroUsize};
use tempfile::TempDir;

/// Arguments that pass validation.
pub(super) fn valid_args() -> CompareArgs {
    CompareArgs {
        inputs: vec![Utf8PathBuf::from("suite.csv")],
        host: Some("https://api.example.com".to_owned()),
        token: Some("sk.secret".to_owned()),
        profile: Some("mapbox/driving".to_owned()),
        ..CompareArgs::default()
    }
}

/// A tool running `body` through `sh -c`; stage arguments start at `$1`.
pub(super) fn script(body: &str) -> ToolCommand {
    ToolCommand::new("sh").with_args(["-c", body, "tool"])
}

pub(super) const FETCH_OK: &str = r#"printf '[]' > "$4""#;
pub(super) const FETCH_FAILS: &str = "exit 1";
pub(super) const EXTRACT_ALL: &str = r#"cp "$2" "$6"; echo $(( $(wc -l < "$6") - 1 ))"#;
pub(super) const EXTRACT_LOSING_RELAXED: &str = r#"case "$2" in
  *_rel.csv) sed '$d' "$2" > "$6" ;;
  *) cp "$2" "$6" ;;
esac
echo $(( $(wc -l < "$6") - 1 ))"#;
pub(super) const REPORT_MIN: &str = r#"a=$(( $(wc -l < "$6") - 1 ))
b=$(( $(wc -l < "$8") - 1 ))
echo "pair" > "${10}"
if [ "$a" -lt "$b" ]; then echo "$a"; else echo "$b"; fi"#;

pub(super) const TESTSET: &str = "\
id,desc,expected,src,waypoints,dst,query
1,via two waypoints,ok,A,wp1;wp2,B,bearings=10;20;30&layers=0
2,direct,ok,C,,D,
3,direct with options,ok,E,,F,overview=full
";

/// A scratch directory holding one tabular testset.
pub(super) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("suite.csv"), TESTSET).expect("write testset");
        Self { dir }
    }

    pub(super) fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf-8 tempdir")
    }

    pub(super) fn output(&self) -> Utf8PathBuf {
        self.root().join("results")
    }

    /// A configuration running the given fetch and extract scripts.
    pub(super) fn config(&self, fetch: &str, extract: &str) -> CompareConfig {
        CompareConfig {
            inputs: vec![self.root().join("suite.csv")],
            output: self.output(),
            backend: BackendOptions {
                host: "https://api.example.com".to_owned(),
                token: "sk.secret".to_owned(),
                profile: "mapbox/driving".to_owned(),
                default_query: None,
                threads: NonZeroUsize::MIN,
            },
            labels: FormLabels::default(),
            verbosity: Verbosity::Info,
            tools: ToolSet {
                convert: script("exit 1"),
                fetch: script(fetch),
                extract: script(extract),
                report: script(REPORT_MIN),
            },
        }
    }
}
