//! Row-by-row derivation of the relaxed form of a testset.

use std::collections::HashSet;
use std::io::{Read, Write};

use camino::Utf8Path;
use log::warn;
use relaxroute_core::{RECORD_FIELDS, RequestRecord, TestsetLabel};

use super::TestsetError;

/// What relaxing one testset observed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Relaxation {
    pub(crate) records: usize,
    pub(crate) had_waypoints: bool,
    pub(crate) unrelaxed_ids: Vec<String>,
}

#[derive(Debug)]
pub(crate) enum RowError {
    Read(csv::Error),
    Write(csv::Error),
    DuplicateId(String),
}

/// Relax the ground-truth file at `ground_truth` into `relaxed`.
pub(crate) fn relax_testset(
    label: &TestsetLabel,
    ground_truth: &Utf8Path,
    relaxed: &Utf8Path,
) -> Result<Relaxation, TestsetError> {
    let source = relaxroute_fs::open_utf8_file(ground_truth).map_err(|err| TestsetError::Read {
        path: ground_truth.to_path_buf(),
        source: err.into(),
    })?;
    let sink = relaxroute_fs::create_utf8_file(relaxed).map_err(|err| TestsetError::Write {
        path: relaxed.to_path_buf(),
        source: err.into(),
    })?;
    relax_rows(label, source, sink).map_err(|err| match err {
        RowError::Read(source) => TestsetError::Read {
            path: ground_truth.to_path_buf(),
            source,
        },
        RowError::Write(source) => TestsetError::Write {
            path: relaxed.to_path_buf(),
            source,
        },
        RowError::DuplicateId(id) => TestsetError::DuplicateId {
            path: ground_truth.to_path_buf(),
            id,
        },
    })
}

/// Copy every record from `source` to `sink` in relaxed form.
///
/// The header is always written, so an empty testset still yields a valid
/// relaxed file. Rows shorter than the header read their missing trailing
/// fields as empty. A record whose query cannot be relaxed keeps its query
/// and loses its waypoints.
pub(crate) fn relax_rows(
    label: &TestsetLabel,
    source: impl Read,
    sink: impl Write,
) -> Result<Relaxation, RowError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.headers().map_err(RowError::Read)?.clone();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(sink);
    writer.write_record(RECORD_FIELDS).map_err(RowError::Write)?;

    let mut relaxation = Relaxation::default();
    let mut seen = HashSet::new();
    let mut row = csv::StringRecord::new();
    while reader.read_record(&mut row).map_err(RowError::Read)? {
        while row.len() < headers.len() {
            row.push_field("");
        }
        let record: RequestRecord = row.deserialize(Some(&headers)).map_err(RowError::Read)?;
        if !seen.insert(record.id.clone()) {
            return Err(RowError::DuplicateId(record.id));
        }
        relaxation.had_waypoints |= record.has_waypoints();
        let relaxed = record.to_relaxed().unwrap_or_else(|err| {
            warn!(
                "Testset {label}: request {id}: cannot relax query ({err}); copying it unchanged",
                id = record.id
            );
            relaxation.unrelaxed_ids.push(record.id.clone());
            record.without_waypoints()
        });
        writer.serialize(&relaxed).map_err(RowError::Write)?;
        relaxation.records += 1;
    }
    writer
        .flush()
        .map_err(|err| RowError::Write(err.into()))?;
    Ok(relaxation)
}
