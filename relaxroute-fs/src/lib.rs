//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Every run writes into a fresh output tree, so the helpers here distinguish
//! between creating a directory that must not exist yet
//! ([`create_new_dir`]) and idempotently preparing working directories
//! ([`ensure_dir`]).
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create (or truncate) a file for writing, resolving its parent directory
/// through cap-std.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Open the directory holding `path` and return it with the final component.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let Some(name) = path.file_name() else {
        return Err(io::Error::other(format!("{path} does not name a file")));
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name.to_owned()))
}

/// Copy `from` to `to`, replacing any existing file at `to`.
///
/// Returns the number of bytes copied.
pub fn copy_file(from: &Utf8Path, to: &Utf8Path) -> io::Result<u64> {
    let (source_dir, source_name) = open_dir_and_file(from)?;
    let (target_dir, target_name) = open_dir_and_file(to)?;
    source_dir.copy(source_name.as_str(), &target_dir, target_name.as_str())
}

/// Create every missing directory along `path`.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
    let (anchor, rest) = anchored(path)?;
    if rest.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(rest)
}

fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    path.parent().map_or(Ok(()), ensure_dir)
}

/// Create `path` as a new directory, creating its parents as needed.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] when `path` already exists, so
/// callers can refuse to reuse a previous run's output tree.
pub fn create_new_dir(path: &Utf8Path) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (parent, name) = open_dir_and_file(path)?;
    parent.create_dir(name.as_str())
}

/// Return whether a path exists and is a regular file using capability-based IO.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Open the filesystem root an absolute path hangs from, or the working
/// directory for a relative one, and return the remainder below it.
fn anchored(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &Utf8Path)> {
    let anchor = if path.is_absolute() {
        path.ancestors().last().unwrap_or(path)
    } else {
        Utf8Path::new(".")
    };
    let rest = path.strip_prefix(anchor).unwrap_or(path);
    let dir = fs_utf8::Dir::open_ambient_dir(anchor, ambient_authority())?;
    Ok((dir, rest))
}
