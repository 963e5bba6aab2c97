//! Session log discovery and loading.
//!
//! Entry points are [`parse_single_file`] for one export and
//! [`parse_folder`] for a directory of exports. Both return a
//! [`RecordSet`] sorted by solve time.

use std::io;
use std::path::{Path, PathBuf};

use cstimer_core::models::RecordSet;
use cstimer_core::settings::{ParseOptions, SESSION_LOG_EXTENSION};
use cstimer_core::{CsTimerError, Result};
use tracing::{debug, warn};

use crate::document::SessionLog;

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the session logs directly inside `dir`, sorted by path.
///
/// Only regular files with a `.txt` extension count. Subdirectories are not
/// descended into. An entry that cannot be resolved (e.g. a dangling
/// symlink named `*.txt`) fails the whole call.
pub fn find_session_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 || err.path().is_some_and(has_log_extension) => {
                return Err(walk_error(dir, err));
            }
            Err(err) => {
                debug!("Skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        if entry.file_type().is_file() && has_log_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Parse one csTimer export with the default options.
pub fn parse_single_file(path: &Path) -> Result<RecordSet> {
    parse_single_file_with(path, &ParseOptions::default())
}

/// Parse one csTimer export.
///
/// Fails with [`CsTimerError::NotFound`] when `path` is not a regular file.
pub fn parse_single_file_with(path: &Path, options: &ParseOptions) -> Result<RecordSet> {
    if !path.is_file() {
        return Err(CsTimerError::NotFound(path.to_path_buf()));
    }
    read_log(path, options)
}

/// Parse every session log in a folder with the default options.
pub fn parse_folder(path: &Path) -> Result<RecordSet> {
    parse_folder_with(path, &ParseOptions::default())
}

/// Parse every session log in a folder and merge them.
///
/// Any timestamp that occurs more than once across the merged records is
/// removed completely; none of its copies survive. A single malformed file
/// fails the whole call.
pub fn parse_folder_with(path: &Path, options: &ParseOptions) -> Result<RecordSet> {
    if !path.is_dir() {
        return Err(CsTimerError::NotADirectory(path.to_path_buf()));
    }

    let files = find_session_files(path)?;
    if files.is_empty() {
        return Err(CsTimerError::NoLogFiles(path.to_path_buf()));
    }

    let sets = files
        .iter()
        .map(|file| read_log(file, options))
        .collect::<Result<Vec<_>>>()?;

    let (merged, dropped) = RecordSet::merge_unique(sets);
    if dropped > 0 {
        warn!(
            "Dropped {} records with colliding timestamps from {}",
            dropped,
            path.display()
        );
    }

    debug!(
        "Merged {} records from {} files in {}",
        merged.len(),
        files.len(),
        path.display()
    );

    Ok(merged)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn has_log_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SESSION_LOG_EXTENSION)
        .unwrap_or(false)
}

/// Map a directory walk failure onto the error of the entry it concerns.
fn walk_error(dir: &Path, err: walkdir::Error) -> CsTimerError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf());
    let source = match err.into_io_error() {
        Some(source) => source,
        None => io::Error::other("filesystem loop while listing session logs"),
    };
    if source.kind() == io::ErrorKind::NotFound {
        CsTimerError::NotFound(path)
    } else {
        CsTimerError::FileRead { path, source }
    }
}

/// Read, decode and flatten one export.
fn read_log(path: &Path, options: &ParseOptions) -> Result<RecordSet> {
    let text = std::fs::read_to_string(path).map_err(|source| CsTimerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let log = SessionLog::parse(path, &text)?;
    let records = RecordSet::from_unsorted(log.to_records(options)?);

    debug!(
        "File {}: {} sessions, {} records",
        path.display(),
        log.sessions.len(),
        records.len()
    );

    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
