//! Read-only filesystem helpers: document loading, root-relative path
//! resolution, and latest-file discovery.

use crate::models::Report;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Name fragment that excludes a file from latest-file discovery.
pub const ARCHIVED_MARKER: &str = ".archived.";

#[derive(Debug, thiserror::Error)]
/// Why a document could not be read as text.
pub enum ReadError {
    #[error("File does not exist")]
    Missing,
    #[error("Path is not a file")]
    NotAFile,
    #[error("File is not UTF-8 decodable")]
    NotUtf8,
    #[error("File could not be read: {0}")]
    Io(#[from] io::Error),
}

/// Read a UTF-8 document.
pub fn read_text(path: &Path) -> Result<String, ReadError> {
    if !path.exists() {
        return Err(ReadError::Missing);
    }
    if !path.is_file() {
        return Err(ReadError::NotAFile);
    }
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| ReadError::NotUtf8)
}

/// Read a document, recording a read failure as one ERROR on `report`.
pub fn read_for_report(path: &Path, report: &mut Report) -> Option<String> {
    match read_text(path) {
        Ok(text) => Some(text),
        Err(e) => {
            report.error(e.to_string(), &path.display().to_string());
            None
        }
    }
}

/// Resolve `maybe_relative` under `base`. Absolute paths are returned as-is;
/// relative ones are joined and normalized without touching the filesystem.
pub fn resolve_under(base: &Path, maybe_relative: &Path) -> PathBuf {
    if maybe_relative.is_absolute() {
        return maybe_relative.to_path_buf();
    }
    normalize(&base.join(maybe_relative))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Most recently modified file in `directory` matching `pattern`, skipping
/// archived snapshots. Ties keep the later glob entry.
pub fn latest_file(directory: &Path, pattern: &str) -> Option<PathBuf> {
    if !directory.is_dir() {
        return None;
    }
    let escaped = glob::Pattern::escape(&directory.to_string_lossy());
    let full = format!("{}/{}", escaped.trim_end_matches('/'), pattern);
    glob::glob(&full)
        .ok()?
        .flatten()
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().contains(ARCHIVED_MARKER))
                .unwrap_or(false)
        })
        .filter_map(|p| {
            let modified = fs::metadata(&p).and_then(|m| m.modified()).ok()?;
            Some((modified, p))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, p)| p)
}
