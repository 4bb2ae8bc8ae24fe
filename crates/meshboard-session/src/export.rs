//! Session files on disk
//!
//! Exported documents are named `<prefix>_<YYYYMMDD>_<HHMMSS>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use crate::codec::SessionDocument;
use crate::error::{ParseError, SessionError};

pub const DEFAULT_EXPORT_PREFIX: &str = "stl_session";

/// File name for a session exported at `at`.
pub fn export_file_name<Tz: TimeZone>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.json", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// Write `document` into `dir` under a timestamped name, creating the
/// directory if needed. Returns the path written.
pub fn save_to_dir(
    dir: &Path,
    prefix: &str,
    document: &SessionDocument,
) -> Result<PathBuf, SessionError> {
    fs::create_dir_all(dir).map_err(|e| SessionError::Io(dir.to_path_buf(), e))?;

    let path = dir.join(export_file_name(prefix, &Local::now()));
    let json = document.to_json().map_err(ParseError::from)?;
    fs::write(&path, json).map_err(|e| SessionError::Io(path.clone(), e))?;

    info!(
        "Saved session with {} assets to {:?}",
        document.uploaded_files.len(),
        path
    );
    Ok(path)
}

/// Read and parse a session file. Nothing is applied to any session here.
pub fn load_from_path(path: &Path) -> Result<SessionDocument, SessionError> {
    let json = fs::read_to_string(path).map_err(|e| SessionError::Io(path.to_path_buf(), e))?;
    let document = SessionDocument::from_json(&json)?;
    info!(
        "Read session with {} assets from {:?}",
        document.uploaded_files.len(),
        path
    );
    Ok(document)
}
