//! Reading and writing sidecar files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sidecar_common::{SidecarError, SidecarResult};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::document::MetadataDocument;
use crate::validation::ensure_valid;

/// File name of the sidecar written next to exported geometry.
pub const SIDECAR_FILE_NAME: &str = "metadata.json";

/// Write `doc` as `metadata.json` in `dir` and return its path.
pub fn write_sidecar(dir: &Path, doc: &MetadataDocument) -> SidecarResult<PathBuf> {
    write_sidecar_as(dir, SIDECAR_FILE_NAME, doc)
}

/// Write `doc` under a custom file name in `dir`.
///
/// The document is validated first and nothing is written if it has
/// errors. The JSON goes to a temporary file in the same directory that is
/// then renamed over the target, so readers never see a partial file.
pub fn write_sidecar_as(
    dir: &Path,
    file_name: &str,
    doc: &MetadataDocument,
) -> SidecarResult<PathBuf> {
    ensure_valid(doc)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let json = doc.to_json_pretty()?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path)
        .map_err(|e| SidecarError::IoError(format!("{}: {}", path.display(), e.error)))?;

    info!(path = %path.display(), files = doc.file_count(), "Wrote sidecar");
    Ok(path)
}

/// Read and parse a sidecar file.
///
/// The document is not validated; see [`crate::validate_document`].
pub fn read_sidecar(path: &Path) -> SidecarResult<MetadataDocument> {
    let text = fs::read_to_string(path)
        .map_err(|e| SidecarError::IoError(format!("{}: {}", path.display(), e)))?;
    let doc = MetadataDocument::from_json(&text).map_err(|e| match e {
        SidecarError::ParseError(msg) => {
            SidecarError::ParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;
    debug!(path = %path.display(), "Read sidecar");
    Ok(doc)
}

/// Every `metadata.json` below `root`, sorted by path.
///
/// Unreadable directory entries are logged and skipped.
pub fn find_sidecars(root: &Path) -> SidecarResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SidecarError::IoError(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name() == SIDECAR_FILE_NAME {
            found.push(entry.into_path());
        }
    }
    found.sort();

    debug!(root = %root.display(), count = found.len(), "Scanned for sidecars");
    Ok(found)
}
