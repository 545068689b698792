//! Candidate extension matching
//!
//! Maps a logical path onto a file under the content root. Paths without an
//! extension are probed against the configured extensions in order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::resolver::has_extension;

/// Find the file backing a logical path
///
/// With an explicit extension the path is used verbatim and nothing is
/// probed, so the result may not exist. Otherwise returns the first
/// `content_root/logical_path.ext` that is a regular file, or `None`.
pub fn find_file(
    content_root: &Path,
    logical_path: &str,
    candidate_extensions: &[String],
) -> io::Result<Option<PathBuf>> {
    if has_extension(logical_path) {
        return Ok(Some(content_root.join(logical_path)));
    }

    for ext in candidate_extensions {
        let candidate = content_root.join(format!("{logical_path}.{ext}"));
        if is_regular_file(&candidate)? {
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}

/// Whether `path` names a regular file
///
/// Missing paths, directories and paths running through a file count as
/// absent. Other failures are returned.
pub fn is_regular_file(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
