//! Artifact output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of compiled artifacts.
pub const ARTIFACT_EXT: &str = "html";

/// `<output>/<name>.html`; `name` is slash-separated.
pub fn artifact_path(output: &Path, name: &str) -> PathBuf {
    let mut path = output.to_path_buf();
    let (dirs, file) = name.rsplit_once('/').unwrap_or(("", name));
    for part in dirs.split('/').filter(|part| !part.is_empty()) {
        path.push(part);
    }
    path.push(format!("{file}.{ARTIFACT_EXT}"));
    path
}

/// Write `bytes` as the artifact of document `name`, creating directories as needed.
pub fn save(output: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let path = artifact_path(output, name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;
    Ok(path)
}
