//! Source store: loads template documents from disk.
//!
//! Every call reads the filesystem again; nothing is cached between loads.
//! Document names are the slash-separated path below the root, without the
//! `.mjml` extension (`documents/shop/invoice.mjml` -> `shop/invoice`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use thiserror::Error;

use crate::utils::path::{document_name, is_safe_relative};

/// Extension of template source files.
pub const TEMPLATE_EXT: &str = "mjml";

/// A named template loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("template does not exist: {0}")]
    DocumentNotFound(String),

    #[error("failed to read `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("failed to walk `{}`", .0.display())]
    Walk(PathBuf, #[source] jwalk::Error),
}

/// Load every template below `root`, sorted by path.
///
/// An empty `root` means "not configured" and yields no documents.
pub fn load_all(root: &Path) -> Result<Vec<Document>, SourceError> {
    if root.as_os_str().is_empty() {
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        return Err(SourceError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(root).sort(true) {
        let entry = entry.map_err(|e| SourceError::Walk(root.to_path_buf(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(name) = document_name(root, &path, TEMPLATE_EXT) else {
            continue;
        };
        let content = fs::read_to_string(&path).map_err(|e| SourceError::Io(path.clone(), e))?;
        documents.push(Document { name, content });
    }

    Ok(documents)
}

/// Load exactly one template by name (with or without the `.mjml` suffix).
pub fn load_one(root: &Path, name: &str) -> Result<Document, SourceError> {
    let name = name.replace('\\', "/");
    let name = name
        .strip_suffix(&format!(".{TEMPLATE_EXT}"))
        .unwrap_or(&name)
        .to_string();

    if !is_safe_relative(&name) {
        return Err(SourceError::DocumentNotFound(name));
    }
    if !root.is_dir() {
        return Err(SourceError::DirectoryNotFound(root.to_path_buf()));
    }

    let path = root.join(format!("{name}.{TEMPLATE_EXT}"));
    if !path.is_file() {
        return Err(SourceError::DocumentNotFound(name));
    }

    let content = fs::read_to_string(&path).map_err(|e| SourceError::Io(path, e))?;
    Ok(Document { name, content })
}
