//! Path normalization and document naming.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `document_name` - logical, slash-separated document name for a source file

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Expand `~` and resolve `path` against `root` when relative.
pub fn resolve_against(path: &Path, root: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned());
    if expanded.is_absolute() {
        normalize_path(&expanded)
    } else {
        normalize_path(&root.join(expanded))
    }
}

/// Derive the logical document name of `path` relative to `root`.
///
/// The name is forward-slash separated regardless of the host separator and
/// has the trailing `.{ext}` removed:
///
/// ```ignore
/// document_name(Path::new("/docs"), Path::new("/docs/shop/invoice.mjml"), "mjml")
///     == Some("shop/invoice".into())
/// ```
///
/// Returns `None` when `path` is not below `root` or does not carry `ext`.
pub fn document_name(root: &Path, path: &Path, ext: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => return None,
        }
    }

    let joined = parts.join("/");
    let name = joined.strip_suffix(ext)?.strip_suffix('.')?;
    (!name.is_empty() && !name.ends_with('/')).then(|| name.to_string())
}

/// Reject names that would escape their root once joined (`..`, absolute).
pub fn is_safe_relative(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
