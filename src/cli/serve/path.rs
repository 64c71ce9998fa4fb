//! URL routing and artifact path resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Prefix of the raw artifact route.
pub const RAW_PREFIX: &str = "_template/";

/// What a request URL asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`: index of compiled artifacts
    Index,
    /// `/_template/<path>`: the artifact itself
    Raw(String),
    /// `/<path>`: preview page wrapping the artifact
    Preview(String),
}

impl Route {
    /// Route a request URL. Returns `None` for URLs that cannot name an
    /// artifact (undecodable, or containing `..`).
    pub fn parse(url: &str) -> Option<Self> {
        let clean = normalize_url(url)?;
        if clean.split('/').any(|part| part == "..") {
            return None;
        }

        if clean.is_empty() {
            Some(Self::Index)
        } else if let Some(rest) = clean.strip_prefix(RAW_PREFIX) {
            Some(Self::Raw(rest.to_string()))
        } else {
            Some(Self::Preview(clean))
        }
    }
}

/// Decode, strip query string and fragment, trim slashes.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded: Cow<'_, str> = percent_decode_str(path).decode_utf8().ok()?;
    Some(decoded.trim_matches('/').to_string())
}

/// Resolve `relative` to an existing file below `output`.
///
/// Canonicalizes both sides so symlinks cannot escape the output root.
pub fn resolve_artifact(relative: &str, output: &Path) -> Option<PathBuf> {
    if relative.is_empty() {
        return None;
    }

    let canonical = output.join(relative).canonicalize().ok()?;
    let root = output.canonicalize().ok()?;

    (canonical.starts_with(&root) && canonical.is_file()).then_some(canonical)
}
