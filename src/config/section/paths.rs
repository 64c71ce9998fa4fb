//! `[paths]` section configuration.
//!
//! ```toml
//! [paths]
//! documents = "documents"   # Templates compiled to artifacts
//! partials = "partials"     # Templates available for inclusion ("" disables)
//! output = "output"         # Compiled artifacts
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::path::resolve_against;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub documents: PathBuf,
    pub partials: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            documents: "documents".into(),
            partials: "partials".into(),
            output: "output".into(),
        }
    }
}

impl PathsConfig {
    /// Resolve every configured path against the project root.
    ///
    /// An empty `partials` stays empty so it keeps meaning "disabled".
    pub fn resolve(&mut self, root: &Path) {
        self.documents = resolve_against(&self.documents, root);
        self.output = resolve_against(&self.output, root);
        if !self.partials.as_os_str().is_empty() {
            self.partials = resolve_against(&self.partials, root);
        }
    }

    /// Partials root, or `None` when partials are disabled.
    pub fn partials_root(&self) -> Option<&Path> {
        (!self.partials.as_os_str().is_empty()).then_some(self.partials.as_path())
    }
}
