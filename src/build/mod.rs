//! Build orchestration: documents to artifacts.
//!
//! ```text
//! load ──► merge variables ──► render ──► compile ──► save
//! ```
//!
//! `build_all` reloads every document and partial from disk and processes the
//! documents in parallel. `build_one` runs the same per-document pipeline for
//! a single document, so both produce byte-identical artifacts.
//!
//! Builds are not transactional. Callers sharing an output directory must not
//! run two builds at once; the watcher serializes its own rebuilds.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use crate::compiler::{self, CompileError, CompileOptions, PartialError, RenderError, Renderer};
use crate::config::ProjectConfig;
use crate::source::{self, Document, SourceError};

/// Pipeline stage a build failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Render,
    Compile,
    Save,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Render => "render",
            Self::Compile => "compile",
            Self::Save => "save",
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] SourceError),

    #[error(transparent)]
    Partial(#[from] PartialError),

    #[error("failed to render `{document}`")]
    Render {
        document: String,
        #[source]
        source: RenderError,
    },

    #[error("failed to compile `{document}`")]
    Compile {
        document: String,
        #[source]
        source: CompileError,
    },

    #[error("failed to save `{document}`")]
    Save {
        document: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output directory `{}`", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Load(_) => Stage::Load,
            Self::Partial(_) | Self::Render { .. } => Stage::Render,
            Self::Compile { .. } => Stage::Compile,
            Self::Save { .. } | Self::OutputDir { .. } => Stage::Save,
        }
    }

    /// Name of the document the failure belongs to, if any.
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Load(SourceError::DocumentNotFound(name)) => Some(name),
            Self::Load(_) | Self::Partial(_) | Self::OutputDir { .. } => None,
            Self::Render { document, .. }
            | Self::Compile { document, .. }
            | Self::Save { document, .. } => Some(document),
        }
    }
}

/// Rebuild capability the watcher drives.
pub trait Rebuild: Send + Sync {
    /// Rebuild every document, returning how many were written.
    fn build_all(&self) -> Result<usize, BuildError>;

    /// Rebuild the single document `name`.
    fn build_one(&self, name: &str) -> Result<(), BuildError>;
}

/// Runs the document pipeline against a project configuration.
pub struct Orchestrator {
    config: Arc<ProjectConfig>,
    options: CompileOptions,
}

impl Orchestrator {
    pub fn new(config: Arc<ProjectConfig>) -> Self {
        let options = config.compile_options();
        Self { config, options }
    }

    fn output(&self) -> &Path {
        &self.config.paths.output
    }

    fn load_partials(&self) -> Result<Vec<Document>, BuildError> {
        match self.config.paths.partials_root() {
            Some(root) => Ok(source::load_all(root)?),
            None => Ok(Vec::new()),
        }
    }

    /// render -> compile -> save for one document.
    fn process(&self, renderer: &Renderer, document: &Document) -> Result<(), BuildError> {
        let data = self.config.template.data_for(&document.name);

        let rendered = renderer
            .render(document, &data)
            .map_err(|source| BuildError::Render {
                document: document.name.clone(),
                source,
            })?;

        let html = compiler::compile(&rendered, &self.options).map_err(|source| {
            BuildError::Compile {
                document: document.name.clone(),
                source,
            }
        })?;

        compiler::save(self.output(), &document.name, html.as_bytes()).map_err(|source| {
            BuildError::Save {
                document: document.name.clone(),
                source,
            }
        })?;

        crate::debug!("build"; "wrote {}", document.name);
        Ok(())
    }

    /// Create the output root so an empty project still yields a directory.
    fn ensure_output(&self) -> Result<(), BuildError> {
        std::fs::create_dir_all(self.output()).map_err(|source| BuildError::OutputDir {
            path: self.output().to_path_buf(),
            source,
        })
    }
}

impl Rebuild for Orchestrator {
    fn build_all(&self) -> Result<usize, BuildError> {
        let documents = source::load_all(&self.config.paths.documents)?;
        let partials = self.load_partials()?;
        let renderer = Renderer::new(&partials)?;

        self.ensure_output()?;

        documents
            .par_iter()
            .try_for_each(|document| self.process(&renderer, document))?;

        Ok(documents.len())
    }

    fn build_one(&self, name: &str) -> Result<(), BuildError> {
        let document = source::load_one(&self.config.paths.documents, name)?;
        let partials = self.load_partials()?;
        let renderer = Renderer::new(&partials)?;

        self.process(&renderer, &document)
    }
}
