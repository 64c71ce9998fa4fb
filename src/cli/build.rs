//! `envelopr build`: compile every document once.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::build::{Orchestrator, Rebuild};
use crate::config::ProjectConfig;
use crate::log;
use crate::utils::plural_s;

/// Run a full build and log the outcome.
pub fn build_project(config: Arc<ProjectConfig>) -> Result<usize> {
    let started = Instant::now();
    let output = config.root_relative(&config.paths.output);

    let count = Orchestrator::new(config)
        .build_all()
        .context("Build failed")?;

    log!(
        "build";
        "compiled {} document{} into {} in {} ms",
        count,
        plural_s(count),
        output.display(),
        started.elapsed().as_millis()
    );
    Ok(count)
}
