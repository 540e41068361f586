//! One-call entry point that hides the pipeline wiring.

use std::path::PathBuf;

use deskplan_config::{ConfigError, PlannerConfig};
use deskplan_solver::{BatchReport, BatchRunner, InstanceSource, Pipeline};

/// Solves every dataset file with the default backend.
///
/// Instances run in the given order (or in parallel when
/// `config.batch.parallel` is set); per-instance failures are collected in
/// the returned report.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the configuration fails validation.
pub fn solve_all<I, P>(config: PlannerConfig, paths: I) -> Result<BatchReport, ConfigError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let pipeline = Pipeline::new(config)?;
    let sources: Vec<InstanceSource> = paths.into_iter().map(InstanceSource::file).collect();
    Ok(BatchRunner::new(&pipeline).run(&sources))
}
