//! Runs a list of instances, one independent pipeline run each.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{error, info};

use super::{InstanceFailure, InstanceOutcome, InstanceSource, Pipeline, PipelineError, Stage};
use crate::backend::MilpSolver;

/// Per-instance results in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<Result<InstanceOutcome, InstanceFailure>>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &InstanceOutcome> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &InstanceFailure> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(Result::is_ok)
    }
}

/// Batch driver over a [`Pipeline`].
///
/// A failing instance is reported and the batch moves on. The cohesion time
/// limit starts at the configured value and grows by
/// `batch.large_instance_increment_seconds` at every instance listed in
/// `batch.large_instances`; the widened limit carries over to every later
/// instance in the list.
///
/// Artifacts are keyed by instance id, so a source whose id repeats an
/// earlier one is rejected at data load and never solved.
#[derive(Debug)]
pub struct BatchRunner<'p, S> {
    pipeline: &'p Pipeline<S>,
}

impl<'p, S: MilpSolver> BatchRunner<'p, S> {
    pub fn new(pipeline: &'p Pipeline<S>) -> Self {
        Self { pipeline }
    }

    /// Cohesion time limit of each source, in input order.
    pub fn cohesion_limits(&self, sources: &[InstanceSource]) -> Vec<Duration> {
        let config = self.pipeline.config();
        let mut limit = config.cohesion_time_limit();
        sources
            .iter()
            .map(|source| {
                if config.batch.is_large(&source.id()) {
                    limit += config.batch.large_instance_increment();
                }
                limit
            })
            .collect()
    }

    pub fn run(&self, sources: &[InstanceSource]) -> BatchReport {
        let parallel = self.pipeline.config().batch.parallel;
        let limits = self.cohesion_limits(sources);
        let started = Instant::now();
        info!(event = "batch_start", instances = sources.len(), parallel);

        let mut seen = HashSet::new();
        let repeated: Vec<bool> = sources.iter().map(|s| !seen.insert(s.id())).collect();

        let run_one = |(index, source): (usize, &InstanceSource)| {
            if repeated[index] {
                return Err(reject_duplicate(source));
            }
            self.pipeline.run_with_cohesion_limit(source, limits[index])
        };
        let results: Vec<_> = if parallel {
            sources.par_iter().enumerate().map(&run_one).collect()
        } else {
            sources.iter().enumerate().map(&run_one).collect()
        };

        let report = BatchReport { results };
        info!(
            event = "batch_end",
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        report
    }
}

fn reject_duplicate(source: &InstanceSource) -> InstanceFailure {
    let id = source.id();
    let failure = InstanceFailure::new(
        &id,
        Stage::DataLoad,
        PipelineError::DuplicateInstance { id: id.clone() },
    );
    error!(
        event = "instance_failed",
        instance = %failure.instance_id,
        stage = failure.stage.as_str(),
        error = %failure.error,
    );
    failure
}
