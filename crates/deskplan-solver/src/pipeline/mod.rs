//! Per-instance orchestration of the two phases.
//!
//! ```text
//! load -> preference model -> solve -> extract -> epsilon
//!      -> cohesion model   -> solve -> extract -> persist
//! ```
//!
//! Each phase builds its own model, solves it and keeps only the decoded
//! [`SolvedSnapshot`]. The cohesion phase never starts before the preference
//! phase has produced its metrics. Any failure aborts the instance with an
//! [`InstanceFailure`] naming the stage.

mod batch;
mod error;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use deskplan_config::{ConfigError, PlannerConfig, SatisfactionTarget};
use deskplan_core::{Dataset, Instance, InstanceSummary};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::artifact::ArtifactStore;
use crate::backend::{GoodLpSolver, MilpSolver, SolveOptions, SolveStatus};
use crate::epsilon::Epsilon;
use crate::extract::{extract, PreferenceMetrics, ScheduleReport};
use crate::formulation::{build_cohesion_model, build_preference_model, Phase, PhaseModel};
use crate::snapshot::SolvedSnapshot;

pub use batch::{BatchReport, BatchRunner};
pub use error::{InstanceFailure, PipelineError, Stage};

/// Where an instance comes from.
#[derive(Debug, Clone)]
pub enum InstanceSource {
    /// A JSON dataset file; the instance id is the file stem.
    File(PathBuf),
    Dataset { id: String, dataset: Dataset },
}

impl InstanceSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        InstanceSource::File(path.into())
    }

    pub fn dataset(id: impl Into<String>, dataset: Dataset) -> Self {
        InstanceSource::Dataset {
            id: id.into(),
            dataset,
        }
    }

    pub fn id(&self) -> String {
        match self {
            InstanceSource::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            InstanceSource::Dataset { id, .. } => id.clone(),
        }
    }
}

/// Result of one solved phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseRun {
    #[serde(skip)]
    pub snapshot: SolvedSnapshot,
    pub report: ScheduleReport,
    pub elapsed_ms: u64,
    pub time_limit_seconds: u64,
}

impl PhaseRun {
    /// True if the solver stopped on its time limit.
    pub fn suboptimal(&self) -> bool {
        self.snapshot.is_suboptimal()
    }
}

/// Both phases of one instance.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceOutcome {
    pub instance_id: String,
    pub summary: InstanceSummary,
    pub preference: PhaseRun,
    pub epsilon: Epsilon,
    pub cohesion: PhaseRun,
}

/// Runs the two-phase workflow with a configured solver.
#[derive(Debug)]
pub struct Pipeline<S = GoodLpSolver> {
    config: PlannerConfig,
    solver: S,
    store: Option<ArtifactStore>,
}

impl Pipeline<GoodLpSolver> {
    /// Creates a pipeline backed by [`GoodLpSolver`].
    pub fn new(config: PlannerConfig) -> Result<Self, ConfigError> {
        Self::with_solver(config, GoodLpSolver::new())
    }
}

impl<S: MilpSolver> Pipeline<S> {
    /// Creates a pipeline with a custom solver backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails validation.
    pub fn with_solver(config: PlannerConfig, solver: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = config
            .output
            .persist
            .then(|| ArtifactStore::new(&config.output.directory));
        Ok(Self {
            config,
            solver,
            store,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&ArtifactStore> {
        self.store.as_ref()
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Reads and validates an instance with the configured attendance bounds.
    pub fn load(&self, source: &InstanceSource) -> Result<Instance, InstanceFailure> {
        let id = source.id();
        let loaded = match source {
            InstanceSource::File(path) => Dataset::from_json_file(path)
                .and_then(|dataset| Instance::from_dataset(&id, &dataset, self.config.attendance)),
            InstanceSource::Dataset { dataset, .. } => {
                Instance::from_dataset(&id, dataset, self.config.attendance)
            }
        };
        let instance = loaded.map_err(|e| InstanceFailure::new(&id, Stage::DataLoad, e))?;

        let summary = instance.summary();
        info!(
            event = "dataset_loaded",
            instance = %id,
            employees = summary.employees,
            desks = summary.desks,
            days = summary.days,
            groups = summary.groups,
            zones = summary.zones,
        );
        for desk in instance.unzoned_desks() {
            warn!(
                event = "unzoned_desk",
                instance = %id,
                desk = %desk.id,
                "desk is not listed by any zone and will never be assigned"
            );
        }
        Ok(instance)
    }

    /// Runs both phases with the configured cohesion time limit.
    pub fn run(&self, source: &InstanceSource) -> Result<InstanceOutcome, InstanceFailure> {
        self.run_with_cohesion_limit(source, self.config.cohesion_time_limit())
    }

    /// Runs both phases, giving the cohesion phase `cohesion_limit`.
    pub fn run_with_cohesion_limit(
        &self,
        source: &InstanceSource,
        cohesion_limit: Duration,
    ) -> Result<InstanceOutcome, InstanceFailure> {
        let result = self
            .load(source)
            .and_then(|instance| self.run_instance(&instance, cohesion_limit));
        if let Err(failure) = &result {
            error!(
                event = "instance_failed",
                instance = %failure.instance_id,
                stage = failure.stage.as_str(),
                error = %failure.error,
            );
        }
        result
    }

    /// Runs both phases on an already validated instance.
    pub fn run_instance(
        &self,
        instance: &Instance,
        cohesion_limit: Duration,
    ) -> Result<InstanceOutcome, InstanceFailure> {
        let id = instance.id();
        let fail = |stage: Stage| move |e: PipelineError| InstanceFailure::new(id, stage, e);
        let started = Instant::now();
        info!(event = "instance_start", instance = id, summary = %instance.summary());

        let preference_options = SolveOptions::new(
            self.config.preference_time_limit(),
            self.config.preference.relative_gap(),
        );
        let preference = self
            .solve_phase(instance, build_preference_model(instance), &preference_options)
            .map_err(fail(Stage::PreferenceSolve))?;
        let preference = self
            .report(instance, preference, &preference_options)
            .map_err(fail(Stage::Extraction))?;
        self.persist(&preference.snapshot)
            .map_err(fail(Stage::Persist))?;

        let metrics = preference.report.diagnostics.metrics;
        let epsilon = derive_epsilon(id, &metrics, self.config.epsilon)?;
        info!(
            event = "epsilon",
            instance = id,
            total_presence = metrics.total_presence,
            satisfied = metrics.satisfied_preferences,
            percentage = metrics.satisfaction_percentage,
            epsilon = epsilon.value(),
        );

        let cohesion_options =
            SolveOptions::new(cohesion_limit, self.config.cohesion.relative_gap());
        let cohesion = self
            .solve_phase(
                instance,
                build_cohesion_model(instance, epsilon),
                &cohesion_options,
            )
            .map_err(fail(Stage::CohesionSolve))?;
        let cohesion = self
            .report(instance, cohesion, &cohesion_options)
            .map_err(fail(Stage::Extraction))?;
        self.persist(&cohesion.snapshot)
            .map_err(fail(Stage::Persist))?;

        if !cohesion.report.diagnostics.isolation_consistent() {
            warn!(
                event = "isolation_mismatch",
                instance = id,
                penalties = cohesion.report.diagnostics.isolation_penalties.len(),
                recomputed = cohesion.report.diagnostics.isolation_check.len(),
            );
        }

        info!(
            event = "instance_end",
            instance = id,
            duration_ms = started.elapsed().as_millis() as u64,
            satisfied = cohesion.report.diagnostics.metrics.satisfied_preferences,
            cohesion_total = cohesion.report.diagnostics.cohesion.total,
        );

        Ok(InstanceOutcome {
            instance_id: id.to_string(),
            summary: instance.summary(),
            preference,
            epsilon,
            cohesion,
        })
    }

    /// Solves one phase model and decodes the outcome; the model is dropped.
    fn solve_phase(
        &self,
        instance: &Instance,
        phase_model: PhaseModel,
        options: &SolveOptions,
    ) -> Result<(SolvedSnapshot, Duration), PipelineError> {
        let phase = phase_model.phase;
        info!(
            event = "phase_start",
            instance = instance.id(),
            phase = phase.as_str(),
            solver = self.solver.name(),
            variables = phase_model.model.variables().len(),
            constraints = phase_model.model.constraints().len(),
            time_limit_s = options.time_limit.as_secs(),
        );
        for (family, count) in phase_model.model.family_counts() {
            debug!(event = "constraint_family", phase = phase.as_str(), family, count);
        }

        let started = Instant::now();
        let outcome = self.solver.solve(&phase_model.model, options);
        let elapsed = started.elapsed();

        match &outcome.status {
            SolveStatus::Optimal => {}
            SolveStatus::TimeLimitFeasible => warn!(
                event = "suboptimal_accepted",
                instance = instance.id(),
                phase = phase.as_str(),
                "time limit reached; keeping the incumbent"
            ),
            SolveStatus::Infeasible => return Err(PipelineError::ModelInfeasible { phase }),
            SolveStatus::Error(message) => {
                return Err(PipelineError::Solver {
                    phase,
                    message: message.clone(),
                })
            }
        }
        let expected = phase_model.model.variables().len();
        if outcome.values.len() != expected {
            return Err(PipelineError::Solver {
                phase,
                message: format!(
                    "solver returned {} values for {expected} variables",
                    outcome.values.len()
                ),
            });
        }

        let snapshot = phase_model.decode(instance, &outcome);
        info!(
            event = "phase_end",
            instance = instance.id(),
            phase = phase.as_str(),
            status = %outcome.status,
            objective = outcome.objective_value.unwrap_or_default(),
            duration_ms = elapsed.as_millis() as u64,
        );
        Ok((snapshot, elapsed))
    }

    fn report(
        &self,
        instance: &Instance,
        (snapshot, elapsed): (SolvedSnapshot, Duration),
        options: &SolveOptions,
    ) -> Result<PhaseRun, PipelineError> {
        let report = extract(&snapshot, instance)?;
        Ok(PhaseRun {
            snapshot,
            report,
            elapsed_ms: elapsed.as_millis() as u64,
            time_limit_seconds: options.time_limit.as_secs(),
        })
    }

    fn persist(&self, snapshot: &SolvedSnapshot) -> Result<(), PipelineError> {
        if let Some(store) = &self.store {
            store.save(snapshot)?;
            store.mark_finished(&snapshot.instance_id, snapshot.phase)?;
        }
        Ok(())
    }
}

fn derive_epsilon(
    instance_id: &str,
    metrics: &PreferenceMetrics,
    target: SatisfactionTarget,
) -> Result<Epsilon, InstanceFailure> {
    Epsilon::derive(metrics, target)
        .map_err(|e| InstanceFailure::new(instance_id, Stage::Epsilon, e))
}

/// Loads a persisted snapshot and extracts its report.
pub fn report_from_store(
    store: &ArtifactStore,
    instance: &Instance,
    phase: Phase,
) -> Result<ScheduleReport, PipelineError> {
    let snapshot = store.load_snapshot(instance.id(), phase)?;
    Ok(extract(&snapshot, instance)?)
}
