//! Deskplan solver pipeline
//!
//! This crate turns a validated [`deskplan_core::Instance`] into a weekly
//! desk schedule in two MILP phases:
//! - the preference phase maximizes assignments on preferred days
//! - the epsilon floor is derived from its satisfaction percentage
//! - the cohesion phase minimizes zone spread and penalties under that floor
//!
//! It also provides:
//! - a backend-agnostic linear model ([`lp`]) and solver seam ([`MilpSolver`])
//! - decoded snapshots and their JSON persistence ([`artifact`])
//! - schedule extraction and diagnostics ([`extract`])
//! - the per-instance [`Pipeline`] and the [`BatchRunner`]

pub mod artifact;
pub mod backend;
pub mod epsilon;
pub mod extract;
pub mod formulation;
pub mod lp;
pub mod pipeline;
pub mod snapshot;

pub use artifact::{ArtifactError, ArtifactStore};
pub use backend::{GoodLpSolver, MilpSolver, SolveOptions, SolveOutcome, SolveStatus};
pub use epsilon::{Epsilon, EpsilonError};
pub use extract::{
    extract, AssignmentRow, CohesionScore, Diagnostics, EmployeeSummary, ExtractError,
    MeetingDeskRow, MeetingRow, PreferenceMetrics, ScheduleReport, SoloPenaltyRow,
};
pub use formulation::{build_cohesion_model, build_preference_model, Phase, PhaseModel};
pub use lp::{LinearModel, Sense};
pub use pipeline::{
    report_from_store, BatchReport, BatchRunner, InstanceFailure, InstanceOutcome, InstanceSource,
    PhaseRun, Pipeline, PipelineError, Stage,
};
pub use snapshot::SolvedSnapshot;
