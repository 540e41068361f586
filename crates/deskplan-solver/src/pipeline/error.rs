//! Pipeline errors and the stage they abort.

use std::fmt;

use deskplan_core::DataFormatError;
use serde::Serialize;
use thiserror::Error;

use crate::artifact::ArtifactError;
use crate::epsilon::EpsilonError;
use crate::extract::ExtractError;
use crate::formulation::Phase;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    DataFormat(#[from] DataFormatError),

    #[error("{phase} model is infeasible")]
    ModelInfeasible { phase: Phase },

    #[error("{phase} solve failed: {message}")]
    Solver { phase: Phase, message: String },

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    InvalidRatio(#[from] EpsilonError),

    #[error("instance id {id} is already used by an earlier source in the batch")]
    DuplicateInstance { id: String },
}

/// Step of the per-instance pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    DataLoad,
    PreferenceSolve,
    Epsilon,
    CohesionSolve,
    Extraction,
    Persist,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::DataLoad => "data load",
            Stage::PreferenceSolve => "preference solve",
            Stage::Epsilon => "epsilon derivation",
            Stage::CohesionSolve => "cohesion solve",
            Stage::Extraction => "extraction",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An aborted instance, tagged with where it stopped.
#[derive(Debug, Error)]
#[error("instance {instance_id} failed during {stage}: {error}")]
pub struct InstanceFailure {
    pub instance_id: String,
    pub stage: Stage,
    #[source]
    pub error: PipelineError,
}

impl InstanceFailure {
    pub fn new(instance_id: impl Into<String>, stage: Stage, error: impl Into<PipelineError>) -> Self {
        Self {
            instance_id: instance_id.into(),
            stage,
            error: error.into(),
        }
    }
}
