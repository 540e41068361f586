//! Read-only view of a solved phase.
//!
//! A [`SolvedSnapshot`] keeps only the variables set to 1 (and the integer
//! zone spread), keyed by dataset ids so it can be persisted and reloaded
//! independently of the model that produced it.

use serde::{Deserialize, Serialize};

use crate::backend::SolveStatus;
use crate::formulation::Phase;

/// X = 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentValue {
    pub employee: String,
    pub day: String,
    pub desk: String,
    pub zone: String,
}

/// Y = 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceValue {
    pub employee: String,
    pub day: String,
}

/// Z = 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDay {
    pub group: String,
    pub day: String,
}

/// A (group, zone, day) triple, used for P = 1 and Pen2 = 1.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneDay {
    pub group: String,
    pub zone: String,
    pub day: String,
}

/// J
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadValue {
    pub group: String,
    pub day: String,
    pub zones: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedSnapshot {
    pub instance_id: String,
    pub phase: Phase,
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub assignments: Vec<AssignmentValue>,
    pub presence: Vec<PresenceValue>,
    pub primary_days: Vec<GroupDay>,

    // Cohesion phase only; empty for the preference phase.
    #[serde(default)]
    pub zone_presence: Vec<ZoneDay>,
    #[serde(default)]
    pub zone_spread: Vec<SpreadValue>,
    #[serde(default)]
    pub solo_penalties: Vec<String>,
    #[serde(default)]
    pub isolation_penalties: Vec<ZoneDay>,
}

impl SolvedSnapshot {
    /// Total number of (employee, day) presences.
    pub fn total_presence(&self) -> usize {
        self.presence.len()
    }

    /// Returns true if the solve stopped on its time limit.
    pub fn is_suboptimal(&self) -> bool {
        self.status.is_suboptimal()
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
