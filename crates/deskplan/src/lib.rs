//! Deskplan - Two-Phase Desk Scheduling in Rust
//!
//! Loads hybrid-work instances, maximizes preferred-day attendance, then
//! minimizes group spread across zones while keeping a share of that
//! satisfaction.
//!
//! # Example
//!
//! ```rust
//! use deskplan::prelude::*;
//!
//! let config = PlannerConfig::new()
//!     .with_attendance(1, 2)
//!     .with_satisfaction_target(SatisfactionTarget::Fixed { ratio: 0.5 });
//! assert_eq!(config.attendance.max_days, 2);
//!
//! let epsilon = Epsilon::from_percentage(8, 80.0, 0.5).unwrap();
//! assert_eq!(epsilon.value(), 5);
//! ```

// Domain
pub use deskplan_core::{AttendanceBounds, DataFormatError, Dataset, Instance, InstanceSummary};

// Configuration
pub use deskplan_config::{ConfigError, PlannerConfig, SatisfactionTarget};

// Pipeline
pub use deskplan_solver::{
    report_from_store, ArtifactStore, BatchReport, BatchRunner, Epsilon, GoodLpSolver,
    InstanceFailure, InstanceOutcome, InstanceSource, MilpSolver, Phase, Pipeline, PipelineError,
    ScheduleReport, SolveStatus, SolvedSnapshot, Stage,
};

/// Lower-level building blocks: models, backends, extraction.
pub mod solver {
    pub use deskplan_solver::*;
}

#[cfg(feature = "console")]
pub use deskplan_console as console;

mod run;
pub use run::solve_all;

pub mod prelude {
    pub use super::{AttendanceBounds, Dataset, Instance};
    pub use super::{PlannerConfig, SatisfactionTarget};
    pub use super::{
        BatchRunner, Epsilon, InstanceSource, Phase, Pipeline, ScheduleReport, SolveStatus,
    };
    pub use super::solve_all;
}
