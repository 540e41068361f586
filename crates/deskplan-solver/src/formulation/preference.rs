//! Phase 2: preference maximization.

use deskplan_core::Instance;
use tracing::debug;

use super::{Phase, PhaseModel, ScheduleVars};
use crate::lp::{LinearModel, Sense};

/// Builds the preference model.
///
/// Maximizes the number of assignments on preferred days subject to presence
/// linkage, attendance bounds, one desk per employee and day, desk
/// uniqueness, one primary day per group and meeting attendance.
pub fn build_preference_model(instance: &Instance) -> PhaseModel {
    let mut model = LinearModel::new(Sense::Maximize);
    let schedule = ScheduleVars::generate(instance, &mut model);

    model.set_objective(schedule.satisfied_preferences(instance));
    schedule.add_common_constraints(instance, &mut model, None);

    debug!(
        event = "model_built",
        instance = instance.id(),
        phase = "preference",
        variables = model.variables().len(),
        constraints = model.constraints().len(),
        assignment_vars = schedule.assignments.len(),
    );

    PhaseModel {
        phase: Phase::Preference,
        model,
        schedule,
        cohesion: None,
    }
}
