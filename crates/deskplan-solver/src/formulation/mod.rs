//! MILP formulations of the two phases.
//!
//! [`build_preference_model`] maximizes satisfied day preferences;
//! [`build_cohesion_model`] minimizes zone spread and cohesion penalties
//! under an epsilon floor on satisfied preferences. Each call returns a fresh,
//! independently owned [`PhaseModel`].
//!
//! Variables are generated sparsely: an assignment variable exists only for
//! an employee, one of its allowed desks that some zone owns, and a day. The
//! zone of an assignment is therefore implied by its desk, and eligibility
//! and zone membership hold by construction.

mod cohesion;
mod preference;


use std::fmt;

use deskplan_core::Instance;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::SolveOutcome;
use crate::lp::{Cmp, LinearExpr, LinearModel, VarId, VarKind};
use crate::snapshot::{
    AssignmentValue, GroupDay, PresenceValue, SolvedSnapshot, SpreadValue, ZoneDay,
};

pub use cohesion::build_cohesion_model;
pub use preference::build_preference_model;

/// Constraint family names.
pub mod family {
    pub const PRESENCE_LINK: &str = "presence_link";
    pub const ATTENDANCE_MIN: &str = "attendance_min";
    pub const ATTENDANCE_MAX: &str = "attendance_max";
    pub const ONE_DESK_PER_DAY: &str = "one_desk_per_day";
    pub const DESK_UNIQUE: &str = "desk_unique";
    pub const ONE_PRIMARY_DAY: &str = "one_primary_day";
    pub const MEETING_ATTENDANCE: &str = "meeting_attendance";
    pub const ISOLATION_LOWER: &str = "isolation_lower";
    pub const ISOLATION_UPPER: &str = "isolation_upper";
    pub const ZONE_SPREAD: &str = "zone_spread";
    pub const EPSILON: &str = "epsilon";
}

/// Which of the two optimization phases a model or artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Phase 2: maximize satisfied preferences.
    Preference,
    /// Phase 1: minimize zone spread and penalties under the epsilon floor.
    Cohesion,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Preference => "preference",
            Phase::Cohesion => "cohesion",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preference" => Ok(Phase::Preference),
            "cohesion" => Ok(Phase::Cohesion),
            other => Err(format!("unknown phase '{other}', expected preference or cohesion")),
        }
    }
}

/// Assignment variable X for one (employee, desk, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentVar {
    pub employee: usize,
    pub desk: usize,
    pub day: usize,
    /// Zone that owns `desk`.
    pub zone: usize,
    pub var: VarId,
}

/// Variables shared by both phases: X, Y and Z.
#[derive(Debug, Clone)]
pub struct ScheduleVars {
    /// Generated in employee, day, desk order.
    pub assignments: Vec<AssignmentVar>,
    /// `presence[e][t]`
    pub presence: Vec<Vec<VarId>>,
    /// `primary_day[g][t]`
    pub primary_day: Vec<Vec<VarId>>,
    /// Indices into `assignments` per `[e][t]`.
    by_employee_day: Vec<Vec<Vec<usize>>>,
}

impl ScheduleVars {
    fn generate(instance: &Instance, model: &mut LinearModel) -> Self {
        let days = instance.days().len();
        let mut assignments = Vec::new();
        let mut by_employee_day = Vec::with_capacity(instance.employees().len());

        for (e, employee) in instance.employees().iter().enumerate() {
            let usable: Vec<(usize, usize)> = employee
                .allowed_desks
                .iter()
                .filter_map(|&d| instance.desks()[d].zone.map(|z| (d, z)))
                .collect();
            if usable.is_empty() {
                warn!(
                    event = "unusable_desks",
                    instance = instance.id(),
                    employee = %employee.id,
                    "employee has no desk in any zone and can never be present"
                );
            }

            let mut per_day = Vec::with_capacity(days);
            for t in 0..days {
                let mut slots = Vec::with_capacity(usable.len());
                for &(d, z) in &usable {
                    let var = model.add_var(
                        format!(
                            "X[{},{},{}]",
                            employee.id,
                            instance.desks()[d].id,
                            instance.days()[t]
                        ),
                        VarKind::Binary,
                    );
                    slots.push(assignments.len());
                    assignments.push(AssignmentVar {
                        employee: e,
                        desk: d,
                        day: t,
                        zone: z,
                        var,
                    });
                }
                per_day.push(slots);
            }
            by_employee_day.push(per_day);
        }

        let presence: Vec<Vec<VarId>> = instance
            .employees()
            .iter()
            .map(|employee| {
                instance
                    .days()
                    .iter()
                    .map(|day| model.add_var(format!("Y[{},{day}]", employee.id), VarKind::Binary))
                    .collect::<Vec<_>>()
            })
            .collect();

        let primary_day: Vec<Vec<VarId>> = instance
            .groups()
            .iter()
            .map(|group| {
                instance
                    .days()
                    .iter()
                    .map(|day| model.add_var(format!("Z[{},{day}]", group.id), VarKind::Binary))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            assignments,
            presence,
            primary_day,
            by_employee_day,
        }
    }

    /// Assignment variables of employee `e` on day `t`.
    pub fn slots(&self, e: usize, t: usize) -> impl Iterator<Item = &AssignmentVar> {
        self.by_employee_day[e][t]
            .iter()
            .map(move |&i| &self.assignments[i])
    }

    /// Number of assignments that fall on a preferred day.
    fn satisfied_preferences(&self, instance: &Instance) -> LinearExpr {
        LinearExpr::sum(
            self.assignments
                .iter()
                .filter(|x| instance.employees()[x.employee].prefers(x.day))
                .map(|x| x.var),
        )
    }

    /// Constraints common to both phases.
    ///
    /// With `solo` set, the attendance floor of employee `e` is relaxed to
    /// `min - solo[e]`.
    fn add_common_constraints(
        &self,
        instance: &Instance,
        model: &mut LinearModel,
        solo: Option<&[VarId]>,
    ) {
        let bounds = instance.bounds();
        let days = instance.days().len();

        for e in 0..instance.employees().len() {
            for t in 0..days {
                let occupied = LinearExpr::sum(self.slots(e, t).map(|x| x.var));
                let mut link = occupied.clone();
                link.add(self.presence[e][t], -1.0);
                model.add_constraint(family::PRESENCE_LINK, link, Cmp::Eq, 0.0);

                if self.by_employee_day[e][t].len() > 1 {
                    model.add_constraint(family::ONE_DESK_PER_DAY, occupied, Cmp::Le, 1.0);
                }
            }

            let week = LinearExpr::sum(self.presence[e].iter().copied());
            let floor = match solo {
                Some(pen) => week.clone().with(pen[e], 1.0),
                None => week.clone(),
            };
            model.add_constraint(
                family::ATTENDANCE_MIN,
                floor,
                Cmp::Ge,
                f64::from(bounds.min_days),
            );
            model.add_constraint(
                family::ATTENDANCE_MAX,
                week,
                Cmp::Le,
                f64::from(bounds.max_days),
            );
        }

        // desk uniqueness, only where a desk has several candidates
        let mut by_desk_day: Vec<Vec<VarId>> = vec![Vec::new(); instance.desks().len() * days];
        for x in &self.assignments {
            by_desk_day[x.desk * days + x.day].push(x.var);
        }
        for candidates in by_desk_day.into_iter().filter(|c| c.len() > 1) {
            model.add_constraint(
                family::DESK_UNIQUE,
                LinearExpr::sum(candidates),
                Cmp::Le,
                1.0,
            );
        }

        for (g, group) in instance.groups().iter().enumerate() {
            model.add_constraint(
                family::ONE_PRIMARY_DAY,
                LinearExpr::sum(self.primary_day[g].iter().copied()),
                Cmp::Eq,
                1.0,
            );
            for &e in &group.members {
                for t in 0..days {
                    let attends = LinearExpr::term(self.presence[e][t], 1.0)
                        .with(self.primary_day[g][t], -1.0);
                    model.add_constraint(family::MEETING_ATTENDANCE, attends, Cmp::Ge, 0.0);
                }
            }
        }
    }
}

/// One reachable (group, zone, day) cell of the cohesion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneCell {
    pub group: usize,
    pub zone: usize,
    pub day: usize,
    /// P: at least one member in the zone.
    pub presence: VarId,
    /// Pen2: exactly one member in the zone.
    pub isolation: VarId,
}

/// Variables only the cohesion phase carries: J, P, Pen1 and Pen2.
#[derive(Debug, Clone)]
pub struct CohesionVars {
    /// `spread[g][t]`
    pub spread: Vec<Vec<VarId>>,
    /// `solo[e]`
    pub solo: Vec<VarId>,
    /// Reachable cells in group, zone, day order.
    pub cells: Vec<ZoneCell>,
}

/// A built model together with the index needed to read its solution.
#[derive(Debug, Clone)]
pub struct PhaseModel {
    pub phase: Phase,
    pub model: LinearModel,
    pub schedule: ScheduleVars,
    pub cohesion: Option<CohesionVars>,
}

impl PhaseModel {
    /// Reads a solved outcome into an id-keyed snapshot.
    ///
    /// Binary values above 0.5 count as set. Missing values count as 0.
    pub fn decode(&self, instance: &Instance, outcome: &SolveOutcome) -> SolvedSnapshot {
        let value = |var: VarId| outcome.values.get(var.index()).copied().unwrap_or(0.0);
        let is_set = |var: VarId| value(var) > 0.5;
        let days = instance.days();

        let assignments = self
            .schedule
            .assignments
            .iter()
            .filter(|x| is_set(x.var))
            .map(|x| AssignmentValue {
                employee: instance.employees()[x.employee].id.clone(),
                day: days[x.day].clone(),
                desk: instance.desks()[x.desk].id.clone(),
                zone: instance.zones()[x.zone].id.clone(),
            })
            .collect();

        let mut presence = Vec::new();
        for (e, employee) in instance.employees().iter().enumerate() {
            for (t, day) in days.iter().enumerate() {
                if is_set(self.schedule.presence[e][t]) {
                    presence.push(PresenceValue {
                        employee: employee.id.clone(),
                        day: day.clone(),
                    });
                }
            }
        }

        let mut primary_days = Vec::new();
        for (g, group) in instance.groups().iter().enumerate() {
            for (t, day) in days.iter().enumerate() {
                if is_set(self.schedule.primary_day[g][t]) {
                    primary_days.push(GroupDay {
                        group: group.id.clone(),
                        day: day.clone(),
                    });
                }
            }
        }

        let mut snapshot = SolvedSnapshot {
            instance_id: instance.id().to_string(),
            phase: self.phase,
            status: outcome.status.clone(),
            objective_value: outcome.objective_value,
            assignments,
            presence,
            primary_days,
            zone_presence: Vec::new(),
            zone_spread: Vec::new(),
            solo_penalties: Vec::new(),
            isolation_penalties: Vec::new(),
        };

        if let Some(cohesion) = &self.cohesion {
            let zone_day = |cell: &ZoneCell| ZoneDay {
                group: instance.groups()[cell.group].id.clone(),
                zone: instance.zones()[cell.zone].id.clone(),
                day: days[cell.day].clone(),
            };
            snapshot.zone_presence = cohesion
                .cells
                .iter()
                .filter(|c| is_set(c.presence))
                .map(zone_day)
                .collect();
            snapshot.isolation_penalties = cohesion
                .cells
                .iter()
                .filter(|c| is_set(c.isolation))
                .map(zone_day)
                .collect();
            for (g, group) in instance.groups().iter().enumerate() {
                for (t, day) in days.iter().enumerate() {
                    snapshot.zone_spread.push(SpreadValue {
                        group: group.id.clone(),
                        day: day.clone(),
                        zones: value(cohesion.spread[g][t]).round().max(0.0) as u32,
                    });
                }
            }
            snapshot.solo_penalties = instance
                .employees()
                .iter()
                .zip(&cohesion.solo)
                .filter(|(_, pen)| is_set(**pen))
                .map(|(employee, _)| employee.id.clone())
                .collect();
        }

        snapshot
    }
}
