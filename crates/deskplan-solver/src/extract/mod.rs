//! Turns a solved snapshot into schedule tables and diagnostics.
//!
//! [`extract`] is a pure function of the snapshot and its instance. Every
//! table follows dataset order (employees, then days, then desks) regardless
//! of the order entries appear in the snapshot, so re-running it yields the
//! same serialized report.

mod diagnostics;

#[cfg(test)]
mod tests;

use std::fmt;

use deskplan_core::Instance;
use serde::Serialize;
use thiserror::Error;

use crate::backend::SolveStatus;
use crate::formulation::Phase;
use crate::snapshot::SolvedSnapshot;

pub use diagnostics::{CohesionScore, Diagnostics, PreferenceMetrics, SoloPenaltyRow};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("snapshot belongs to instance '{snapshot}', not '{instance}'")]
    InstanceMismatch { snapshot: String, instance: String },

    #[error("snapshot references unknown {kind} '{id}'")]
    UnknownId { kind: &'static str, id: String },
}

/// One assignment: employee at desk in zone on day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRow {
    pub employee: String,
    pub group: String,
    pub day: String,
    pub desk: String,
    pub zone: String,
}

/// Per-employee week summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub employee: String,
    pub group: String,
    pub assigned_days: Vec<String>,
    pub preferred_days: Vec<String>,
    /// Distinct zones in first-use order.
    pub zones: Vec<String>,
    /// Share of assigned days that were preferred; 0 with no assigned day.
    pub efficiency: f64,
}

impl fmt::Display for EmployeeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): days [{}], preferred [{}], zones [{}], efficiency {:.2}",
            self.employee,
            self.group,
            self.assigned_days.join(", "),
            self.preferred_days.join(", "),
            self.zones.join(", "),
            self.efficiency
        )
    }
}

/// A group's primary meeting day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingRow {
    pub group: String,
    pub day: String,
    /// Zones the members occupy that day, in first-use order.
    pub zones: Vec<String>,
    pub members: Vec<String>,
}

/// Where one member sits on the group's primary day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingDeskRow {
    pub group: String,
    pub day: String,
    pub employee: String,
    pub zone: String,
    pub desk: String,
}

/// Everything downstream consumers read from a solved phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleReport {
    pub instance_id: String,
    pub phase: Phase,
    pub status: SolveStatus,
    pub employees: Vec<EmployeeSummary>,
    pub assignments: Vec<AssignmentRow>,
    pub meetings: Vec<MeetingRow>,
    pub meeting_desks: Vec<MeetingDeskRow>,
    pub diagnostics: Diagnostics,
}

impl ScheduleReport {
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Snapshot entries resolved to instance indices.
#[derive(Debug)]
pub(crate) struct Resolved {
    /// (employee, day, desk, zone), sorted.
    pub assignments: Vec<(usize, usize, usize, usize)>,
    /// `present[e][t]`
    pub present: Vec<Vec<bool>>,
    /// (group, day), sorted.
    pub primary_days: Vec<(usize, usize)>,
}

impl Resolved {
    fn new(snapshot: &SolvedSnapshot, instance: &Instance) -> Result<Self, ExtractError> {
        let mut assignments = Vec::with_capacity(snapshot.assignments.len());
        for a in &snapshot.assignments {
            assignments.push((
                lookup("employee", &a.employee, instance.employee(&a.employee))?,
                lookup("day", &a.day, instance.day(&a.day))?,
                lookup("desk", &a.desk, instance.desk(&a.desk))?,
                lookup("zone", &a.zone, instance.zone(&a.zone))?,
            ));
        }
        assignments.sort_unstable();
        assignments.dedup();

        let mut present = vec![vec![false; instance.days().len()]; instance.employees().len()];
        for p in &snapshot.presence {
            let e = lookup("employee", &p.employee, instance.employee(&p.employee))?;
            let t = lookup("day", &p.day, instance.day(&p.day))?;
            present[e][t] = true;
        }

        let mut primary_days = Vec::with_capacity(snapshot.primary_days.len());
        for p in &snapshot.primary_days {
            primary_days.push((
                lookup("group", &p.group, instance.group(&p.group))?,
                lookup("day", &p.day, instance.day(&p.day))?,
            ));
        }
        primary_days.sort_unstable();
        primary_days.dedup();

        Ok(Self {
            assignments,
            present,
            primary_days,
        })
    }
}

pub(crate) fn lookup(
    kind: &'static str,
    id: &str,
    found: Option<usize>,
) -> Result<usize, ExtractError> {
    found.ok_or_else(|| ExtractError::UnknownId {
        kind,
        id: id.to_string(),
    })
}

/// Builds the schedule tables and diagnostics of a solved phase.
///
/// # Errors
///
/// Fails if the snapshot was produced for another instance or references an
/// id the instance does not define.
pub fn extract(
    snapshot: &SolvedSnapshot,
    instance: &Instance,
) -> Result<ScheduleReport, ExtractError> {
    if snapshot.instance_id != instance.id() {
        return Err(ExtractError::InstanceMismatch {
            snapshot: snapshot.instance_id.clone(),
            instance: instance.id().to_string(),
        });
    }
    let resolved = Resolved::new(snapshot, instance)?;

    let employee_id = |e: usize| instance.employees()[e].id.clone();
    let group_of = |e: usize| instance.groups()[instance.employees()[e].group].id.clone();
    let day_id = |t: usize| instance.days()[t].clone();
    let desk_id = |d: usize| instance.desks()[d].id.clone();
    let zone_id = |z: usize| instance.zones()[z].id.clone();

    let assignments = resolved
        .assignments
        .iter()
        .map(|&(e, t, d, z)| AssignmentRow {
            employee: employee_id(e),
            group: group_of(e),
            day: day_id(t),
            desk: desk_id(d),
            zone: zone_id(z),
        })
        .collect();

    let mut employees = Vec::with_capacity(instance.employees().len());
    for (e, employee) in instance.employees().iter().enumerate() {
        let mut days: Vec<usize> = Vec::new();
        let mut zones: Vec<usize> = Vec::new();
        for &(_, t, _, z) in resolved.assignments.iter().filter(|a| a.0 == e) {
            if !days.contains(&t) {
                days.push(t);
            }
            if !zones.contains(&z) {
                zones.push(z);
            }
        }
        let preferred_hits = days.iter().filter(|&&t| employee.prefers(t)).count();
        let efficiency = if days.is_empty() {
            0.0
        } else {
            preferred_hits as f64 / days.len() as f64
        };
        employees.push(EmployeeSummary {
            employee: employee.id.clone(),
            group: group_of(e),
            assigned_days: days.into_iter().map(day_id).collect(),
            preferred_days: employee.preferred_days().map(day_id).collect(),
            zones: zones.into_iter().map(zone_id).collect(),
            efficiency,
        });
    }

    let mut meetings = Vec::new();
    let mut meeting_desks = Vec::new();
    for &(g, t) in &resolved.primary_days {
        let group = &instance.groups()[g];
        let mut zones: Vec<usize> = Vec::new();
        for &e in &group.members {
            for &(_, _, d, z) in resolved
                .assignments
                .iter()
                .filter(|a| a.0 == e && a.1 == t)
            {
                if !zones.contains(&z) {
                    zones.push(z);
                }
                meeting_desks.push(MeetingDeskRow {
                    group: group.id.clone(),
                    day: day_id(t),
                    employee: employee_id(e),
                    zone: zone_id(z),
                    desk: desk_id(d),
                });
            }
        }
        meetings.push(MeetingRow {
            group: group.id.clone(),
            day: day_id(t),
            zones: zones.into_iter().map(zone_id).collect(),
            members: group.members.iter().map(|&e| employee_id(e)).collect(),
        });
    }

    let diagnostics = Diagnostics::compute(snapshot, instance, &resolved)?;

    Ok(ScheduleReport {
        instance_id: snapshot.instance_id.clone(),
        phase: snapshot.phase,
        status: snapshot.status.clone(),
        employees,
        assignments,
        meetings,
        meeting_desks,
        diagnostics,
    })
}
