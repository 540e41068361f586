//! Aggregate metrics of a solved phase.

use std::collections::BTreeSet;

use deskplan_core::Instance;
use serde::{Deserialize, Serialize};

use super::{lookup, ExtractError, Resolved};
use crate::formulation::Phase;
use crate::snapshot::{SolvedSnapshot, ZoneDay};

/// Preference satisfaction of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceMetrics {
    /// Number of (employee, day) presences.
    pub total_presence: u64,
    /// Assignments that fall on a preferred day.
    pub satisfied_preferences: u64,
    /// `100 * satisfied / total`, 0 with no presence.
    pub satisfaction_percentage: f64,
}

impl PreferenceMetrics {
    pub fn new(total_presence: u64, satisfied_preferences: u64) -> Self {
        let satisfaction_percentage = if total_presence == 0 {
            0.0
        } else {
            100.0 * satisfied_preferences as f64 / total_presence as f64
        };
        Self {
            total_presence,
            satisfied_preferences,
            satisfaction_percentage,
        }
    }

    /// Computes the metrics of a snapshot.
    pub fn of(snapshot: &SolvedSnapshot, instance: &Instance) -> Result<Self, ExtractError> {
        let resolved = Resolved::new(snapshot, instance)?;
        Ok(Self::from_resolved(instance, &resolved))
    }

    fn from_resolved(instance: &Instance, resolved: &Resolved) -> Self {
        let total = resolved.present.iter().flatten().filter(|&&p| p).count();
        let satisfied = resolved
            .assignments
            .iter()
            .filter(|&&(e, t, _, _)| instance.employees()[e].prefers(t))
            .count();
        Self::new(total as u64, satisfied as u64)
    }
}

/// Cohesion objective recomputed from assignments and presence alone.
///
/// Applies to snapshots of either phase, so the preference schedule can be
/// scored on the same scale as the cohesion schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CohesionScore {
    /// Sum over groups and days of distinct zones occupied.
    pub zone_spread: u64,
    /// Employees present fewer than the minimum number of days.
    pub solo: u64,
    /// (group, zone, day) triples with exactly one member present.
    pub isolation: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoloPenaltyRow {
    pub employee: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    #[serde(flatten)]
    pub metrics: PreferenceMetrics,
    /// True when the snapshot carries penalty variables (cohesion phase).
    pub penalized: bool,
    /// Employees whose attendance floor was relaxed.
    pub solo_penalties: Vec<SoloPenaltyRow>,
    /// Isolation penalties as set by the solver.
    pub isolation_penalties: Vec<ZoneDay>,
    /// Isolated (group, zone, day) triples recomputed from assignments.
    pub isolation_check: Vec<ZoneDay>,
    pub cohesion: CohesionScore,
}

impl Diagnostics {
    pub(crate) fn compute(
        snapshot: &SolvedSnapshot,
        instance: &Instance,
        resolved: &Resolved,
    ) -> Result<Self, ExtractError> {
        let metrics = PreferenceMetrics::from_resolved(instance, resolved);

        let mut solo_penalties = Vec::with_capacity(snapshot.solo_penalties.len());
        for id in &snapshot.solo_penalties {
            let e = lookup("employee", id, instance.employee(id))?;
            solo_penalties.push((e, id));
        }
        solo_penalties.sort_unstable();
        let solo_penalties = solo_penalties
            .into_iter()
            .map(|(e, id)| SoloPenaltyRow {
                employee: id.clone(),
                group: instance.groups()[instance.employees()[e].group].id.clone(),
            })
            .collect();

        let mut isolation_penalties = Vec::with_capacity(snapshot.isolation_penalties.len());
        for triple in &snapshot.isolation_penalties {
            let g = lookup("group", &triple.group, instance.group(&triple.group))?;
            let z = lookup("zone", &triple.zone, instance.zone(&triple.zone))?;
            let t = lookup("day", &triple.day, instance.day(&triple.day))?;
            isolation_penalties.push(((g, z, t), triple.clone()));
        }
        isolation_penalties.sort_unstable_by_key(|(key, _)| *key);
        let isolation_penalties = isolation_penalties.into_iter().map(|(_, z)| z).collect();

        // headcount[g][z][t]
        let days = instance.days().len();
        let zones = instance.zones().len();
        let mut headcount = vec![0u32; instance.groups().len() * zones * days];
        for &(e, t, _, z) in &resolved.assignments {
            let g = instance.employees()[e].group;
            headcount[(g * zones + z) * days + t] += 1;
        }

        let mut isolation_check = Vec::new();
        let mut zone_spread = 0u64;
        for (g, group) in instance.groups().iter().enumerate() {
            for (z, zone) in instance.zones().iter().enumerate() {
                for (t, day) in instance.days().iter().enumerate() {
                    let count = headcount[(g * zones + z) * days + t];
                    if count > 0 {
                        zone_spread += 1;
                    }
                    if count == 1 {
                        isolation_check.push(ZoneDay {
                            group: group.id.clone(),
                            zone: zone.id.clone(),
                            day: day.clone(),
                        });
                    }
                }
            }
        }

        let min_days = instance.bounds().min_days as usize;
        let solo = resolved
            .present
            .iter()
            .filter(|days| days.iter().filter(|&&p| p).count() < min_days)
            .count() as u64;
        let isolation = isolation_check.len() as u64;

        Ok(Self {
            metrics,
            penalized: snapshot.phase == Phase::Cohesion,
            solo_penalties,
            isolation_penalties,
            isolation_check,
            cohesion: CohesionScore {
                zone_spread,
                solo,
                isolation,
                total: zone_spread + solo + isolation,
            },
        })
    }

    /// Returns true if the solver's isolation penalties match the triples
    /// recomputed from assignments. Always true without penalty variables.
    pub fn isolation_consistent(&self) -> bool {
        if !self.penalized {
            return true;
        }
        let set: BTreeSet<&ZoneDay> = self.isolation_penalties.iter().collect();
        let check: BTreeSet<&ZoneDay> = self.isolation_check.iter().collect();
        set == check
    }
}
