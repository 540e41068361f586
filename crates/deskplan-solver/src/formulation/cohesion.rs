//! Phase 1: cohesion minimization under the epsilon floor.

use deskplan_core::Instance;
use tracing::debug;

use super::{family, CohesionVars, Phase, PhaseModel, ScheduleVars, ZoneCell};
use crate::epsilon::Epsilon;
use crate::lp::{Cmp, LinearExpr, LinearModel, Sense, VarKind};

/// Builds the cohesion model.
///
/// Minimizes total zone spread plus solo and isolation penalties. All
/// preference-phase constraints are restated with the attendance floor
/// relaxed by the solo penalty, and the satisfied-preference count must reach
/// `epsilon`.
///
/// Zone presence and isolation variables exist only for zones a group can
/// reach; the big-M of the upper isolation link is that group's reachable
/// headcount in the zone.
pub fn build_cohesion_model(instance: &Instance, epsilon: Epsilon) -> PhaseModel {
    let mut model = LinearModel::new(Sense::Minimize);
    let schedule = ScheduleVars::generate(instance, &mut model);
    let zones = instance.zones().len();

    let solo: Vec<_> = instance
        .employees()
        .iter()
        .map(|e| model.add_var(format!("Pen1[{}]", e.id), VarKind::Binary))
        .collect();

    let mut spread = Vec::with_capacity(instance.groups().len());
    for group in instance.groups() {
        spread.push(
            instance
                .days()
                .iter()
                .map(|day| {
                    model.add_var(format!("J[{},{day}]", group.id), VarKind::NonNegInteger)
                })
                .collect::<Vec<_>>(),
        );
    }

    // reachable (g, z) pairs with their big-M
    let mut cells = Vec::new();
    let mut first_cell: Vec<Option<usize>> = vec![None; instance.groups().len() * zones];
    let mut big_m = Vec::new();
    for (g, group) in instance.groups().iter().enumerate() {
        for (z, zone) in instance.zones().iter().enumerate() {
            let headcount = instance.reachable_headcount(g, z);
            if headcount == 0 {
                continue;
            }
            first_cell[g * zones + z] = Some(cells.len());
            for (t, day) in instance.days().iter().enumerate() {
                let presence = model.add_var(
                    format!("P[{},{},{day}]", group.id, zone.id),
                    VarKind::Binary,
                );
                let isolation = model.add_var(
                    format!("Pen2[{},{},{day}]", group.id, zone.id),
                    VarKind::Binary,
                );
                cells.push(ZoneCell {
                    group: g,
                    zone: z,
                    day: t,
                    presence,
                    isolation,
                });
                big_m.push(headcount);
            }
        }
    }

    // headcount expression per cell
    let mut headcount: Vec<LinearExpr> = vec![LinearExpr::new(); cells.len()];
    for x in &schedule.assignments {
        let g = instance.employees()[x.employee].group;
        if let Some(base) = first_cell[g * zones + x.zone] {
            headcount[base + x.day].add(x.var, 1.0);
        }
    }

    let mut objective = LinearExpr::sum(spread.iter().flatten().copied());
    objective.terms.extend(solo.iter().map(|&v| (v, 1.0)));
    objective
        .terms
        .extend(cells.iter().map(|c| (c.isolation, 1.0)));
    model.set_objective(objective);

    schedule.add_common_constraints(instance, &mut model, Some(solo.as_slice()));

    for ((cell, count), &m) in cells.iter().zip(headcount).zip(&big_m) {
        let lower = count
            .clone()
            .with(cell.presence, -2.0)
            .with(cell.isolation, 1.0);
        model.add_constraint(family::ISOLATION_LOWER, lower, Cmp::Ge, 0.0);

        let upper = count.with(cell.presence, -(m as f64));
        model.add_constraint(family::ISOLATION_UPPER, upper, Cmp::Le, 0.0);
    }

    for (g, per_day) in spread.iter().enumerate() {
        for (t, &j) in per_day.iter().enumerate() {
            let mut link = LinearExpr::term(j, 1.0);
            for z in 0..zones {
                if let Some(base) = first_cell[g * zones + z] {
                    link.add(cells[base + t].presence, -1.0);
                }
            }
            model.add_constraint(family::ZONE_SPREAD, link, Cmp::Eq, 0.0);
        }
    }

    model.add_constraint(
        family::EPSILON,
        schedule.satisfied_preferences(instance),
        Cmp::Ge,
        epsilon.value() as f64,
    );

    debug!(
        event = "model_built",
        instance = instance.id(),
        phase = "cohesion",
        variables = model.variables().len(),
        constraints = model.constraints().len(),
        zone_cells = cells.len(),
        epsilon = epsilon.value(),
    );

    PhaseModel {
        phase: Phase::Cohesion,
        model,
        schedule,
        cohesion: Some(CohesionVars {
            spread,
            solo,
            cells,
        }),
    }
}
