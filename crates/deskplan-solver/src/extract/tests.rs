use deskplan_test::scenario;

use super::*;
use crate::snapshot::{AssignmentValue, GroupDay, PresenceValue, ZoneDay};

fn assign(employee: &str, day: &str, desk: &str, zone: &str) -> AssignmentValue {
    AssignmentValue {
        employee: employee.into(),
        day: day.into(),
        desk: desk.into(),
        zone: zone.into(),
    }
}

fn present(employee: &str, day: &str) -> PresenceValue {
    PresenceValue {
        employee: employee.into(),
        day: day.into(),
    }
}

fn zone_day(group: &str, zone: &str, day: &str) -> ZoneDay {
    ZoneDay {
        group: group.into(),
        zone: zone.into(),
        day: day.into(),
    }
}

fn snapshot(instance_id: &str, phase: Phase) -> SolvedSnapshot {
    SolvedSnapshot {
        instance_id: instance_id.into(),
        phase,
        status: SolveStatus::Optimal,
        objective_value: None,
        assignments: Vec::new(),
        presence: Vec::new(),
        primary_days: Vec::new(),
        zone_presence: Vec::new(),
        zone_spread: Vec::new(),
        solo_penalties: Vec::new(),
        isolation_penalties: Vec::new(),
    }
}

/// A on Mon and Thu, B on Tue; groups meet Mon and Tue.
fn two_employees_solution() -> SolvedSnapshot {
    let mut s = snapshot("two_employees", Phase::Preference);
    s.objective_value = Some(2.0);
    s.assignments = vec![
        assign("A", "Mon", "D1", "Z1"),
        assign("A", "Thu", "D1", "Z1"),
        assign("B", "Tue", "D2", "Z1"),
    ];
    s.presence = vec![present("A", "Mon"), present("A", "Thu"), present("B", "Tue")];
    s.primary_days = vec![
        GroupDay {
            group: "GA".into(),
            day: "Mon".into(),
        },
        GroupDay {
            group: "GB".into(),
            day: "Tue".into(),
        },
    ];
    s
}

/// The Monday meeting of the isolated-member scenario.
fn isolated_solution() -> SolvedSnapshot {
    let mut s = snapshot("isolated_member", Phase::Cohesion);
    s.assignments = vec![
        assign("E3", "Mon", "D3", "Z2"),
        assign("E1", "Mon", "D2", "Z1"),
        assign("E2", "Mon", "D1", "Z1"),
    ];
    s.presence = vec![present("E1", "Mon"), present("E2", "Mon"), present("E3", "Mon")];
    s.primary_days = vec![GroupDay {
        group: "G".into(),
        day: "Mon".into(),
    }];
    s.isolation_penalties = vec![zone_day("G", "Z2", "Mon")];
    s
}

#[test]
fn test_employee_summary_and_efficiency() {
    let instance = scenario::two_employees().instance();
    let report = extract(&two_employees_solution(), &instance).unwrap();

    let a = &report.employees[0];
    assert_eq!(a.employee, "A");
    assert_eq!(a.group, "GA");
    assert_eq!(a.assigned_days, vec!["Mon", "Thu"]);
    assert_eq!(a.preferred_days, vec!["Mon", "Wed"]);
    assert_eq!(a.zones, vec!["Z1"]);
    assert_eq!(a.efficiency, 0.5);
    assert_eq!(report.employees[1].efficiency, 1.0);
}

#[test]
fn test_efficiency_zero_without_assigned_days() {
    let instance = scenario::two_employees().instance();
    let report = extract(&snapshot("two_employees", Phase::Preference), &instance).unwrap();

    assert!(report.employees.iter().all(|e| e.efficiency == 0.0));
    assert!(report.employees.iter().all(|e| e.assigned_days.is_empty()));
    assert_eq!(report.diagnostics.metrics.satisfaction_percentage, 0.0);
}

#[test]
fn test_summary_display_rounds_efficiency() {
    let instance = scenario::two_groups().instance();
    let mut s = snapshot("two_groups", Phase::Preference);
    s.assignments = vec![
        assign("E3", "Mon", "D3", "Z2"),
        assign("E3", "Tue", "D4", "Z2"),
        assign("E3", "Wed", "D3", "Z2"),
    ];
    let report = extract(&s, &instance).unwrap();

    assert_eq!(
        report.employees[2].to_string(),
        "E3 (G1): days [Mon, Tue, Wed], preferred [Mon, Wed], zones [Z2], efficiency 0.67"
    );
}

#[test]
fn test_assignment_rows_follow_dataset_order() {
    let instance = scenario::isolated_member().instance();
    let report = extract(&isolated_solution(), &instance).unwrap();

    let employees: Vec<_> = report.assignments.iter().map(|r| r.employee.as_str()).collect();
    assert_eq!(employees, vec!["E1", "E2", "E3"]);
    assert_eq!(report.assignments[0].group, "G");
    assert_eq!(report.assignments[0].desk, "D2");
}

#[test]
fn test_meeting_tables() {
    let instance = scenario::isolated_member().instance();
    let report = extract(&isolated_solution(), &instance).unwrap();

    assert_eq!(report.meetings.len(), 1);
    let meeting = &report.meetings[0];
    assert_eq!(meeting.group, "G");
    assert_eq!(meeting.day, "Mon");
    assert_eq!(meeting.zones, vec!["Z1", "Z2"]);
    assert_eq!(meeting.members, vec!["E1", "E2", "E3"]);

    let desks: Vec<_> = report
        .meeting_desks
        .iter()
        .map(|r| (r.employee.as_str(), r.zone.as_str(), r.desk.as_str()))
        .collect();
    assert_eq!(desks, vec![("E1", "Z1", "D2"), ("E2", "Z1", "D1"), ("E3", "Z2", "D3")]);
}

#[test]
fn test_preference_metrics() {
    let instance = scenario::two_employees().instance();
    let metrics = PreferenceMetrics::of(&two_employees_solution(), &instance).unwrap();

    assert_eq!(metrics.total_presence, 3);
    assert_eq!(metrics.satisfied_preferences, 2);
    assert!((metrics.satisfaction_percentage - 66.666).abs() < 0.01);
}

#[test]
fn test_isolation_check_matches_penalties() {
    let instance = scenario::isolated_member().instance();
    let report = extract(&isolated_solution(), &instance).unwrap();
    let diagnostics = &report.diagnostics;

    assert!(diagnostics.penalized);
    assert_eq!(diagnostics.isolation_check, vec![zone_day("G", "Z2", "Mon")]);
    assert!(diagnostics.isolation_consistent());
    assert_eq!(
        diagnostics.cohesion,
        CohesionScore {
            zone_spread: 2,
            solo: 0,
            isolation: 1,
            total: 3,
        }
    );
}

#[test]
fn test_isolation_mismatch_detected() {
    let instance = scenario::isolated_member().instance();
    let mut s = isolated_solution();
    s.isolation_penalties.clear();

    let report = extract(&s, &instance).unwrap();
    assert!(!report.diagnostics.isolation_consistent());

    // without penalty variables there is nothing to compare
    s.phase = Phase::Preference;
    let report = extract(&s, &instance).unwrap();
    assert!(report.diagnostics.isolation_consistent());
    assert_eq!(report.diagnostics.isolation_check.len(), 1);
}

#[test]
fn test_solo_penalties_carry_group() {
    let instance = scenario::two_groups().instance();
    let mut s = snapshot("two_groups", Phase::Cohesion);
    s.solo_penalties = vec!["E4".into(), "E2".into()];

    let report = extract(&s, &instance).unwrap();
    let rows: Vec<_> = report
        .diagnostics
        .solo_penalties
        .iter()
        .map(|r| (r.employee.as_str(), r.group.as_str()))
        .collect();
    assert_eq!(rows, vec![("E2", "G1"), ("E4", "G2")]);
    // nobody present at all: every employee is below the floor
    assert_eq!(report.diagnostics.cohesion.solo, 4);
}

#[test]
fn test_extraction_is_idempotent_and_order_independent() {
    let instance = scenario::isolated_member().instance();
    let first = extract(&isolated_solution(), &instance).unwrap();
    let again = extract(&isolated_solution(), &instance).unwrap();
    assert_eq!(first.to_json_string().unwrap(), again.to_json_string().unwrap());

    let mut shuffled = isolated_solution();
    shuffled.assignments.reverse();
    shuffled.presence.reverse();
    let reordered = extract(&shuffled, &instance).unwrap();
    assert_eq!(first.to_json_string().unwrap(), reordered.to_json_string().unwrap());
}

#[test]
fn test_wrong_instance_rejected() {
    let instance = scenario::two_employees().instance();

    match extract(&isolated_solution(), &instance) {
        Err(ExtractError::InstanceMismatch { snapshot, instance }) => {
            assert_eq!(snapshot, "isolated_member");
            assert_eq!(instance, "two_employees");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_unknown_id_rejected() {
    let instance = scenario::two_employees().instance();
    let mut s = two_employees_solution();
    s.assignments.push(assign("A", "Sat", "D1", "Z1"));

    let err = extract(&s, &instance).unwrap_err();
    assert_eq!(err.to_string(), "snapshot references unknown day 'Sat'");
}
