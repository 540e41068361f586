//! Tests for dataset parsing and instance validation.

use std::io::Write;

use super::*;
use crate::error::DataFormatError;

const SMALL: &str = r#"{
    "Employees": ["E0", "E1", "E2"],
    "Desks": ["D0", "D1", "D2", "D3"],
    "Days": ["L", "Ma", "Mi", "J", "V"],
    "Groups": ["G0", "G1"],
    "Zones": ["Z0", "Z1"],
    "Desks_Z": {"Z0": ["D0", "D1"], "Z1": ["D2"]},
    "Desks_E": {"E0": ["D0", "D2", "D0"], "E1": ["D1"], "E2": ["D2", "D3"]},
    "Employees_G": {"G0": ["E0", "E1"], "G1": ["E2"]},
    "Days_E": {"E0": ["L", "Mi"], "E1": [], "E2": ["V"]}
}"#;

fn small() -> Dataset {
    Dataset::from_json_str(SMALL).unwrap()
}

fn build(dataset: &Dataset) -> Result<Instance, DataFormatError> {
    Instance::from_dataset("small", dataset, AttendanceBounds::default())
}

#[test]
fn test_parse_and_index() {
    let instance = build(&small()).unwrap();

    assert_eq!(instance.id(), "small");
    assert_eq!(instance.days().len(), 5);
    assert_eq!(instance.employee("E1"), Some(1));
    assert_eq!(instance.desk("D2"), Some(2));
    assert_eq!(instance.day("V"), Some(4));
    assert_eq!(instance.zone("Z1"), Some(1));
    assert_eq!(instance.group("G1"), Some(1));
    assert_eq!(instance.employee("nobody"), None);
}

#[test]
fn test_employee_relations_resolved() {
    let instance = build(&small()).unwrap();
    let e0 = &instance.employees()[0];

    // duplicate desk entry collapses
    assert_eq!(e0.allowed_desks, vec![0, 2]);
    assert_eq!(e0.group, 0);
    assert!(e0.prefers(0));
    assert!(!e0.prefers(1));
    assert!(e0.prefers(2));
    assert!(!e0.prefers(99));
    assert_eq!(e0.preferred_days().collect::<Vec<_>>(), vec![0, 2]);

    assert_eq!(instance.employees()[1].preferred_days().count(), 0);
}

#[test]
fn test_desk_zone_ownership() {
    let instance = build(&small()).unwrap();

    assert_eq!(instance.desks()[0].zone, Some(0));
    assert_eq!(instance.desks()[2].zone, Some(1));
    assert_eq!(instance.desks()[3].zone, None);
    let unzoned: Vec<_> = instance.unzoned_desks().map(|d| d.id.as_str()).collect();
    assert_eq!(unzoned, vec!["D3"]);
    assert_eq!(instance.zones()[0].desks, vec![0, 1]);
}

#[test]
fn test_reachable_headcount() {
    let instance = build(&small()).unwrap();

    assert_eq!(instance.reachable_headcount(0, 0), 2);
    // only E0 owns a desk in Z1
    assert_eq!(instance.reachable_headcount(0, 1), 1);
    assert_eq!(instance.reachable_headcount(1, 0), 0);
}

#[test]
fn test_summary_display() {
    let summary = build(&small()).unwrap().summary();

    assert_eq!(summary.employees, 3);
    assert_eq!(summary.to_string(), "E: 3 | T: 5 | Z: 2 | D: 4 | G: 2");
}

#[test]
fn test_missing_field_is_format_error() {
    let err = Dataset::from_json_str(r#"{"Employees": []}"#).unwrap_err();
    assert!(matches!(err, DataFormatError::Json(_)));
}

#[test]
fn test_empty_days_rejected() {
    let mut dataset = small();
    dataset.days.clear();
    dataset.employee_days.values_mut().for_each(Vec::clear);

    assert!(matches!(
        build(&dataset),
        Err(DataFormatError::EmptySet("Days"))
    ));
}

#[test]
fn test_duplicate_id_rejected() {
    let mut dataset = small();
    dataset.desks.push("D0".into());

    match build(&dataset) {
        Err(DataFormatError::DuplicateId { set, id }) => {
            assert_eq!(set, "Desks");
            assert_eq!(id, "D0");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_unknown_desk_reference_rejected() {
    let mut dataset = small();
    dataset
        .employee_desks
        .insert("E1".into(), vec!["D9".into()]);

    match build(&dataset) {
        Err(DataFormatError::UnknownReference {
            relation,
            owner,
            id,
        }) => {
            assert_eq!(relation, "Desks_E");
            assert_eq!(owner, "E1");
            assert_eq!(id, "D9");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_unknown_relation_key_rejected() {
    let mut dataset = small();
    dataset.employee_days.insert("E7".into(), vec![]);

    assert!(matches!(
        build(&dataset),
        Err(DataFormatError::UnknownReference { relation: "Days_E", .. })
    ));
}

#[test]
fn test_missing_relation_rejected() {
    let mut dataset = small();
    dataset.employee_days.remove("E2");

    match build(&dataset) {
        Err(DataFormatError::MissingRelation { relation, id }) => {
            assert_eq!(relation, "Days_E");
            assert_eq!(id, "E2");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_desk_in_two_zones_rejected() {
    let mut dataset = small();
    dataset.zone_desks.insert("Z1".into(), vec!["D2".into(), "D0".into()]);

    assert!(matches!(
        build(&dataset),
        Err(DataFormatError::DeskInSeveralZones { .. })
    ));
}

#[test]
fn test_overlapping_groups_rejected() {
    let mut dataset = small();
    dataset
        .group_employees
        .insert("G1".into(), vec!["E2".into(), "E0".into()]);

    assert!(matches!(
        build(&dataset),
        Err(DataFormatError::EmployeeInSeveralGroups { .. })
    ));
}

#[test]
fn test_employee_without_group_rejected() {
    let mut dataset = small();
    dataset.group_employees.insert("G1".into(), vec![]);

    match build(&dataset) {
        Err(DataFormatError::EmployeeWithoutGroup(id)) => assert_eq!(id, "E2"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_inverted_bounds_rejected() {
    assert!(AttendanceBounds::new(3, 2).is_err());
    let err = Instance::from_dataset(
        "small",
        &small(),
        AttendanceBounds {
            min_days: 4,
            max_days: 1,
        },
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "attendance bounds are inverted: min 4 > max 1");
}

#[test]
fn test_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SMALL.as_bytes()).unwrap();

    let dataset = Dataset::from_json_file(file.path()).unwrap();
    assert_eq!(dataset, small());

    let missing = Dataset::from_json_file(file.path().with_extension("absent"));
    assert!(matches!(missing, Err(DataFormatError::Io { .. })));
}

#[test]
fn test_json_round_trip_keeps_field_names() {
    let json = small().to_json_string().unwrap();

    assert!(json.contains("\"Desks_Z\""));
    assert!(json.contains("\"Employees_G\""));
    assert_eq!(Dataset::from_json_str(&json).unwrap(), small());
}
