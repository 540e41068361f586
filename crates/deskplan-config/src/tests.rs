//! Tests for planner configuration.

use std::io::Write;

use super::*;

#[test]
fn test_defaults() {
    let config = PlannerConfig::default();

    assert_eq!(config.attendance, AttendanceBounds { min_days: 2, max_days: 3 });
    assert_eq!(config.preference_time_limit(), Duration::from_secs(300));
    assert_eq!(config.cohesion_time_limit(), Duration::from_secs(3600));
    assert_eq!(config.preference.relative_gap(), 0.01);
    assert_eq!(config.epsilon, SatisfactionTarget::Fixed { ratio: 0.65 });
    assert_eq!(config.batch.large_instance_increment(), Duration::from_secs(1800));
    assert!(!config.batch.parallel);
    assert_eq!(config.output.directory, PathBuf::from("model_outputs"));
    assert!(config.output.persist);
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        [attendance]
        min_days = 1
        max_days = 4

        [preference]
        time_limit_seconds = 30
        relative_gap = 0.0

        [epsilon]
        target = "match_achieved"

        [batch]
        large_instances = ["instance10"]
        large_instance_increment_seconds = 900
        parallel = true

        [output]
        directory = "out"
    "#;

    let config = PlannerConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.attendance.min_days, 1);
    assert_eq!(config.attendance.max_days, 4);
    assert_eq!(config.preference_time_limit(), Duration::from_secs(30));
    assert_eq!(config.preference.relative_gap(), 0.0);
    // untouched section keeps its own default
    assert_eq!(config.cohesion_time_limit(), Duration::from_secs(3600));
    assert_eq!(config.epsilon, SatisfactionTarget::MatchAchieved);
    assert!(config.batch.is_large("instance10"));
    assert!(!config.batch.is_large("instance1"));
    assert_eq!(config.batch.large_instance_increment(), Duration::from_secs(900));
    assert!(config.batch.parallel);
    assert_eq!(config.output.directory, PathBuf::from("out"));
    assert!(config.output.persist);
}

#[test]
fn test_partial_attendance_keeps_other_default() {
    let config = PlannerConfig::from_toml_str("[attendance]\nmax_days = 5\n").unwrap();

    assert_eq!(config.attendance, AttendanceBounds { min_days: 2, max_days: 5 });
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        cohesion:
          time_limit_seconds: 120
        epsilon:
          target: fixed
          ratio: 0.9
    "#;

    let config = PlannerConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.cohesion_time_limit(), Duration::from_secs(120));
    assert_eq!(config.epsilon, SatisfactionTarget::Fixed { ratio: 0.9 });
}

#[test]
fn test_invalid_toml_is_error() {
    let err = PlannerConfig::from_toml_str("[attendance\nmin_days = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_load_file_and_missing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[output]\npersist = false").unwrap();

    let config = PlannerConfig::load(file.path()).unwrap();
    assert!(!config.output.persist);

    let missing = PlannerConfig::load(file.path().with_extension("absent"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));
}

#[test]
fn test_builder() {
    let config = PlannerConfig::new()
        .with_attendance(1, 1)
        .with_preference_time_limit(5)
        .with_cohesion_time_limit(10)
        .with_relative_gap(0.05)
        .with_satisfaction_target(SatisfactionTarget::MatchAchieved)
        .with_output_directory("tmp")
        .with_persist(false)
        .with_parallel(true)
        .with_large_instance("instance9");

    assert_eq!(config.attendance.max_days, 1);
    assert_eq!(config.preference_time_limit(), Duration::from_secs(5));
    assert_eq!(config.cohesion_time_limit(), Duration::from_secs(10));
    assert_eq!(config.cohesion.relative_gap(), 0.05);
    assert_eq!(config.batch.large_instances, vec!["instance9"]);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_values() {
    let inverted = PlannerConfig::new().with_attendance(3, 2);
    assert!(matches!(inverted.validate(), Err(ConfigError::Invalid(_))));

    let zero_limit = PlannerConfig::new().with_cohesion_time_limit(0);
    assert!(zero_limit.validate().is_err());

    let wide_gap = PlannerConfig::new().with_relative_gap(1.0);
    assert!(wide_gap.validate().is_err());

    for ratio in [0.0, -0.2, 1.5] {
        let config =
            PlannerConfig::new().with_satisfaction_target(SatisfactionTarget::Fixed { ratio });
        assert!(config.validate().is_err(), "ratio {ratio} accepted");
    }

    let full = PlannerConfig::new().with_satisfaction_target(SatisfactionTarget::Fixed { ratio: 1.0 });
    assert!(full.validate().is_ok());
}
