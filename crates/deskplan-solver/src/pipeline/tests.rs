use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use deskplan_config::{PlannerConfig, SatisfactionTarget};
use deskplan_test::{scenario, Scenario};

use super::*;
use crate::backend::{GoodLpSolver, SolveOutcome};
use crate::lp::{LinearModel, Sense};

/// Solves for real, then reports the result as a time-limit incumbent.
#[derive(Debug, Default)]
struct TimeLimitedSolver;

impl MilpSolver for TimeLimitedSolver {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> SolveOutcome {
        let mut outcome = GoodLpSolver::new().solve(model, options);
        if outcome.status == SolveStatus::Optimal {
            outcome.status = SolveStatus::TimeLimitFeasible;
        }
        outcome
    }
}

/// Fails every minimization model.
#[derive(Debug, Default)]
struct FailingCohesionSolver;

impl MilpSolver for FailingCohesionSolver {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> SolveOutcome {
        match model.sense() {
            Sense::Maximize => GoodLpSolver::new().solve(model, options),
            Sense::Minimize => SolveOutcome::error("no incumbent"),
        }
    }
}

#[derive(Debug, Default)]
struct CountingSolver {
    calls: AtomicUsize,
}

impl MilpSolver for CountingSolver {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> SolveOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        GoodLpSolver::new().solve(model, options)
    }
}

/// Claims optimality without values.
#[derive(Debug, Default)]
struct EmptySolver;

impl MilpSolver for EmptySolver {
    fn solve(&self, _model: &LinearModel, _options: &SolveOptions) -> SolveOutcome {
        SolveOutcome::solved(SolveStatus::Optimal, 0.0, Vec::new())
    }
}

fn config_for(s: &Scenario) -> PlannerConfig {
    PlannerConfig::new()
        .with_attendance(s.bounds.min_days, s.bounds.max_days)
        .with_preference_time_limit(60)
        .with_cohesion_time_limit(60)
        .with_persist(false)
}

fn source(s: &Scenario) -> InstanceSource {
    InstanceSource::dataset(s.id, s.dataset.clone())
}

/// Checks the hard rules of any solved schedule.
fn assert_schedule_rules(s: &Scenario, report: &ScheduleReport, relaxed_floor: bool) {
    let instance = s.instance();
    for summary in &report.employees {
        let days = summary.assigned_days.len() as u32;
        assert!(days <= s.bounds.max_days, "{} over max", summary.employee);
        if !relaxed_floor {
            assert!(days >= s.bounds.min_days, "{} under min", summary.employee);
        }
    }
    let mut seen = std::collections::HashSet::new();
    for row in &report.assignments {
        assert!(seen.insert((row.desk.clone(), row.day.clone())), "desk booked twice");
        let e = instance.employee(&row.employee).unwrap();
        let d = instance.desk(&row.desk).unwrap();
        assert!(instance.employees()[e].allowed_desks.contains(&d));
        assert_eq!(instance.desks()[d].zone, instance.zone(&row.zone));
    }
    assert_eq!(report.meetings.len(), instance.groups().len());
    for meeting in &report.meetings {
        for member in &meeting.members {
            assert!(report
                .assignments
                .iter()
                .any(|r| &r.employee == member && r.day == meeting.day));
        }
    }
}

#[test]
fn test_two_employee_scenario() {
    let s = scenario::two_employees();
    let pipeline = Pipeline::new(config_for(&s)).unwrap();

    let outcome = pipeline.run(&source(&s)).unwrap();

    let preference = outcome.preference.report.diagnostics.metrics;
    assert_eq!(preference.satisfied_preferences, 3);
    assert!((3..=4).contains(&preference.total_presence));
    assert_eq!(
        preference.satisfaction_percentage,
        300.0 / preference.total_presence as f64
    );
    let expected = Epsilon::derive(&preference, pipeline.config().epsilon).unwrap();
    assert_eq!(outcome.epsilon, expected);
    assert!((2..=3).contains(&outcome.epsilon.value()));

    let cohesion = &outcome.cohesion.report;
    assert!(cohesion.diagnostics.metrics.satisfied_preferences >= 2);
    assert!(cohesion.diagnostics.metrics.satisfied_preferences >= outcome.epsilon.value());
    assert_eq!(cohesion.status, SolveStatus::Optimal);
    assert_schedule_rules(&s, &outcome.preference.report, false);
    assert_schedule_rules(&s, cohesion, true);
    assert!(!outcome.preference.suboptimal());
}

#[test]
fn test_isolated_member_scenario() {
    let s = scenario::isolated_member();
    let pipeline = Pipeline::new(config_for(&s)).unwrap();

    let outcome = pipeline.run(&source(&s)).unwrap();
    let diagnostics = &outcome.cohesion.report.diagnostics;

    assert_eq!(outcome.cohesion.snapshot.objective_value, Some(3.0));
    assert_eq!(diagnostics.isolation_penalties.len(), 1);
    assert_eq!(diagnostics.isolation_penalties[0].zone, "Z2");
    assert_eq!(diagnostics.isolation_penalties[0].day, "Mon");
    assert_eq!(diagnostics.isolation_check, diagnostics.isolation_penalties);
    assert!(diagnostics.isolation_consistent());
    assert_eq!(diagnostics.cohesion.total, 3);
}

#[test]
fn test_match_achieved_target_keeps_full_satisfaction() {
    let s = scenario::two_employees();
    let config = config_for(&s).with_satisfaction_target(SatisfactionTarget::MatchAchieved);
    let pipeline = Pipeline::new(config).unwrap();

    let outcome = pipeline.run(&source(&s)).unwrap();

    assert_eq!(outcome.epsilon.value(), 3);
    assert_eq!(
        outcome
            .cohesion
            .report
            .diagnostics
            .metrics
            .satisfied_preferences,
        3
    );
}

#[test]
fn test_infeasible_preference_phase_stops_instance() {
    let s = scenario::unreachable_member();
    let pipeline = Pipeline::with_solver(config_for(&s), CountingSolver::default()).unwrap();

    let failure = pipeline.run(&source(&s)).unwrap_err();

    assert_eq!(failure.instance_id, "unreachable_member");
    assert_eq!(failure.stage, Stage::PreferenceSolve);
    assert!(matches!(
        failure.error,
        PipelineError::ModelInfeasible {
            phase: Phase::Preference
        }
    ));
    // the cohesion model is never attempted
    assert_eq!(pipeline.solver().calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_time_limit_incumbent_is_accepted() {
    let s = scenario::two_employees();
    let pipeline = Pipeline::with_solver(config_for(&s), TimeLimitedSolver).unwrap();

    let outcome = pipeline.run(&source(&s)).unwrap();

    assert!(outcome.preference.suboptimal());
    assert!(outcome.cohesion.suboptimal());
    assert_eq!(outcome.cohesion.report.status, SolveStatus::TimeLimitFeasible);
    assert_eq!(outcome.preference.report.status, SolveStatus::TimeLimitFeasible);
}

#[test]
fn test_solver_error_reports_cohesion_stage() {
    let s = scenario::two_employees();
    let pipeline = Pipeline::with_solver(config_for(&s), FailingCohesionSolver).unwrap();

    let failure = pipeline.run(&source(&s)).unwrap_err();

    assert_eq!(failure.stage, Stage::CohesionSolve);
    assert_eq!(
        failure.to_string(),
        "instance two_employees failed during cohesion solve: cohesion solve failed: no incumbent"
    );
}

#[test]
fn test_missing_values_rejected() {
    let s = scenario::two_employees();
    let pipeline = Pipeline::with_solver(config_for(&s), EmptySolver).unwrap();

    let failure = pipeline.run(&source(&s)).unwrap_err();
    assert!(matches!(failure.error, PipelineError::Solver { .. }));
    assert_eq!(failure.stage, Stage::PreferenceSolve);
}

#[test]
fn test_data_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"Employees": ["E0"]}"#).unwrap();
    let pipeline = Pipeline::new(PlannerConfig::new().with_persist(false)).unwrap();

    let failure = pipeline.run(&InstanceSource::file(&path)).unwrap_err();

    assert_eq!(failure.instance_id, "broken");
    assert_eq!(failure.stage, Stage::DataLoad);
    assert!(matches!(failure.error, PipelineError::DataFormat(_)));
}

#[test]
fn test_file_source_and_persistence() {
    let s = scenario::two_employees();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_employees.json");
    std::fs::write(&path, s.to_json()).unwrap();
    let output = dir.path().join("model_outputs");
    let config = config_for(&s)
        .with_persist(true)
        .with_output_directory(&output);
    let pipeline = Pipeline::new(config).unwrap();

    let outcome = pipeline.run(&InstanceSource::file(&path)).unwrap();

    let store = pipeline.store().unwrap();
    for phase in [Phase::Preference, Phase::Cohesion] {
        assert!(store.snapshot_path("two_employees", phase).exists());
        assert!(store.finished_at("two_employees", phase).unwrap().is_some());
    }
    let instance = s.instance();
    let reloaded = report_from_store(store, &instance, Phase::Cohesion).unwrap();
    assert_eq!(reloaded, outcome.cohesion.report);
}

#[test]
fn test_invalid_config_rejected() {
    let config =
        PlannerConfig::new().with_satisfaction_target(SatisfactionTarget::Fixed { ratio: 1.5 });
    let err = Pipeline::new(config).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_cohesion_limits_widen_cumulatively() {
    let mut config = PlannerConfig::new()
        .with_cohesion_time_limit(10)
        .with_large_instance("b")
        .with_large_instance("c")
        .with_persist(false);
    config.batch.large_instance_increment_seconds = Some(100);
    let pipeline = Pipeline::new(config).unwrap();
    let sources: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| InstanceSource::dataset(*id, Default::default()))
        .collect();

    let limits = BatchRunner::new(&pipeline).cohesion_limits(&sources);

    let secs: Vec<_> = limits.iter().map(Duration::as_secs).collect();
    assert_eq!(secs, vec![10, 110, 210, 210]);
}

fn batch_sources() -> Vec<InstanceSource> {
    vec![
        source(&scenario::two_employees()),
        source(&scenario::unreachable_member()),
        source(&scenario::shared_desk()),
    ]
}

#[test]
fn test_batch_isolates_failures() {
    let s = scenario::two_employees();
    let pipeline = Pipeline::new(config_for(&s)).unwrap();

    let report = BatchRunner::new(&pipeline).run(&batch_sources());

    assert_eq!(report.results.len(), 3);
    assert!(!report.is_success());
    let ok: Vec<_> = report.succeeded().map(|o| o.instance_id.as_str()).collect();
    assert_eq!(ok, vec!["two_employees", "shared_desk"]);
    let failed: Vec<_> = report.failed().map(|f| (f.instance_id.as_str(), f.stage)).collect();
    assert_eq!(failed, vec![("unreachable_member", Stage::PreferenceSolve)]);
}

#[test]
fn test_parallel_batch_keeps_input_order() {
    let s = scenario::two_employees();
    let pipeline = Pipeline::new(config_for(&s).with_parallel(true)).unwrap();

    let report = BatchRunner::new(&pipeline).run(&batch_sources());

    let ids: Vec<_> = report
        .results
        .iter()
        .map(|r| match r {
            Ok(o) => o.instance_id.clone(),
            Err(f) => f.instance_id.clone(),
        })
        .collect();
    assert_eq!(ids, vec!["two_employees", "unreachable_member", "shared_desk"]);
    assert_eq!(report.succeeded().count(), 2);
}

#[test]
fn test_source_ids() {
    assert_eq!(InstanceSource::file("data/instance7.json").id(), "instance7");
    assert_eq!(
        InstanceSource::dataset("inline", Default::default()).id(),
        "inline"
    );
}

#[test]
fn test_repeated_instance_id_is_rejected() {
    let s = scenario::two_employees();
    let dir = tempfile::tempdir().unwrap();
    let mut sources = Vec::new();
    for sub in ["a", "b"] {
        let folder = dir.path().join(sub);
        std::fs::create_dir(&folder).unwrap();
        let path = folder.join("two_employees.json");
        std::fs::write(&path, s.to_json()).unwrap();
        sources.push(InstanceSource::file(path));
    }
    let config = config_for(&s)
        .with_parallel(true)
        .with_persist(true)
        .with_output_directory(dir.path().join("out"));
    let pipeline = Pipeline::with_solver(config, CountingSolver::default()).unwrap();

    let report = BatchRunner::new(&pipeline).run(&sources);

    assert_eq!(report.results.len(), 2);
    assert!(report.results[0].is_ok());
    let failure = report.results[1].as_ref().unwrap_err();
    assert_eq!(failure.instance_id, "two_employees");
    assert_eq!(failure.stage, Stage::DataLoad);
    assert!(matches!(
        &failure.error,
        PipelineError::DuplicateInstance { id } if id == "two_employees"
    ));
    // only the first source reaches the solver, once per phase
    assert_eq!(pipeline.solver().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_epsilon_failure_names_its_stage() {
    let metrics = PreferenceMetrics::new(4, 3);

    let failure =
        derive_epsilon("inst1", &metrics, SatisfactionTarget::Fixed { ratio: 1.5 }).unwrap_err();

    assert_eq!(failure.stage, Stage::Epsilon);
    assert!(matches!(failure.error, PipelineError::InvalidRatio(_)));
    assert!(failure
        .to_string()
        .starts_with("instance inst1 failed during epsilon derivation:"));

    let epsilon =
        derive_epsilon("inst1", &metrics, SatisfactionTarget::Fixed { ratio: 0.65 }).unwrap();
    assert_eq!(epsilon.value(), 3);
}
