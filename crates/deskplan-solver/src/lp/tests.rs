use super::*;

fn two_binaries() -> (LinearModel, VarId, VarId) {
    let mut model = LinearModel::new(Sense::Maximize);
    let a = model.add_var("a", VarKind::Binary);
    let b = model.add_var("b", VarKind::Binary);
    model.set_objective(LinearExpr::sum([a, b]));
    model.add_constraint("pair", LinearExpr::sum([a, b]), Cmp::Le, 1.0);
    (model, a, b)
}

#[test]
fn test_evaluate_with_constant() {
    let mut expr = LinearExpr::term(VarId(0), 2.0).with(VarId(1), -1.0);
    expr.constant = 0.5;

    assert_eq!(expr.evaluate(&[1.0, 3.0]), -0.5);
    // missing values count as zero
    assert_eq!(expr.evaluate(&[1.0]), 2.5);
}

#[test]
fn test_check_reports_violated_family() {
    let (model, _, _) = two_binaries();

    assert!(model.check(&[1.0, 0.0]).is_empty());
    let violations = model.check(&[1.0, 1.0]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].family, "pair");
    assert_eq!(violations[0].detail, "2 <= 1");
}

#[test]
fn test_check_reports_domain_violations() {
    let mut model = LinearModel::new(Sense::Minimize);
    model.add_var("x", VarKind::Binary);
    model.add_var("n", VarKind::NonNegInteger);

    assert!(model.check(&[1.0, 7.0]).is_empty());
    let violations = model.check(&[0.5, -1.0]);
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.family == "domain"));
}

#[test]
fn test_equality_tolerance() {
    let c = Constraint {
        family: "eq",
        lhs: LinearExpr::sum([VarId(0)]),
        cmp: Cmp::Eq,
        rhs: 1.0,
    };

    assert!(c.is_satisfied(&[1.0 + 1e-9]));
    assert!(!c.is_satisfied(&[0.9]));
}

#[test]
fn test_family_counts_keep_insertion_order() {
    let (mut model, a, b) = two_binaries();
    model.add_constraint("single", LinearExpr::sum([a]), Cmp::Ge, 0.0);
    model.add_constraint("pair", LinearExpr::sum([a, b]), Cmp::Ge, 0.0);

    assert_eq!(model.family_counts(), vec![("pair", 2), ("single", 1)]);
    assert_eq!(model.family("pair").count(), 2);
    assert_eq!(model.objective_value(&[1.0, 0.0]), 1.0);
}
