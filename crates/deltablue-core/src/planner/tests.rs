//! Planner tests.
//!
//! These drive the planner directly against a bare graph, without the
//! solver's bookkeeping, so each test can inspect intermediate state.

use super::*;
use crate::constraint::{Constraint, ConstraintKind, Direction};

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    graph: ConstraintGraph,
    planner: Planner,
}

impl Fixture {
    fn new() -> Self {
        Self {
            graph: ConstraintGraph::new(),
            planner: Planner::new(),
        }
    }

    fn var(&mut self, name: &str, value: i64) -> VariableId {
        self.graph.add_variable(name, value)
    }

    fn add(&mut self, kind: ConstraintKind, strength: Strength) -> ConstraintId {
        let c = self
            .graph
            .insert_constraint(Constraint::new(kind, strength))
            .unwrap();
        self.planner.add_constraint(&mut self.graph, c);
        c
    }

    fn stay(&mut self, v: VariableId, strength: Strength) -> ConstraintId {
        self.add(ConstraintKind::Stay { output: v }, strength)
    }

    fn edit(&mut self, v: VariableId, strength: Strength) -> ConstraintId {
        self.add(ConstraintKind::Edit { output: v }, strength)
    }

    fn equality(&mut self, v1: VariableId, v2: VariableId, strength: Strength) -> ConstraintId {
        self.add(ConstraintKind::Equality { v1, v2 }, strength)
    }

    fn value(&self, v: VariableId) -> i64 {
        *self.graph.variable(v).unwrap().value()
    }

    fn determiner(&self, v: VariableId) -> Option<ConstraintId> {
        self.graph.variable(v).unwrap().determined_by()
    }

    fn walk(&self, v: VariableId) -> Strength {
        self.graph.variable(v).unwrap().walk_strength()
    }

    fn direction(&self, c: ConstraintId) -> Direction {
        self.graph.constraint(c).unwrap().direction()
    }
}

// ============================================================================
// Marks
// ============================================================================

#[test]
fn test_marks_start_after_variable_default() {
    let mut planner = Planner::new();
    assert_eq!(planner.current_mark(), 0);
    assert_eq!(planner.new_mark(), 1);
    assert_eq!(planner.new_mark(), 2);
    assert_eq!(planner.current_mark(), 2);
}

#[test]
fn test_every_insertion_allocates_a_mark() {
    let mut f = Fixture::new();
    let a = f.var("a", 0);
    f.stay(a, Strength::Normal);
    assert_eq!(f.planner.current_mark(), 1);

    let b = f.var("b", 0);
    f.equality(a, b, Strength::Required);
    assert_eq!(f.planner.current_mark(), 2);
}

// ============================================================================
// Incremental add
// ============================================================================

#[test]
fn test_equality_drives_weaker_side() {
    let mut f = Fixture::new();
    let a = f.var("a", 4);
    let b = f.var("b", 0);
    f.stay(a, Strength::Required);
    let eq = f.equality(a, b, Strength::Normal);

    assert_eq!(f.direction(eq), Direction::Forward);
    assert_eq!(f.determiner(b), Some(eq));
    assert_eq!(f.walk(b), Strength::Normal);
    assert_eq!(f.value(b), 4);
    f.graph.check_invariants().unwrap();
}

#[test]
fn test_weaker_stay_stays_unsatisfied() {
    let mut f = Fixture::new();
    let v = f.var("v", 1);
    let strong = f.stay(v, Strength::Normal);
    let weak = f.stay(v, Strength::WeakDefault);

    assert!(f.graph.is_satisfied(strong));
    assert!(!f.graph.is_satisfied(weak));
    assert_eq!(f.determiner(v), Some(strong));
    assert!(f.planner.diagnostics().is_empty());
}

#[test]
fn test_eviction_chain_reverses_equality() {
    let mut f = Fixture::new();
    let a = f.var("a", 1);
    let b = f.var("b", 2);
    let stay_a = f.stay(a, Strength::WeakDefault);
    let eq = f.equality(a, b, Strength::Normal);
    assert_eq!(f.direction(eq), Direction::Forward);

    // The required stay on b evicts eq, which re-satisfies backwards and
    // in turn evicts the weak stay on a.
    let stay_b = f.stay(b, Strength::Required);

    assert_eq!(f.determiner(b), Some(stay_b));
    assert_eq!(f.direction(eq), Direction::Backward);
    assert_eq!(f.determiner(a), Some(eq));
    assert!(!f.graph.is_satisfied(stay_a));
    assert_eq!(f.walk(a), Strength::Normal);
    assert_eq!(f.value(a), f.value(b));
    f.graph.check_invariants().unwrap();
}

#[test]
fn test_propagation_cycle_rolls_back_new_constraint() {
    let mut f = Fixture::new();
    let a = f.var("a", 3);
    let b = f.var("b", 0);
    let c1 = f.equality(a, b, Strength::Required);
    let c2 = f.equality(b, a, Strength::StrongDefault);

    assert!(f.graph.is_satisfied(c1));
    assert!(!f.graph.is_satisfied(c2));
    assert_eq!(f.determiner(b), Some(c1));
    assert_eq!(f.determiner(a), None);
    assert!(!f.graph.variable(a).unwrap().constraints().contains(&c2));
    assert_eq!(
        f.planner.diagnostics(),
        &[Diagnostic::PropagationCycle { constraint: c2 }]
    );
    f.graph.check_invariants().unwrap();
}

#[test]
fn test_unsatisfiable_required_reports_once() {
    let mut f = Fixture::new();
    let a = f.var("a", 1);
    let b = f.var("b", 2);
    let stay_a = f.stay(a, Strength::Required);
    let stay_b = f.stay(b, Strength::Required);
    let eq = f.equality(a, b, Strength::Required);

    assert!(!f.graph.is_satisfied(eq));
    assert_eq!(f.determiner(a), Some(stay_a));
    assert_eq!(f.determiner(b), Some(stay_b));
    assert_eq!((f.value(a), f.value(b)), (1, 2));
    assert_eq!(
        f.planner.take_diagnostics(),
        vec![Diagnostic::UnsatisfiableRequired { constraint: eq }]
    );
    assert!(f.planner.diagnostics().is_empty());
}

// ============================================================================
// Incremental remove
// ============================================================================

#[test]
fn test_remove_resets_output_to_free() {
    let mut f = Fixture::new();
    let a = f.var("a", 4);
    let b = f.var("b", 0);
    f.stay(a, Strength::Required);
    let eq = f.equality(a, b, Strength::StrongDefault);

    f.planner.destroy_constraint(&mut f.graph, eq);

    let out = f.graph.variable(b).unwrap();
    assert_eq!(out.determined_by(), None);
    assert_eq!(out.walk_strength(), Strength::Weakest);
    assert!(out.stay());
    assert!(out.constraints().is_empty());
    assert_eq!(*out.value(), 4);
    f.graph.check_invariants().unwrap();
}

#[test]
fn test_remove_retries_strongest_first() {
    let mut f = Fixture::new();
    let v = f.var("v", 0);
    let required = f.stay(v, Strength::Required);
    let normal = f.stay(v, Strength::Normal);
    let preferred = f.stay(v, Strength::Preferred);
    assert!(!f.graph.is_satisfied(normal));
    assert!(!f.graph.is_satisfied(preferred));

    f.planner.destroy_constraint(&mut f.graph, required);

    assert_eq!(f.determiner(v), Some(preferred));
    assert!(!f.graph.is_satisfied(normal));
    assert_eq!(f.walk(v), Strength::Preferred);
    f.graph.check_invariants().unwrap();
}

#[test]
fn test_remove_recalculates_downstream() {
    let mut f = Fixture::new();
    let a = f.var("a", 5);
    let b = f.var("b", 0);
    let c = f.var("c", 0);
    let stay = f.stay(a, Strength::StrongDefault);
    f.equality(a, b, Strength::Required);
    f.equality(b, c, Strength::Required);
    assert_eq!(f.walk(c), Strength::StrongDefault);

    f.planner.destroy_constraint(&mut f.graph, stay);

    assert_eq!(f.walk(b), Strength::Weakest);
    assert_eq!(f.walk(c), Strength::Weakest);
    assert!(f.graph.variable(c).unwrap().stay());
    assert_eq!(f.value(c), 5);
}

#[test]
fn test_destroy_unsatisfied_only_detaches() {
    let mut f = Fixture::new();
    let v = f.var("v", 0);
    let strong = f.stay(v, Strength::Required);
    let weak = f.stay(v, Strength::Normal);
    let mark = f.planner.current_mark();

    f.planner.destroy_constraint(&mut f.graph, weak);

    assert_eq!(f.planner.current_mark(), mark);
    assert_eq!(f.determiner(v), Some(strong));
    assert_eq!(f.graph.variable(v).unwrap().constraints(), &[strong]);
}

#[test]
fn test_add_then_remove_restores_walk_strengths() {
    let mut f = Fixture::new();
    let a = f.var("a", 1);
    let b = f.var("b", 2);
    let c = f.var("c", 3);
    f.stay(a, Strength::Normal);
    f.equality(a, b, Strength::Required);
    f.stay(c, Strength::WeakDefault);
    let before: Vec<_> = [a, b, c]
        .iter()
        .map(|v| (f.walk(*v), f.determiner(*v)))
        .collect();

    let eq = f.equality(b, c, Strength::StrongPreferred);
    assert_eq!(f.determiner(c), Some(eq));
    f.planner.destroy_constraint(&mut f.graph, eq);

    let after: Vec<_> = [a, b, c]
        .iter()
        .map(|v| (f.walk(*v), f.determiner(*v)))
        .collect();
    assert_eq!(before, after);
}

// ============================================================================
// Plan extraction
// ============================================================================

fn chain(f: &mut Fixture, n: usize) -> Vec<VariableId> {
    let vars: Vec<_> = (0..n).map(|i| f.var(&format!("v{i}"), 0)).collect();
    for pair in vars.windows(2) {
        f.equality(pair[0], pair[1], Strength::Required);
    }
    f.stay(vars[n - 1], Strength::StrongDefault);
    vars
}

#[test]
fn test_stay_at_chain_end_drives_backwards() {
    let mut f = Fixture::new();
    let vars = chain(&mut f, 3);
    let eq1 = f.determiner(vars[0]).unwrap();
    let eq2 = f.determiner(vars[1]).unwrap();
    assert_eq!(f.direction(eq1), Direction::Backward);
    assert_eq!(f.direction(eq2), Direction::Backward);
    assert_eq!(f.walk(vars[0]), Strength::StrongDefault);
}

#[test]
fn test_extract_plan_orders_downstream() {
    let mut f = Fixture::new();
    let vars = chain(&mut f, 3);
    let edit = f.edit(vars[0], Strength::Preferred);
    let eq1 = f.determiner(vars[1]).unwrap();
    let eq2 = f.determiner(vars[2]).unwrap();
    assert_eq!(f.walk(vars[2]), Strength::Preferred);
    assert!(!f.graph.variable(vars[2]).unwrap().stay());

    let plan = f
        .planner
        .extract_plan_from_constraints(&mut f.graph, &[edit]);
    assert_eq!(plan.constraints(), &[edit, eq1, eq2]);
    plan.validate(&f.graph).unwrap();

    for value in [7, 11] {
        f.graph.variable_mut(vars[0]).unwrap().set_value(value);
        plan.execute(&mut f.graph);
        assert_eq!(f.value(vars[2]), value);
    }
}

#[test]
fn test_extract_plan_ignores_non_input_constraints() {
    let mut f = Fixture::new();
    let a = f.var("a", 10);
    let b = f.var("b", 0);
    let stay = f.stay(a, Strength::Required);
    f.equality(a, b, Strength::Normal);

    let plan = f
        .planner
        .extract_plan_from_constraints(&mut f.graph, &[stay]);
    assert!(plan.is_empty());
}

#[test]
fn test_make_plan_skips_unsatisfied_sources() {
    let mut f = Fixture::new();
    let v = f.var("v", 0);
    f.stay(v, Strength::Required);
    let weak = f.edit(v, Strength::Normal);
    assert!(!f.graph.is_satisfied(weak));

    let plan = f.planner.make_plan(&mut f.graph, &[weak]);
    assert!(plan.is_empty());
}

#[test]
fn test_validate_rejects_reordered_plan() {
    let mut f = Fixture::new();
    let vars = chain(&mut f, 3);
    let edit = f.edit(vars[0], Strength::Preferred);
    let eq1 = f.determiner(vars[1]).unwrap();
    let eq2 = f.determiner(vars[2]).unwrap();

    let mut plan = Plan::new();
    for c in [edit, eq2, eq1] {
        plan.add_constraint(c);
    }
    assert!(matches!(
        plan.validate(&f.graph),
        Err(crate::DeltaBlueError::InvalidPlan(_))
    ));
}
