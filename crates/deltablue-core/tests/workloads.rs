//! Chain and projection workloads driven end to end.

use deltablue_core::{AssertMode, Solver, Strength};
use deltablue_test::chain::ChainFixture;
use deltablue_test::projection::{ProjectionFixture, OFFSET, SCALE};

#[test]
fn test_chain_propagates_every_value() {
    let mut chain = ChainFixture::build(100).unwrap();
    let plan = chain.plan().unwrap();
    assert_eq!(plan.len(), 101);

    for value in 0..100 {
        assert_eq!(chain.drive(&plan, value).unwrap(), value);
    }
    assert!(chain.solver.diagnostics().is_empty());
}

#[test]
fn test_chain_plan_passes_full_checks() {
    let solver = Solver::new().with_assert_mode(AssertMode::Full);
    let mut chain = ChainFixture::build_with(solver, 20).unwrap();
    let plan = chain.plan().unwrap();

    assert_eq!(chain.drive(&plan, -7).unwrap(), -7);
    chain.solver.check_invariants().unwrap();
}

#[test]
fn test_chain_falls_back_to_stay_without_edit() {
    let mut chain = ChainFixture::build(10).unwrap();
    let plan = chain.plan().unwrap();
    chain.drive(&plan, 55).unwrap();

    chain.solver.destroy_constraint(chain.edit).unwrap();

    // The stay at the far end drives the whole chain again.
    let first = chain.solver.variable(chain.first()).unwrap();
    assert_eq!(first.walk_strength(), Strength::StrongDefault);
    assert_eq!(*first.value(), 55);
    chain.solver.check_invariants().unwrap();
}

#[test]
fn test_projection_round_trip() {
    let n = 100;
    let mut projection = ProjectionFixture::build(n).unwrap();
    let src = projection.sources[n - 1];
    let dst = projection.destinations[n - 1];
    assert_eq!(
        projection.solver.value(dst),
        Some((n as i64 - 1) * SCALE + OFFSET)
    );

    projection.solver.change(src, 17).unwrap();
    assert_eq!(projection.solver.value(dst), Some(1170));

    projection.solver.change(dst, 1050).unwrap();
    assert_eq!(projection.solver.value(src), Some(5));

    projection.solver.change(projection.scale, 5).unwrap();
    let values = projection.destination_values();
    for (i, value) in values.iter().enumerate().take(n - 1) {
        assert_eq!(*value, i as i64 * 5 + 1000);
    }

    projection.solver.change(projection.offset, 2000).unwrap();
    let values = projection.destination_values();
    for (i, value) in values.iter().enumerate().take(n - 1) {
        assert_eq!(*value, i as i64 * 5 + 2000);
    }

    assert!(projection.solver.diagnostics().is_empty());
    projection.solver.check_invariants().unwrap();
}

#[test]
fn test_projection_sources_keep_their_stays() {
    let projection = ProjectionFixture::build(5).unwrap();
    for &src in &projection.sources {
        let var = projection.solver.variable(src).unwrap();
        assert_eq!(var.walk_strength(), Strength::Normal);
        assert!(var.stay());
    }
    assert_eq!(projection.solver.graph().constraint_count(), 10);
}
