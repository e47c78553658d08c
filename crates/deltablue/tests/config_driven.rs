//! Workloads running on solvers built from configuration files.

use deltablue::prelude::*;
use deltablue_test::chain::ChainFixture;
use deltablue_test::projection::ProjectionFixture;
use deltablue_test::random::{RandomWorkload, DEFAULT_SEED};

const CONFIG: &str = r#"
    environment_mode = "full_assert"
    random_seed = 11

    [edit]
    strength = "strong_preferred"
    repeat = 2
"#;

#[test]
fn test_chain_under_full_assert() {
    let config = SolverConfig::from_toml_str(CONFIG).unwrap();
    config.validate().unwrap();

    let mut chain = ChainFixture::build_with(build_solver(&config), 50).unwrap();
    let plan = chain.plan().unwrap();
    for value in [3, 1, 4, 1, 5] {
        assert_eq!(chain.drive(&plan, value).unwrap(), value);
    }
}

#[test]
fn test_projection_with_configured_edits() {
    let config = SolverConfig::from_yaml_str("edit:\n  repeat: 3\n").unwrap();
    let mut projection = ProjectionFixture::build_with(build_solver(&config), 10).unwrap();
    assert_eq!(projection.solver.edit_options().repeat, 3);

    let src = projection.sources[4];
    let dst = projection.destinations[4];
    projection.solver.change(src, 2).unwrap();
    assert_eq!(projection.solver.value(dst), Some(1020));
}

#[test]
fn test_random_workload_seeded_from_config() {
    let config = SolverConfig::from_toml_str(
        "environment_mode = \"fast_assert\"\nrandom_seed = 11\n",
    )
    .unwrap();

    let mut configured: Solver = build_solver(&config);
    let mut explicit: Solver = build_solver(&config);
    let mut from_config = RandomWorkload::from_config(&mut configured, &config, 8);
    let mut seeded = RandomWorkload::new(&mut explicit, 8, 11);

    for _ in 0..100 {
        let a = from_config.step(&mut configured).unwrap();
        let b = seeded.step(&mut explicit).unwrap();
        assert_eq!(a, b);
    }
    configured.check_invariants().unwrap();
}

#[test]
fn test_random_workload_default_seed() {
    let config = SolverConfig::new();
    let mut configured: Solver = build_solver(&config);
    let mut explicit: Solver = build_solver(&config);
    let mut from_config = RandomWorkload::from_config(&mut configured, &config, 6);
    let mut seeded = RandomWorkload::new(&mut explicit, 6, DEFAULT_SEED);

    for _ in 0..20 {
        assert_eq!(from_config.next_operation(), seeded.next_operation());
    }
}
