//! Config-driven solver construction.

use deltablue_config::SolverConfig;
use deltablue_core::{Solver, Strength, Value};
use tracing::debug;

/// File [`load_solver`] reads its configuration from.
pub const CONFIG_FILE: &str = "deltablue.toml";

/// Builds an empty solver configured by `config`.
pub fn build_solver<T: Value>(config: &SolverConfig) -> Solver<T> {
    debug!(
        event = "solver_configured",
        environment_mode = ?config.environment_mode,
        edit_strength = %config.edit.strength,
        edit_repeat = config.edit.repeat,
    );
    Solver::new()
        .with_assert_mode(config.environment_mode.assert_mode())
        .with_edit_options(config.edit.options())
}

/// Builds a solver from `deltablue.toml` in the working directory.
///
/// Proceeds with defaults if the file is missing or invalid.
pub fn load_solver<T: Value>() -> Solver<T> {
    let config = SolverConfig::load(CONFIG_FILE).unwrap_or_default();
    build_solver(&config)
}

/// Strength to use for stay constraints on new variables.
pub fn stay_strength(config: &SolverConfig) -> Strength {
    config.stay.strength
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltablue_config::EnvironmentMode;
    use deltablue_core::AssertMode;

    #[test]
    fn test_build_solver_applies_config() {
        let config = SolverConfig::new()
            .with_environment_mode(EnvironmentMode::FullAssert)
            .with_edit_strength(Strength::StrongPreferred)
            .with_edit_repeat(4);

        let solver: Solver = build_solver(&config);
        assert_eq!(solver.assert_mode(), AssertMode::Full);
        assert_eq!(solver.edit_options().strength, Strength::StrongPreferred);
        assert_eq!(solver.edit_options().repeat, 4);
    }

    #[test]
    fn test_stay_strength_from_config() {
        let config = SolverConfig::from_toml_str("[stay]\nstrength = \"strong_default\"").unwrap();
        let mut solver: Solver = build_solver(&config);
        let (v, stay) = solver
            .add_variable_with_stay("v", 1, stay_strength(&config))
            .unwrap();
        assert_eq!(
            solver.constraint(stay).unwrap().strength(),
            Strength::StrongDefault
        );
        assert_eq!(
            solver.variable(v).unwrap().walk_strength(),
            Strength::StrongDefault
        );
    }

    #[test]
    fn test_load_solver_without_file_uses_defaults() {
        let solver: Solver<f64> = load_solver();
        assert_eq!(solver.assert_mode(), AssertMode::Off);
        assert_eq!(solver.edit_options().repeat, 1);
    }
}
