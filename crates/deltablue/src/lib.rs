//! DeltaBlue - An incremental constraint propagation engine in Rust
//!
//! Build a graph of variables and constraints, then let the planner keep
//! every variable determined by its strongest applicable constraint.
//!
//! # Example
//!
//! ```rust
//! use deltablue::prelude::*;
//!
//! let mut solver = build_solver::<i64>(&SolverConfig::default());
//! let (width, _) = solver.add_variable_with_stay("width", 20, Strength::Normal).unwrap();
//! let height = solver.add_variable("height", 0);
//! solver.add_equality(width, height, Strength::Required).unwrap();
//!
//! solver.change(width, 35).unwrap();
//! assert_eq!(solver.value(height), Some(35));
//! ```

// Engine types
pub use deltablue_core::{
    AssertMode, Constraint, ConstraintGraph, ConstraintId, ConstraintKind, DeltaBlueError,
    Diagnostic, Direction, EditOptions, Plan, Planner, Solver, Strength, Value, Variable,
    VariableId,
};

// Configuration
pub use deltablue_config::{ConfigError, EnvironmentMode, SolverConfig};

mod builder;
pub use builder::{build_solver, load_solver, stay_strength, CONFIG_FILE};

#[cfg(feature = "console")]
pub mod console;

pub mod prelude {
    pub use super::{build_solver, load_solver, stay_strength};
    pub use super::{ConstraintId, Diagnostic, Plan, Solver, Strength, VariableId};
    pub use super::{EnvironmentMode, SolverConfig};
}
