//! DeltaBlue Core - Incremental local-propagation constraint engine
//!
//! This crate provides the fundamental pieces of the DeltaBlue planner:
//! - Strength levels used to arbitrate between competing constraints
//! - Variables and constraint variants stored in an arena graph
//! - The incremental planner (add/remove, propagation, plan extraction)
//! - Plans: replayable evaluation orders over satisfied constraints
//! - A host-facing [`Solver`] tying all of the above together
//!
//! # Example
//!
//! ```
//! use deltablue_core::{Solver, Strength};
//!
//! let mut solver: Solver = Solver::new();
//! let a = solver.add_variable("a", 10);
//! let b = solver.add_variable("b", 0);
//!
//! solver.add_stay(a, Strength::Required).unwrap();
//! let eq = solver.add_equality(a, b, Strength::StrongDefault).unwrap();
//!
//! let plan = solver.make_plan(&[eq]).unwrap();
//! solver.execute_plan(&plan).unwrap();
//! assert_eq!(solver.value(b), Some(10));
//! ```

pub mod constraint;
pub mod diagnostic;
pub mod error;
pub mod graph;
pub mod planner;
pub mod solver;
pub mod strength;
pub mod variable;


pub use constraint::{Constraint, ConstraintId, ConstraintKind, Direction};
pub use diagnostic::Diagnostic;
pub use error::{DeltaBlueError, Result};
pub use graph::{ConstraintGraph, Value};
pub use planner::{Plan, Planner};
pub use solver::{AssertMode, EditOptions, Solver};
pub use strength::Strength;
pub use variable::{Variable, VariableId};
