//! Error types for the DeltaBlue engine

use thiserror::Error;

use crate::constraint::ConstraintId;
use crate::variable::VariableId;

/// Main error type for host-facing engine operations.
///
/// Algorithmic outcomes such as an unsatisfiable required constraint or a
/// propagation cycle are not errors; they are reported as
/// [`Diagnostic`](crate::Diagnostic)s and the engine keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaBlueError {
    /// The variable handle does not refer to a live variable
    #[error("Unknown variable: {0}")]
    UnknownVariable(VariableId),

    /// The constraint handle does not refer to a live constraint
    #[error("Unknown constraint: {0}")]
    UnknownConstraint(ConstraintId),

    /// A variable cannot be removed while constraints still reference it
    #[error("Variable {variable} is still referenced by {constraints} constraint(s)")]
    VariableInUse {
        variable: VariableId,
        constraints: usize,
    },

    /// A graph invariant no longer holds
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A plan would read a variable before the constraint writing it runs
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

/// Result type alias for DeltaBlue operations
pub type Result<T> = std::result::Result<T, DeltaBlueError>;
