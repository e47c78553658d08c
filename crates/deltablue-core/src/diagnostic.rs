//! Non-fatal planner notices.

use std::fmt;

use crate::constraint::ConstraintId;

/// A notice raised while the planner keeps the graph consistent.
///
/// Neither kind aborts the current operation: an unsatisfiable required
/// constraint is simply left unsatisfied, and a constraint that closes a
/// cycle is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    /// A `Required` constraint found no method strong enough to apply.
    UnsatisfiableRequired { constraint: ConstraintId },

    /// Forward propagation revisited a variable within one traversal.
    PropagationCycle { constraint: ConstraintId },
}

impl Diagnostic {
    /// The constraint the notice is about.
    pub fn constraint(&self) -> ConstraintId {
        match *self {
            Diagnostic::UnsatisfiableRequired { constraint }
            | Diagnostic::PropagationCycle { constraint } => constraint,
        }
    }

    /// Structured event name used when the notice is logged.
    pub fn event(&self) -> &'static str {
        match self {
            Diagnostic::UnsatisfiableRequired { .. } => "unsatisfiable_required",
            Diagnostic::PropagationCycle { .. } => "propagation_cycle",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsatisfiableRequired { constraint } => {
                write!(f, "Could not satisfy a required constraint ({constraint})")
            }
            Diagnostic::PropagationCycle { constraint } => {
                write!(f, "Cycle encountered while propagating {constraint}")
            }
        }
    }
}
