//! Constraint variants.
//!
//! A constraint relates one or two variables (plus, for scale constraints,
//! two operand variables) and offers a small set of methods for satisfying
//! itself. Binary constraints pick a [`Direction`]; unary constraints are
//! either satisfied or not.
//!
//! Only the state a constraint owns lives here. Everything that has to read
//! or write the constrained variables (method selection, recalculation,
//! execution) is implemented on [`ConstraintGraph`](crate::ConstraintGraph).

use std::fmt;

use smallvec::{smallvec, SmallVec};

use crate::strength::Strength;
use crate::variable::VariableId;

/// Handle to a constraint stored in a [`ConstraintGraph`](crate::ConstraintGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {
    /// Returns the arena index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Selected method of a constraint.
///
/// Binary constraints drive `v2` from `v1` (`Forward`) or `v1` from `v2`
/// (`Backward`). Unary constraints use `Forward` to mean "satisfied".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    None,
    Forward,
    Backward,
}

/// The concrete kind of a constraint and the variables it binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Keeps `output` at its current value.
    Stay { output: VariableId },

    /// Marks `output` as changed by the host. The only input constraint kind.
    Edit { output: VariableId },

    /// `v1 == v2`, in whichever direction is selected.
    Equality { v1: VariableId, v2: VariableId },

    /// `v2 == v1 * scale + offset`.
    Scale {
        v1: VariableId,
        v2: VariableId,
        scale: VariableId,
        offset: VariableId,
    },
}

impl ConstraintKind {
    /// Returns every variable the constraint attaches to.
    pub fn variables(&self) -> SmallVec<[VariableId; 4]> {
        match *self {
            ConstraintKind::Stay { output } | ConstraintKind::Edit { output } => smallvec![output],
            ConstraintKind::Equality { v1, v2 } => smallvec![v1, v2],
            ConstraintKind::Scale {
                v1,
                v2,
                scale,
                offset,
            } => smallvec![v1, v2, scale, offset],
        }
    }

    /// Returns `(v1, v2)` for binary kinds.
    pub fn ends(&self) -> Option<(VariableId, VariableId)> {
        match *self {
            ConstraintKind::Equality { v1, v2 } | ConstraintKind::Scale { v1, v2, .. } => {
                Some((v1, v2))
            }
            ConstraintKind::Stay { .. } | ConstraintKind::Edit { .. } => None,
        }
    }

    pub fn is_unary(&self) -> bool {
        self.ends().is_none()
    }

    /// Short name used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::Stay { .. } => "stay",
            ConstraintKind::Edit { .. } => "edit",
            ConstraintKind::Equality { .. } => "equality",
            ConstraintKind::Scale { .. } => "scale",
        }
    }
}

/// A constraint with a fixed strength and a transient method selection.
///
/// # Example
///
/// ```
/// use deltablue_core::{Constraint, ConstraintKind, Direction, Strength};
/// # use deltablue_core::ConstraintGraph;
/// # let mut graph: ConstraintGraph = ConstraintGraph::new();
/// # let a = graph.add_variable("a", 1);
/// # let b = graph.add_variable("b", 2);
///
/// let c = Constraint::new(ConstraintKind::Equality { v1: a, v2: b }, Strength::Required);
/// assert!(!c.is_satisfied());
/// assert_eq!(c.direction(), Direction::None);
/// assert!(!c.is_input());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    strength: Strength,
    kind: ConstraintKind,
    direction: Direction,
}

impl Constraint {
    /// Creates an unsatisfied constraint.
    pub fn new(kind: ConstraintKind, strength: Strength) -> Self {
        Self {
            strength,
            kind,
            direction: Direction::None,
        }
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// True while a method is selected.
    pub fn is_satisfied(&self) -> bool {
        self.direction != Direction::None
    }

    /// Clears the selected method.
    pub fn mark_unsatisfied(&mut self) {
        self.direction = Direction::None;
    }

    /// True for constraints whose value is supplied by the host.
    pub fn is_input(&self) -> bool {
        matches!(self.kind, ConstraintKind::Edit { .. })
    }

    /// The variable read by the selected method, if any.
    ///
    /// Unary constraints have no input.
    pub fn input(&self) -> Option<VariableId> {
        let (v1, v2) = self.kind.ends()?;
        Some(if self.direction == Direction::Forward {
            v1
        } else {
            v2
        })
    }

    /// Every variable read by the selected method: the input plus, for
    /// scale constraints, the scale and offset operands.
    pub fn inputs(&self) -> SmallVec<[VariableId; 3]> {
        let Some(input) = self.input() else {
            return SmallVec::new();
        };
        match self.kind {
            ConstraintKind::Scale { scale, offset, .. } => smallvec![input, scale, offset],
            _ => smallvec![input],
        }
    }

    /// The variable driven by the selected method.
    ///
    /// For an unsatisfied binary constraint this is `v1`.
    pub fn output(&self) -> VariableId {
        match self.kind {
            ConstraintKind::Stay { output } | ConstraintKind::Edit { output } => output,
            ConstraintKind::Equality { v1, v2 } | ConstraintKind::Scale { v1, v2, .. } => {
                if self.direction == Direction::Forward {
                    v2
                } else {
                    v1
                }
            }
        }
    }
}
