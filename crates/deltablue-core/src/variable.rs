//! Graph variables.

use std::fmt;

use smallvec::SmallVec;

use crate::constraint::ConstraintId;
use crate::strength::Strength;

/// Handle to a variable stored in a [`ConstraintGraph`](crate::ConstraintGraph).
///
/// Handles are never reused within one graph, so a handle to a removed
/// variable stays dangling instead of aliasing a newer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    /// Returns the arena index of this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A node of the constraint graph.
///
/// Holds an opaque value plus the bookkeeping the planner needs:
/// the walk strength, the stay flag, the constraint currently determining
/// the value, the traversal mark, and every constraint touching the variable.
///
/// # Example
///
/// ```
/// use deltablue_core::{Strength, Variable};
///
/// let v = Variable::new("width", 42);
/// assert_eq!(*v.value(), 42);
/// assert_eq!(v.walk_strength(), Strength::Weakest);
/// assert!(v.stay());
/// assert!(v.determined_by().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Variable<T> {
    name: String,
    value: T,
    walk_strength: Strength,
    stay: bool,
    determined_by: Option<ConstraintId>,
    mark: u64,
    constraints: SmallVec<[ConstraintId; 4]>,
}

impl<T> Variable<T> {
    /// Creates a free variable: weakest walk strength, stay, no determiner.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
            walk_strength: Strength::Weakest,
            stay: true,
            determined_by: None,
            mark: 0,
            constraints: SmallVec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    pub fn walk_strength(&self) -> Strength {
        self.walk_strength
    }

    pub fn set_walk_strength(&mut self, strength: Strength) {
        self.walk_strength = strength;
    }

    /// True if the value is fixed and needs no recomputation by a plan.
    pub fn stay(&self) -> bool {
        self.stay
    }

    pub fn set_stay(&mut self, stay: bool) {
        self.stay = stay;
    }

    /// The constraint currently responsible for this variable's value.
    pub fn determined_by(&self) -> Option<ConstraintId> {
        self.determined_by
    }

    pub fn set_determined_by(&mut self, constraint: Option<ConstraintId>) {
        self.determined_by = constraint;
    }

    /// Traversal mark; only meaningful during a single planner traversal.
    pub fn mark(&self) -> u64 {
        self.mark
    }

    pub fn set_mark(&mut self, mark: u64) {
        self.mark = mark;
    }

    /// Every constraint attached to this variable.
    pub fn constraints(&self) -> &[ConstraintId] {
        &self.constraints
    }

    /// Attaches a constraint.
    pub fn add_constraint(&mut self, constraint: ConstraintId) {
        self.constraints.push(constraint);
    }

    /// Detaches a constraint; a no-op when it is not attached.
    ///
    /// Clears the determiner if it was the removed constraint, so
    /// `determined_by` always stays a member of `constraints`.
    pub fn remove_constraint(&mut self, constraint: ConstraintId) {
        self.constraints.retain(|c| *c != constraint);
        if self.determined_by == Some(constraint) {
            self.determined_by = None;
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
