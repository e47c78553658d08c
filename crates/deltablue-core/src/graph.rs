//! Arena-backed constraint graph.
//!
//! The graph owns every [`Variable`] and [`Constraint`]. Graph edges
//! (a variable's attached constraints, its determiner, a constraint's
//! variables) are plain handles into the two arenas, so detaching and
//! eviction never leave a dangling reference behind: a stale handle is
//! simply not found.
//!
//! The per-constraint operations the planner drives (`choose_method`,
//! `recalculate`, `execute`, ...) live here because each of them reads or
//! writes the constrained variables.

use std::fmt::Debug;

use num_traits::Num;

use crate::constraint::{Constraint, ConstraintId, ConstraintKind, Direction};
use crate::error::{DeltaBlueError, Result};
use crate::strength::Strength;
use crate::variable::{Variable, VariableId};

/// Values the engine can propagate.
///
/// The engine only copies values around; the arithmetic exists for the
/// scale constraint's formula. Integer implementations are checked, so a
/// scale step that would overflow yields `None` and writes nothing.
pub trait Value: Copy + Debug + Num {
    /// `self * scale + offset`, or `None` if it does not fit.
    fn scaled(self, scale: Self, offset: Self) -> Option<Self>;

    /// `(self - offset) / scale`, or `None` if `scale` is zero or the
    /// result does not fit.
    fn unscaled(self, scale: Self, offset: Self) -> Option<Self>;
}

macro_rules! impl_checked_value {
    ($($t:ty),+) => {
        $(
            impl Value for $t {
                fn scaled(self, scale: Self, offset: Self) -> Option<Self> {
                    self.checked_mul(scale)?.checked_add(offset)
                }

                fn unscaled(self, scale: Self, offset: Self) -> Option<Self> {
                    self.checked_sub(offset)?.checked_div(scale)
                }
            }
        )+
    };
}

macro_rules! impl_float_value {
    ($($t:ty),+) => {
        $(
            impl Value for $t {
                fn scaled(self, scale: Self, offset: Self) -> Option<Self> {
                    Some(self * scale + offset)
                }

                fn unscaled(self, scale: Self, offset: Self) -> Option<Self> {
                    if scale == 0.0 {
                        return None;
                    }
                    Some((self - offset) / scale)
                }
            }
        )+
    };
}

impl_checked_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float_value!(f32, f64);

/// Variables and constraints plus the edges between them.
#[derive(Debug, Clone)]
pub struct ConstraintGraph<T = i64> {
    variables: Vec<Option<Variable<T>>>,
    constraints: Vec<Option<Constraint>>,
    live_variables: usize,
    live_constraints: usize,
}

impl<T: Value> Default for ConstraintGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> ConstraintGraph<T> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            live_variables: 0,
            live_constraints: 0,
        }
    }

    /// Creates an empty graph with pre-allocated arenas.
    pub fn with_capacity(variables: usize, constraints: usize) -> Self {
        Self {
            variables: Vec::with_capacity(variables),
            constraints: Vec::with_capacity(constraints),
            live_variables: 0,
            live_constraints: 0,
        }
    }

    // ------------------------------------------------------------------
    // Arena management
    // ------------------------------------------------------------------

    /// Adds a free variable and returns its handle.
    pub fn add_variable(&mut self, name: impl Into<String>, value: T) -> VariableId {
        let id = VariableId(self.variables.len());
        self.variables.push(Some(Variable::new(name, value)));
        self.live_variables += 1;
        id
    }

    /// Removes a variable that no constraint references any more.
    pub fn remove_variable(&mut self, id: VariableId) -> Result<Variable<T>> {
        let attached = self
            .variable(id)
            .ok_or(DeltaBlueError::UnknownVariable(id))?
            .constraints()
            .len();
        if attached > 0 {
            return Err(DeltaBlueError::VariableInUse {
                variable: id,
                constraints: attached,
            });
        }
        self.live_variables -= 1;
        self.variables[id.0]
            .take()
            .ok_or(DeltaBlueError::UnknownVariable(id))
    }

    /// Stores a constraint without attaching it to its variables.
    ///
    /// Fails if any of the constraint's variables is not in the graph.
    pub fn insert_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId> {
        if let Some(missing) = constraint
            .kind()
            .variables()
            .into_iter()
            .find(|v| !self.contains_variable(*v))
        {
            return Err(DeltaBlueError::UnknownVariable(missing));
        }
        let id = ConstraintId(self.constraints.len());
        self.constraints.push(Some(constraint));
        self.live_constraints += 1;
        Ok(id)
    }

    /// Drops a constraint from the arena. The caller detaches it first.
    pub(crate) fn take_constraint(&mut self, id: ConstraintId) -> Result<Constraint> {
        let constraint = self
            .constraints
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(DeltaBlueError::UnknownConstraint(id))?;
        self.live_constraints -= 1;
        Ok(constraint)
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable<T>> {
        self.variables.get(id.0).and_then(Option::as_ref)
    }

    pub fn variable_mut(&mut self, id: VariableId) -> Option<&mut Variable<T>> {
        self.variables.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.0).and_then(Option::as_ref)
    }

    pub fn contains_variable(&self, id: VariableId) -> bool {
        self.variable(id).is_some()
    }

    pub fn contains_constraint(&self, id: ConstraintId) -> bool {
        self.constraint(id).is_some()
    }

    pub fn variable_count(&self) -> usize {
        self.live_variables
    }

    pub fn constraint_count(&self) -> usize {
        self.live_constraints
    }

    /// Handles of every live variable, in creation order.
    pub fn variable_ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| VariableId(i))
    }

    /// Handles of every live constraint, in creation order.
    pub fn constraint_ids(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| ConstraintId(i))
    }

    pub(crate) fn var(&self, id: VariableId) -> &Variable<T> {
        match self.variable(id) {
            Some(v) => v,
            None => panic!("variable {id} is not part of the graph"),
        }
    }

    pub(crate) fn var_mut(&mut self, id: VariableId) -> &mut Variable<T> {
        match self.variable_mut(id) {
            Some(v) => v,
            None => panic!("variable {id} is not part of the graph"),
        }
    }

    pub(crate) fn con(&self, id: ConstraintId) -> &Constraint {
        match self.constraint(id) {
            Some(c) => c,
            None => panic!("constraint {id} is not part of the graph"),
        }
    }

    fn con_mut(&mut self, id: ConstraintId) -> &mut Constraint {
        match self.constraints.get_mut(id.0).and_then(Option::as_mut) {
            Some(c) => c,
            None => panic!("constraint {id} is not part of the graph"),
        }
    }

    // ------------------------------------------------------------------
    // Constraint operations
    //
    // These take handles the planner already holds; a stale handle here is
    // a corrupted graph and panics.
    // ------------------------------------------------------------------

    pub fn is_satisfied(&self, c: ConstraintId) -> bool {
        self.con(c).is_satisfied()
    }

    pub fn output(&self, c: ConstraintId) -> VariableId {
        self.con(c).output()
    }

    pub fn mark_unsatisfied(&mut self, c: ConstraintId) {
        self.con_mut(c).mark_unsatisfied();
    }

    /// Selects a method for `c` given the variables tagged with `mark`.
    ///
    /// A freshly marked end is treated as a known input and takes precedence;
    /// otherwise the side with the weaker walk strength is driven, provided
    /// `c` is strong enough to override it.
    pub fn choose_method(&mut self, c: ConstraintId, mark: u64) {
        let constraint = self.con(c);
        let strength = constraint.strength();
        let kind = *constraint.kind();
        let direction = match kind {
            ConstraintKind::Stay { output } | ConstraintKind::Edit { output } => {
                let out = self.var(output);
                if out.mark() != mark && Strength::stronger(strength, out.walk_strength()) {
                    Direction::Forward
                } else {
                    Direction::None
                }
            }
            ConstraintKind::Equality { v1, v2 } | ConstraintKind::Scale { v1, v2, .. } => {
                let (a, b) = (self.var(v1), self.var(v2));
                if a.mark() == mark {
                    if b.mark() != mark && Strength::stronger(strength, b.walk_strength()) {
                        Direction::Forward
                    } else {
                        Direction::None
                    }
                } else if b.mark() == mark {
                    if Strength::stronger(strength, a.walk_strength()) {
                        Direction::Backward
                    } else {
                        Direction::None
                    }
                } else if Strength::weaker(a.walk_strength(), b.walk_strength()) {
                    if Strength::stronger(strength, a.walk_strength()) {
                        Direction::Backward
                    } else {
                        Direction::None
                    }
                } else if Strength::stronger(strength, b.walk_strength()) {
                    Direction::Forward
                } else {
                    Direction::None
                }
            }
        };
        self.con_mut(c).set_direction(direction);
    }

    /// Attaches `c` to every variable it constrains.
    pub fn add_to_graph(&mut self, c: ConstraintId) {
        let variables = self.con(c).kind().variables();
        for v in variables {
            self.var_mut(v).add_constraint(c);
        }
        self.con_mut(c).set_direction(Direction::None);
    }

    /// Detaches `c` from its variables, skipping any that are already gone.
    pub fn remove_from_graph(&mut self, c: ConstraintId) {
        let variables = self.con(c).kind().variables();
        for v in variables {
            if let Some(var) = self.variable_mut(v) {
                var.remove_constraint(c);
            }
        }
        self.con_mut(c).set_direction(Direction::None);
    }

    /// Tags the selected inputs of `c` with `mark`.
    pub fn mark_inputs(&mut self, c: ConstraintId, mark: u64) {
        let inputs = self.con(c).inputs();
        for v in inputs {
            self.var_mut(v).set_mark(mark);
        }
    }

    /// True if the input of `c` is marked, stays, or is a free root value.
    pub fn inputs_known(&self, c: ConstraintId, mark: u64) -> bool {
        match self.con(c).input() {
            None => true,
            Some(input) => {
                let i = self.var(input);
                i.mark() == mark || i.stay() || i.determined_by().is_none()
            }
        }
    }

    /// Recomputes the output value of `c` from its inputs.
    ///
    /// An unsatisfied constraint has no selected method and writes nothing.
    /// A scale step whose result does not fit `T` leaves its output as is.
    pub fn execute(&mut self, c: ConstraintId) {
        let constraint = self.con(c);
        if !constraint.is_satisfied() {
            return;
        }
        let direction = constraint.direction();
        let kind = *constraint.kind();
        match kind {
            ConstraintKind::Stay { .. } | ConstraintKind::Edit { .. } => {}
            ConstraintKind::Equality { .. } => {
                let (Some(input), output) = (constraint.input(), constraint.output()) else {
                    return;
                };
                let value = *self.var(input).value();
                self.var_mut(output).set_value(value);
            }
            ConstraintKind::Scale {
                v1,
                v2,
                scale,
                offset,
            } => {
                let scale = *self.var(scale).value();
                let offset = *self.var(offset).value();
                let (output, value) = if direction == Direction::Forward {
                    (v2, (*self.var(v1).value()).scaled(scale, offset))
                } else {
                    (v1, (*self.var(v2).value()).unscaled(scale, offset))
                };
                if let Some(value) = value {
                    self.var_mut(output).set_value(value);
                }
            }
        }
    }

    /// Derives the output's walk strength and stay flag after `c` was
    /// (re)selected, executing `c` at once when the output stays.
    pub fn recalculate(&mut self, c: ConstraintId) {
        let constraint = self.con(c);
        let strength = constraint.strength();
        let output = constraint.output();
        let (walk_strength, stay) = match constraint.input() {
            Some(input) => (
                Strength::weakest(strength, self.var(input).walk_strength()),
                constraint.inputs().iter().all(|v| self.var(*v).stay()),
            ),
            None => (strength, !constraint.is_input()),
        };

        let out = self.var_mut(output);
        out.set_walk_strength(walk_strength);
        out.set_stay(stay);
        if stay {
            self.execute(c);
        }
    }

    // ------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------

    /// Verifies the structural invariants of the graph.
    ///
    /// - a variable's determiner is attached to it, satisfied, and outputs it
    /// - every satisfied constraint is its output's determiner
    /// - every attached constraint lists the variable among its own
    pub fn check_invariants(&self) -> Result<()> {
        for v in self.variable_ids() {
            let var = self.var(v);
            for c in var.constraints() {
                let Some(constraint) = self.constraint(*c) else {
                    return Err(violation(format!("{v} references dropped constraint {c}")));
                };
                if !constraint.kind().variables().contains(&v) {
                    return Err(violation(format!("{v} lists {c} which does not bind it")));
                }
            }
            if let Some(c) = var.determined_by() {
                if !var.constraints().contains(&c) {
                    return Err(violation(format!("{v} is determined by detached {c}")));
                }
                let constraint = self.con(c);
                if !constraint.is_satisfied() {
                    return Err(violation(format!("{v} is determined by unsatisfied {c}")));
                }
                if constraint.output() != v {
                    return Err(violation(format!(
                        "{v} is determined by {c} which outputs {}",
                        constraint.output()
                    )));
                }
            }
        }

        for c in self.constraint_ids() {
            let constraint = self.con(c);
            if !constraint.is_satisfied() {
                continue;
            }
            let out = constraint.output();
            match self.variable(out).map(Variable::determined_by) {
                Some(Some(d)) if d == c => {}
                Some(determiner) => {
                    return Err(violation(format!(
                        "satisfied {c} drives {out} but its determiner is {determiner:?}"
                    )));
                }
                None => {
                    return Err(violation(format!("satisfied {c} drives missing {out}")));
                }
            }
        }
        Ok(())
    }
}

fn violation(message: String) -> DeltaBlueError {
    DeltaBlueError::InvariantViolation(message)
}
