//! Host-facing solver.
//!
//! [`Solver`] owns one constraint graph and its planner. Every mutation goes
//! through it, so the graph is consistent at each call boundary.

use tracing::debug;

use crate::constraint::{Constraint, ConstraintId, ConstraintKind};
use crate::diagnostic::Diagnostic;
use crate::error::{DeltaBlueError, Result};
use crate::graph::{ConstraintGraph, Value};
use crate::planner::{Plan, Planner};
use crate::strength::Strength;
use crate::variable::{Variable, VariableId};

/// How much self-checking the solver does after each operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AssertMode {
    /// No extra checks.
    #[default]
    Off,
    /// Check graph invariants after every constraint add/destroy.
    Fast,
    /// Also validate plan ordering before every plan execution.
    Full,
}

/// Parameters of [`Solver::change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    /// Strength of the temporary edit constraint.
    pub strength: Strength,
    /// How many times the value is assigned and the plan executed.
    pub repeat: u32,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            strength: Strength::Preferred,
            repeat: 1,
        }
    }
}

/// A constraint graph plus the planner that keeps it satisfied.
///
/// # Example
///
/// ```
/// use deltablue_core::{Solver, Strength};
///
/// let mut solver: Solver = Solver::new();
/// let celsius = solver.add_variable("celsius", 0);
/// let scaled = solver.add_variable("scaled", 0);
/// let nine = solver.add_variable("nine", 9);
/// let offset = solver.add_variable("offset", 160);
///
/// solver.add_stay(celsius, Strength::Normal).unwrap();
/// solver.add_scale(celsius, nine, offset, scaled, Strength::Required).unwrap();
///
/// solver.change(celsius, 100).unwrap();
/// assert_eq!(solver.value(scaled), Some(1060));
///
/// solver.change(scaled, 250).unwrap();
/// assert_eq!(solver.value(celsius), Some(10));
/// ```
#[derive(Debug, Clone)]
pub struct Solver<T = i64> {
    graph: ConstraintGraph<T>,
    planner: Planner,
    assert_mode: AssertMode,
    edit: EditOptions,
}

impl<T: Value> Default for Solver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> Solver<T> {
    /// Creates an empty solver with default options.
    pub fn new() -> Self {
        Self {
            graph: ConstraintGraph::new(),
            planner: Planner::new(),
            assert_mode: AssertMode::Off,
            edit: EditOptions::default(),
        }
    }

    pub fn with_assert_mode(mut self, mode: AssertMode) -> Self {
        self.assert_mode = mode;
        self
    }

    pub fn with_edit_options(mut self, edit: EditOptions) -> Self {
        self.edit = edit;
        self
    }

    pub fn assert_mode(&self) -> AssertMode {
        self.assert_mode
    }

    pub fn edit_options(&self) -> EditOptions {
        self.edit
    }

    pub fn graph(&self) -> &ConstraintGraph<T> {
        &self.graph
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    pub fn add_variable(&mut self, name: impl Into<String>, value: T) -> VariableId {
        self.graph.add_variable(name, value)
    }

    /// Adds a variable held in place by a stay constraint of `strength`.
    pub fn add_variable_with_stay(
        &mut self,
        name: impl Into<String>,
        value: T,
        strength: Strength,
    ) -> Result<(VariableId, ConstraintId)> {
        let v = self.add_variable(name, value);
        let stay = self.add_stay(v, strength)?;
        Ok((v, stay))
    }

    /// Removes a variable, returning its last value.
    ///
    /// Every constraint on the variable must be destroyed first.
    pub fn remove_variable(&mut self, v: VariableId) -> Result<T> {
        self.graph.remove_variable(v).map(Variable::into_value)
    }

    pub fn variable(&self, v: VariableId) -> Option<&Variable<T>> {
        self.graph.variable(v)
    }

    pub fn value(&self, v: VariableId) -> Option<T> {
        self.graph.variable(v).map(|var| *var.value())
    }

    /// Assigns a value directly; nothing is propagated until a plan runs.
    pub fn set_value(&mut self, v: VariableId, value: T) -> Result<()> {
        self.graph
            .variable_mut(v)
            .ok_or(DeltaBlueError::UnknownVariable(v))?
            .set_value(value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    /// Creates a constraint and inserts it into the live graph.
    ///
    /// The constraint may end up unsatisfied (check [`Solver::diagnostics`]
    /// for required constraints); it is still attached and may be satisfied
    /// later when stronger constraints go away.
    pub fn add_constraint(
        &mut self,
        kind: ConstraintKind,
        strength: Strength,
    ) -> Result<ConstraintId> {
        let c = self
            .graph
            .insert_constraint(Constraint::new(kind, strength))?;
        self.planner.add_constraint(&mut self.graph, c);
        self.check_after_mutation()?;
        Ok(c)
    }

    pub fn add_stay(&mut self, v: VariableId, strength: Strength) -> Result<ConstraintId> {
        self.add_constraint(ConstraintKind::Stay { output: v }, strength)
    }

    pub fn add_edit(&mut self, v: VariableId, strength: Strength) -> Result<ConstraintId> {
        self.add_constraint(ConstraintKind::Edit { output: v }, strength)
    }

    pub fn add_equality(
        &mut self,
        v1: VariableId,
        v2: VariableId,
        strength: Strength,
    ) -> Result<ConstraintId> {
        self.add_constraint(ConstraintKind::Equality { v1, v2 }, strength)
    }

    /// Adds `dest == src * scale + offset`.
    pub fn add_scale(
        &mut self,
        src: VariableId,
        scale: VariableId,
        offset: VariableId,
        dest: VariableId,
        strength: Strength,
    ) -> Result<ConstraintId> {
        self.add_constraint(
            ConstraintKind::Scale {
                v1: src,
                v2: dest,
                scale,
                offset,
            },
            strength,
        )
    }

    pub fn constraint(&self, c: ConstraintId) -> Option<&Constraint> {
        self.graph.constraint(c)
    }

    pub fn is_satisfied(&self, c: ConstraintId) -> Option<bool> {
        self.graph.constraint(c).map(Constraint::is_satisfied)
    }

    /// Removes a constraint, repairing the graph if it was satisfied.
    pub fn destroy_constraint(&mut self, c: ConstraintId) -> Result<()> {
        if !self.graph.contains_constraint(c) {
            return Err(DeltaBlueError::UnknownConstraint(c));
        }
        self.planner.destroy_constraint(&mut self.graph, c);
        self.graph.take_constraint(c)?;
        self.check_after_mutation()
    }

    // ------------------------------------------------------------------
    // Plans
    // ------------------------------------------------------------------

    /// Builds a plan from explicit root constraints.
    pub fn make_plan(&mut self, sources: &[ConstraintId]) -> Result<Plan> {
        self.require_constraints(sources)?;
        Ok(self.planner.make_plan(&mut self.graph, sources))
    }

    /// Builds a plan rooted at the satisfied input constraints in `constraints`.
    pub fn extract_plan(&mut self, constraints: &[ConstraintId]) -> Result<Plan> {
        self.require_constraints(constraints)?;
        Ok(self
            .planner
            .extract_plan_from_constraints(&mut self.graph, constraints))
    }

    /// Runs a plan against the current values.
    pub fn execute_plan(&mut self, plan: &Plan) -> Result<()> {
        if self.assert_mode == AssertMode::Full {
            plan.validate(&self.graph)?;
        } else {
            self.require_constraints(plan.constraints())?;
        }
        plan.execute(&mut self.graph);
        Ok(())
    }

    /// Sets `v` to `value` through a temporary edit constraint and
    /// propagates the change to everything that depends on it.
    pub fn change(&mut self, v: VariableId, value: T) -> Result<()> {
        let edit = self.add_edit(v, self.edit.strength)?;
        let result = self.run_edit(v, value, edit);
        self.destroy_constraint(edit)?;
        result
    }

    fn run_edit(&mut self, v: VariableId, value: T, edit: ConstraintId) -> Result<()> {
        let plan = self.extract_plan(&[edit])?;
        debug!(
            event = "change",
            variable = %v,
            steps = plan.len() as u64,
            repeat = self.edit.repeat,
        );
        for _ in 0..self.edit.repeat {
            self.set_value(v, value)?;
            self.execute_plan(&plan)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.planner.diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.planner.take_diagnostics()
    }

    /// Verifies the structural invariants of the graph.
    pub fn check_invariants(&self) -> Result<()> {
        self.graph.check_invariants()
    }

    fn check_after_mutation(&self) -> Result<()> {
        match self.assert_mode {
            AssertMode::Off => Ok(()),
            AssertMode::Fast | AssertMode::Full => self.graph.check_invariants(),
        }
    }

    fn require_constraints(&self, constraints: &[ConstraintId]) -> Result<()> {
        match constraints
            .iter()
            .find(|c| !self.graph.contains_constraint(**c))
        {
            Some(&missing) => Err(DeltaBlueError::UnknownConstraint(missing)),
            None => Ok(()),
        }
    }
}
