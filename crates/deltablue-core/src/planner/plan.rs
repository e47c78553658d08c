//! Replayable evaluation orders.

use std::collections::HashMap;

use crate::constraint::ConstraintId;
use crate::error::{DeltaBlueError, Result};
use crate::graph::{ConstraintGraph, Value};

/// An ordered list of constraints that recomputes every variable it touches.
///
/// Built once by the planner, then executed as many times as the host likes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    constraints: Vec<ConstraintId>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_constraint(&mut self, c: ConstraintId) {
        self.constraints.push(c);
    }

    pub fn constraints(&self) -> &[ConstraintId] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintId> {
        self.constraints.iter()
    }

    /// Executes every constraint in order.
    ///
    /// # Panics
    ///
    /// Panics if a constraint was dropped from `graph` after the plan was
    /// built. [`Plan::validate`] checks for that up front.
    pub fn execute<T: Value>(&self, graph: &mut ConstraintGraph<T>) {
        for &c in &self.constraints {
            graph.execute(c);
        }
    }

    /// Checks that the plan can still run against `graph`: every step is a
    /// live, satisfied constraint, no variable is written twice, and no step
    /// reads a variable that a later step writes.
    pub fn validate<T: Value>(&self, graph: &ConstraintGraph<T>) -> Result<()> {
        let mut writers = HashMap::with_capacity(self.constraints.len());
        for (step, &c) in self.constraints.iter().enumerate() {
            let constraint = graph
                .constraint(c)
                .ok_or(DeltaBlueError::UnknownConstraint(c))?;
            if !constraint.is_satisfied() {
                return Err(DeltaBlueError::InvalidPlan(format!(
                    "step {step} ({c}) is not satisfied"
                )));
            }
            if let Some(first) = writers.insert(constraint.output(), step) {
                return Err(DeltaBlueError::InvalidPlan(format!(
                    "{} is written by steps {first} and {step}",
                    constraint.output()
                )));
            }
        }

        for (step, &c) in self.constraints.iter().enumerate() {
            for input in graph.con(c).inputs() {
                if let Some(&writer) = writers.get(&input) {
                    if writer > step {
                        return Err(DeltaBlueError::InvalidPlan(format!(
                            "step {step} ({c}) reads {input} before step {writer} writes it"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a ConstraintId;
    type IntoIter = std::slice::Iter<'a, ConstraintId>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
