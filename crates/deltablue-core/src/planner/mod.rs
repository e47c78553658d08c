//! The incremental planner.
//!
//! The planner keeps every variable determined by at most one constraint,
//! chosen by strength, and repairs the graph incrementally whenever a
//! constraint is added or removed. It owns no graph data itself: only the
//! traversal-mark counter and the diagnostic log. Every operation takes the
//! [`ConstraintGraph`] it works on explicitly.
//!
//! Each traversal allocates a fresh mark and tags the variables it visits,
//! so "visited in this pass" is a single integer comparison.

mod plan;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::mem;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::constraint::ConstraintId;
use crate::diagnostic::Diagnostic;
use crate::graph::{ConstraintGraph, Value};
use crate::strength::Strength;
use crate::variable::VariableId;

pub use plan::Plan;

/// Mark counter plus diagnostic log for one solver instance.
///
/// # Example
///
/// ```
/// use deltablue_core::{Constraint, ConstraintGraph, ConstraintKind, Planner, Strength};
///
/// let mut graph: ConstraintGraph = ConstraintGraph::new();
/// let mut planner = Planner::new();
///
/// let a = graph.add_variable("a", 4);
/// let b = graph.add_variable("b", 0);
/// let stay = graph
///     .insert_constraint(Constraint::new(ConstraintKind::Stay { output: a }, Strength::Required))
///     .unwrap();
/// planner.add_constraint(&mut graph, stay);
///
/// let eq = graph
///     .insert_constraint(Constraint::new(
///         ConstraintKind::Equality { v1: a, v2: b },
///         Strength::Normal,
///     ))
///     .unwrap();
/// planner.add_constraint(&mut graph, eq);
///
/// assert_eq!(graph.variable(b).unwrap().determined_by(), Some(eq));
/// assert_eq!(*graph.variable(b).unwrap().value(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Planner {
    current_mark: u64,
    diagnostics: Vec<Diagnostic>,
}

impl Planner {
    /// Creates a planner whose first mark will be 1.
    ///
    /// Variables start with mark 0, so no fresh mark ever matches an
    /// untouched variable.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently allocated mark.
    pub fn current_mark(&self) -> u64 {
        self.current_mark
    }

    /// Allocates a mark that has never been handed out before.
    pub fn new_mark(&mut self) -> u64 {
        self.current_mark += 1;
        self.current_mark
    }

    /// Every notice raised so far, oldest first.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drains the diagnostic log.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(
            event = diagnostic.event(),
            constraint = %diagnostic.constraint(),
            "{}",
            diagnostic
        );
        self.diagnostics.push(diagnostic);
    }

    /// Attaches `c` to its variables and inserts it into the plan.
    pub fn add_constraint<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        c: ConstraintId,
    ) {
        graph.add_to_graph(c);
        self.incremental_add(graph, c);
    }

    /// Removes `c` from the live graph, repairing it if `c` was satisfied.
    ///
    /// The constraint stays in the arena; it is merely detached.
    pub fn destroy_constraint<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        c: ConstraintId,
    ) {
        if graph.is_satisfied(c) {
            self.incremental_remove(graph, c);
        }
        graph.remove_from_graph(c);
    }

    /// Satisfies `c`, then lets every constraint it displaces try again.
    ///
    /// The eviction chain is an explicit loop: each displaced constraint
    /// re-satisfies itself under the same mark, possibly displacing another.
    pub fn incremental_add<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        c: ConstraintId,
    ) {
        let mark = self.new_mark();
        let mut evictions = 0u64;
        let mut overridden = self.satisfy(graph, c, mark);
        while let Some(evicted) = overridden {
            // A cycle rollback further down may already have re-added it.
            if graph.is_satisfied(evicted) {
                break;
            }
            evictions += 1;
            trace!(event = "evicted", constraint = %evicted, mark = mark);
            overridden = self.satisfy(graph, evicted, mark);
        }
        debug!(
            event = "constraint_added",
            constraint = %c,
            strength = %graph.con(c).strength(),
            satisfied = graph.is_satisfied(c),
            evictions = evictions,
        );
    }

    /// Tries to select a method for `c` under `mark`.
    ///
    /// Returns the constraint that previously determined `c`'s output, now
    /// unsatisfied, so the caller can give it another chance.
    pub fn satisfy<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        c: ConstraintId,
        mark: u64,
    ) -> Option<ConstraintId> {
        graph.choose_method(c, mark);
        if !graph.is_satisfied(c) {
            if graph.con(c).strength() == Strength::Required {
                self.report(Diagnostic::UnsatisfiableRequired { constraint: c });
            }
            return None;
        }

        graph.mark_inputs(c, mark);
        let out = graph.output(c);
        let overridden = graph.var(out).determined_by();
        if let Some(previous) = overridden {
            graph.mark_unsatisfied(previous);
        }
        graph.var_mut(out).set_determined_by(Some(c));
        if !self.add_propagate(graph, c, mark) {
            self.report(Diagnostic::PropagationCycle { constraint: c });
        }
        graph.var_mut(out).set_mark(mark);
        overridden
    }

    /// Recomputes everything downstream of `c`.
    ///
    /// Returns false if propagation reached a variable already tagged with
    /// `mark`, in which case `c` has been removed again.
    pub fn add_propagate<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        c: ConstraintId,
        mark: u64,
    ) -> bool {
        let mut todo = vec![c];
        while let Some(d) = todo.pop() {
            let out = graph.output(d);
            if graph.var(out).mark() == mark {
                trace!(event = "cycle", constraint = %c, at = %d, variable = %out);
                self.incremental_remove(graph, c);
                return false;
            }
            graph.recalculate(d);
            Self::add_constraints_consuming_to(graph, out, &mut todo);
        }
        true
    }

    /// Unsatisfies and detaches `c`, then re-adds the constraints left
    /// unsatisfied, strongest first.
    pub fn incremental_remove<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        c: ConstraintId,
    ) {
        let out = graph.output(c);
        graph.mark_unsatisfied(c);
        graph.remove_from_graph(c);
        let unsatisfied = self.remove_propagate_from(graph, out);

        // Weakest constraints can never override anything, so the sweep
        // stops just before that level.
        let mut strength = Strength::Required;
        loop {
            for &u in &unsatisfied {
                let constraint = graph.con(u);
                if constraint.strength() == strength && !constraint.is_satisfied() {
                    self.incremental_add(graph, u);
                }
            }
            strength = strength.next_weaker();
            if strength == Strength::Weakest {
                break;
            }
        }
        debug!(
            event = "constraint_removed",
            constraint = %c,
            retried = unsatisfied.len() as u64,
        );
    }

    /// Resets `out` to a free variable and recomputes everything downstream.
    ///
    /// Returns each unsatisfied constraint met along the way, once.
    pub fn remove_propagate_from<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        out: VariableId,
    ) -> Vec<ConstraintId> {
        let root = graph.var_mut(out);
        root.set_determined_by(None);
        root.set_walk_strength(Strength::Weakest);
        root.set_stay(true);

        let mut unsatisfied = Vec::new();
        let mut seen = HashSet::new();
        let mut todo = vec![out];
        while let Some(v) = todo.pop() {
            let var = graph.var(v);
            let determining = var.determined_by();
            let constraints: SmallVec<[ConstraintId; 8]> =
                var.constraints().iter().copied().collect();

            for &c in &constraints {
                if !graph.is_satisfied(c) && seen.insert(c) {
                    unsatisfied.push(c);
                }
            }
            for &next in &constraints {
                if Some(next) != determining && graph.is_satisfied(next) {
                    graph.recalculate(next);
                    todo.push(graph.output(next));
                }
            }
        }
        unsatisfied
    }

    /// Appends every satisfied constraint that reads `v` (everything
    /// attached to `v` except its determiner) to `todo`.
    pub fn add_constraints_consuming_to<T: Value>(
        graph: &ConstraintGraph<T>,
        v: VariableId,
        todo: &mut Vec<ConstraintId>,
    ) {
        let var = graph.var(v);
        let determining = var.determined_by();
        todo.extend(
            var.constraints()
                .iter()
                .copied()
                .filter(|c| Some(*c) != determining && graph.is_satisfied(*c)),
        );
    }

    /// Builds a plan that evaluates everything downstream of `sources`.
    ///
    /// A constraint is appended once its inputs are known; ready constraints
    /// are taken last-in-first-out. Unsatisfied sources are skipped.
    pub fn make_plan<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        sources: &[ConstraintId],
    ) -> Plan {
        let mark = self.new_mark();
        let mut plan = Plan::new();
        let mut todo = sources.to_vec();
        while let Some(c) = todo.pop() {
            if !graph.is_satisfied(c) {
                continue;
            }
            let out = graph.output(c);
            if graph.var(out).mark() != mark && graph.inputs_known(c, mark) {
                plan.add_constraint(c);
                graph.var_mut(out).set_mark(mark);
                Self::add_constraints_consuming_to(graph, out, &mut todo);
            }
        }
        debug!(
            event = "plan_extracted",
            sources = sources.len() as u64,
            steps = plan.len() as u64,
        );
        plan
    }

    /// Builds a plan rooted at the satisfied input constraints among
    /// `constraints`.
    pub fn extract_plan_from_constraints<T: Value>(
        &mut self,
        graph: &mut ConstraintGraph<T>,
        constraints: &[ConstraintId],
    ) -> Plan {
        let sources: Vec<ConstraintId> = constraints
            .iter()
            .copied()
            .filter(|c| {
                let constraint = graph.con(*c);
                constraint.is_input() && constraint.is_satisfied()
            })
            .collect();
        self.make_plan(graph, &sources)
    }
}
