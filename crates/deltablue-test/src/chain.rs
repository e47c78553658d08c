//! Chain workload.
//!
//! `n + 1` variables `v0 .. vn` linked by required equalities, a
//! strong-default stay on the last variable and a preferred edit on the
//! first. Every value assigned to `v0` must reach `vn` through the plan.

use deltablue_core::{ConstraintId, Plan, Result, Solver, Strength, VariableId};

/// A built chain plus the edit constraint that drives it.
#[derive(Debug)]
pub struct ChainFixture {
    pub solver: Solver,
    pub variables: Vec<VariableId>,
    pub edit: ConstraintId,
}

impl ChainFixture {
    /// Builds a chain of `n` equalities.
    ///
    /// # Example
    ///
    /// ```
    /// use deltablue_test::chain::ChainFixture;
    ///
    /// let mut chain = ChainFixture::build(10).unwrap();
    /// let plan = chain.plan().unwrap();
    /// assert_eq!(chain.drive(&plan, 42).unwrap(), 42);
    /// ```
    pub fn build(n: usize) -> Result<Self> {
        Self::build_with(Solver::new(), n)
    }

    /// Builds the chain inside an existing (empty) solver.
    pub fn build_with(mut solver: Solver, n: usize) -> Result<Self> {
        let variables: Vec<VariableId> = (0..=n)
            .map(|i| solver.add_variable(format!("v{i}"), 0))
            .collect();
        for pair in variables.windows(2) {
            solver.add_equality(pair[0], pair[1], Strength::Required)?;
        }

        let last = variables[n];
        solver.add_stay(last, Strength::StrongDefault)?;
        let edit = solver.add_edit(variables[0], Strength::Preferred)?;

        Ok(Self {
            solver,
            variables,
            edit,
        })
    }

    pub fn first(&self) -> VariableId {
        self.variables[0]
    }

    pub fn last(&self) -> VariableId {
        self.variables[self.variables.len() - 1]
    }

    /// Extracts the plan rooted at the edit constraint.
    pub fn plan(&mut self) -> Result<Plan> {
        self.solver.extract_plan(&[self.edit])
    }

    /// Assigns `value` to the first variable, runs `plan`, and returns the
    /// value that arrived at the last variable.
    pub fn drive(&mut self, plan: &Plan, value: i64) -> Result<i64> {
        self.solver.set_value(self.first(), value)?;
        self.solver.execute_plan(plan)?;
        Ok(self.solver.value(self.last()).unwrap_or_default())
    }
}
