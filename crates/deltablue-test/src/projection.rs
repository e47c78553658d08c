//! Projection workload.
//!
//! `n` source/destination pairs, each linked by a required
//! `dst = src * scale + offset` constraint. All pairs share the same
//! `scale` (10) and `offset` (1000) variables, and every source carries a
//! normal-strength stay.

use deltablue_core::{Result, Solver, Strength, VariableId};

pub const SCALE: i64 = 10;
pub const OFFSET: i64 = 1000;

#[derive(Debug)]
pub struct ProjectionFixture {
    pub solver: Solver,
    pub scale: VariableId,
    pub offset: VariableId,
    pub sources: Vec<VariableId>,
    pub destinations: Vec<VariableId>,
}

impl ProjectionFixture {
    /// Builds `n` projected pairs; source and destination `i` both start at `i`.
    pub fn build(n: usize) -> Result<Self> {
        Self::build_with(Solver::new(), n)
    }

    pub fn build_with(mut solver: Solver, n: usize) -> Result<Self> {
        let scale = solver.add_variable("scale", SCALE);
        let offset = solver.add_variable("offset", OFFSET);
        let mut sources = Vec::with_capacity(n);
        let mut destinations = Vec::with_capacity(n);

        for i in 0..n {
            let src = solver.add_variable(format!("src{i}"), i as i64);
            let dst = solver.add_variable(format!("dst{i}"), i as i64);
            solver.add_stay(src, Strength::Normal)?;
            solver.add_scale(src, scale, offset, dst, Strength::Required)?;
            sources.push(src);
            destinations.push(dst);
        }

        Ok(Self {
            solver,
            scale,
            offset,
            sources,
            destinations,
        })
    }

    /// Current destination values, in pair order.
    pub fn destination_values(&self) -> Vec<i64> {
        self.destinations
            .iter()
            .filter_map(|d| self.solver.value(*d))
            .collect()
    }
}
