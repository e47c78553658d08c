//! Seeded random workloads.
//!
//! A [`RandomWorkload`] owns a fixed pool of variables in a solver and
//! produces a reproducible stream of constraint additions, destructions
//! and value changes over them. Stress tests apply the stream and check
//! the graph invariants after each step.
//!
//! Scale constraints draw their `scale` and `offset` operands from a
//! separate pool that nothing else touches. Scales are `1` or `-1`, so
//! values grow at most additively and `i64` arithmetic cannot overflow.

use deltablue_config::SolverConfig;
use deltablue_core::{ConstraintId, Result, Solver, Strength, VariableId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used when the configuration does not set `random_seed`.
pub const DEFAULT_SEED: u64 = 42;

/// One generated step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddStay {
        variable: VariableId,
        strength: Strength,
    },
    AddEdit {
        variable: VariableId,
        strength: Strength,
    },
    AddEquality {
        v1: VariableId,
        v2: VariableId,
        strength: Strength,
    },
    AddScale {
        src: VariableId,
        scale: VariableId,
        offset: VariableId,
        dest: VariableId,
        strength: Strength,
    },
    Destroy {
        constraint: ConstraintId,
    },
    Change {
        variable: VariableId,
        value: i64,
    },
}

/// Reproducible generator of [`Operation`]s over a fixed variable pool.
///
/// # Example
///
/// ```
/// use deltablue_core::Solver;
/// use deltablue_test::random::RandomWorkload;
///
/// let mut solver: Solver = Solver::new();
/// let mut workload = RandomWorkload::new(&mut solver, 8, 42);
/// workload.run(&mut solver, 50).unwrap();
/// solver.check_invariants().unwrap();
/// ```
#[derive(Debug)]
pub struct RandomWorkload {
    rng: ChaCha8Rng,
    variables: Vec<VariableId>,
    scales: [VariableId; 2],
    offsets: [VariableId; 2],
    live: Vec<ConstraintId>,
}

impl RandomWorkload {
    /// Adds `variable_count` variables (at least 2) plus the scale operand
    /// pool to `solver` and seeds the generator.
    pub fn new(solver: &mut Solver, variable_count: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let variables = (0..variable_count.max(2))
            .map(|i| solver.add_variable(format!("r{i}"), rng.random_range(1..10)))
            .collect();
        let scales = [
            solver.add_variable("scale+", 1),
            solver.add_variable("scale-", -1),
        ];
        let offsets = [
            solver.add_variable("offset0", 0),
            solver.add_variable("offset2", 2),
        ];
        Self {
            rng,
            variables,
            scales,
            offsets,
            live: Vec::new(),
        }
    }

    /// Like [`new`](Self::new), seeded from `config.random_seed` or
    /// [`DEFAULT_SEED`].
    pub fn from_config(
        solver: &mut Solver,
        config: &SolverConfig,
        variable_count: usize,
    ) -> Self {
        Self::new(solver, variable_count, config.random_seed.unwrap_or(DEFAULT_SEED))
    }

    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    /// Constraints added by this workload and not yet destroyed.
    pub fn live_constraints(&self) -> &[ConstraintId] {
        &self.live
    }

    /// Draws the next operation without applying it.
    pub fn next_operation(&mut self) -> Operation {
        let roll = self.rng.random_range(0..100);
        if roll < 20 && !self.live.is_empty() {
            let index = self.rng.random_range(0..self.live.len());
            return Operation::Destroy {
                constraint: self.live[index],
            };
        }
        if roll < 30 {
            return Operation::Change {
                variable: self.pick(),
                value: self.rng.random_range(-100..100),
            };
        }

        let strength = self.strength();
        match roll {
            30..=49 => Operation::AddStay {
                variable: self.pick(),
                strength,
            },
            50..=59 => Operation::AddEdit {
                variable: self.pick(),
                strength,
            },
            60..=84 => {
                let [v1, v2] = self.pick_distinct();
                Operation::AddEquality { v1, v2, strength }
            }
            _ => {
                let [src, dest] = self.pick_distinct();
                let scale = self.scales[self.rng.random_range(0..2)];
                let offset = self.offsets[self.rng.random_range(0..2)];
                Operation::AddScale {
                    src,
                    scale,
                    offset,
                    dest,
                    strength,
                }
            }
        }
    }

    /// Draws the next operation and applies it to `solver`.
    pub fn step(&mut self, solver: &mut Solver) -> Result<Operation> {
        let op = self.next_operation();
        match op {
            Operation::AddStay { variable, strength } => {
                self.live.push(solver.add_stay(variable, strength)?);
            }
            Operation::AddEdit { variable, strength } => {
                self.live.push(solver.add_edit(variable, strength)?);
            }
            Operation::AddEquality { v1, v2, strength } => {
                self.live.push(solver.add_equality(v1, v2, strength)?);
            }
            Operation::AddScale {
                src,
                scale,
                offset,
                dest,
                strength,
            } => {
                self.live
                    .push(solver.add_scale(src, scale, offset, dest, strength)?);
            }
            Operation::Destroy { constraint } => {
                solver.destroy_constraint(constraint)?;
                self.live.retain(|c| *c != constraint);
            }
            Operation::Change { variable, value } => {
                solver.change(variable, value)?;
            }
        }
        Ok(op)
    }

    /// Applies `steps` operations, stopping at the first error.
    pub fn run(&mut self, solver: &mut Solver, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.step(solver)?;
        }
        Ok(())
    }

    fn pick(&mut self) -> VariableId {
        self.variables[self.rng.random_range(0..self.variables.len())]
    }

    fn pick_distinct<const N: usize>(&mut self) -> [VariableId; N] {
        let mut picked = [self.variables[0]; N];
        let mut filled = 0;
        while filled < N {
            let candidate = self.pick();
            if !picked[..filled].contains(&candidate) {
                picked[filled] = candidate;
                filled += 1;
            }
        }
        picked
    }

    /// Any strength except `Weakest`, which can never be satisfied.
    fn strength(&mut self) -> Strength {
        Strength::ALL[self.rng.random_range(0..Strength::ALL.len() - 1)]
    }
}
