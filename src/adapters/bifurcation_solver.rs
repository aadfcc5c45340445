//! Ballistic simulated bifurcation.
//!
//! The QUBO is rewritten as an Ising problem over spins `s ∈ {-1, 1}^n`
//! that is always maximized:
//!
//! ```text
//! E(s) = sᵀJs + hᵀs
//! ```
//!
//! Each agent integrates positions `x` and momenta `y` while the pumping
//! pressure ramps from zero to one. Positions that leave `[-1, 1]` are
//! clamped onto the wall with zero momentum. After the last step the signs
//! of `x` give the spins, which are mapped back to the problem's domain,
//! polished by local search and scored exactly.

use crate::domain::error::QuboError;
use crate::domain::problem::{QuboProblem, Sense, Solution, VariableDomain};
use crate::ports::solver_port::QuboSolver;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

const PRESSURE: f64 = 1.0;
const INITIAL_AMPLITUDE: f64 = 0.1;
const IMPROVEMENT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct BifurcationSolver {
    pub agents: usize,
    pub steps: usize,
    pub time_step: f64,
    /// Fixed seed for reproducible runs; agent `k` uses `seed + k`.
    pub seed: Option<u64>,
}

impl Default for BifurcationSolver {
    fn default() -> Self {
        Self {
            agents: 128,
            steps: 10_000,
            time_step: 0.1,
            seed: None,
        }
    }
}

/// Coupling matrix (zero diagonal) and field of the maximized Ising form.
struct Ising {
    coupling: Array2<f64>,
    field: Array1<f64>,
}

impl Ising {
    fn from_problem(problem: &QuboProblem) -> Self {
        let n = problem.size();
        let q = &problem.matrix;
        let symmetric = (q + &q.t()) / 2.0;

        // x = (s + 1) / 2 turns xᵀQx into sᵀQs/4 + (Q1)ᵀs/2 + const.
        let (mut coupling, mut field) = match problem.domain {
            VariableDomain::Binary => (
                symmetric.mapv(|v| v / 4.0),
                symmetric.sum_axis(Axis(1)) / 2.0,
            ),
            VariableDomain::Spin => (symmetric, Array1::zeros(n)),
        };
        for i in 0..n {
            coupling[[i, i]] = 0.0;
        }
        if problem.sense == Sense::Minimize {
            coupling.mapv_inplace(|v| -v);
            field.mapv_inplace(|v| -v);
        }
        // The force on x_i is the gradient of E, which counts every pair twice.
        coupling.mapv_inplace(|v| 2.0 * v);
        Self { coupling, field }
    }

    /// Coupling scale `c0 = 0.5 / (sqrt(n) * rms)`; 1 for an all-zero problem.
    fn scale(&self) -> f64 {
        let n = self.field.len();
        let entries = (n * n.saturating_sub(1) + n) as f64;
        let sum_sq = self.coupling.iter().map(|v| v * v).sum::<f64>()
            + self.field.iter().map(|v| v * v).sum::<f64>();
        if entries == 0.0 || sum_sq == 0.0 {
            return 1.0;
        }
        let rms = (sum_sq / entries).sqrt();
        0.5 / ((n as f64).sqrt() * rms)
    }
}

impl BifurcationSolver {
    fn rng_for(&self, agent: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(agent as u64)),
            None => StdRng::from_entropy(),
        }
    }

    fn evolve(&self, ising: &Ising, c0: f64, rng: &mut StdRng) -> Vec<f64> {
        let n = ising.field.len();
        let mut x: Array1<f64> =
            Array1::from_iter((0..n).map(|_| rng.gen_range(-INITIAL_AMPLITUDE..INITIAL_AMPLITUDE)));
        let mut y: Array1<f64> =
            Array1::from_iter((0..n).map(|_| rng.gen_range(-INITIAL_AMPLITUDE..INITIAL_AMPLITUDE)));
        let dt = self.time_step;

        for step in 0..self.steps {
            let a = PRESSURE * step as f64 / self.steps as f64;
            let force = (ising.coupling.dot(&x) + &ising.field) * c0;
            for i in 0..n {
                y[i] += dt * (-(PRESSURE - a) * x[i] + force[i]);
                x[i] += dt * PRESSURE * y[i];
                if x[i].abs() > 1.0 {
                    x[i] = x[i].signum();
                    y[i] = 0.0;
                }
            }
        }
        x.to_vec()
    }
}

fn to_domain(positions: &[f64], domain: VariableDomain) -> Vec<i8> {
    let (lo, hi) = domain.values();
    positions
        .iter()
        .map(|&p| if p >= 0.0 { hi } else { lo })
        .collect()
}

/// Hill climbing over single flips and pair exchanges (flipping two
/// variables that currently differ) until no move improves the objective.
/// Moves are scored incrementally through `g = Qx`; the returned value is
/// recomputed exactly.
fn polish(problem: &QuboProblem, assignment: &mut [i8]) -> Result<f64, QuboError> {
    let n = assignment.len();
    let q = &problem.matrix;
    let symmetric = (q + &q.t()) / 2.0;
    let (lo, hi) = problem.domain.values();
    let sign = match problem.sense {
        Sense::Maximize => 1.0,
        Sense::Minimize => -1.0,
    };

    let mut x: Array1<f64> = assignment.iter().map(|&v| f64::from(v)).collect();
    let mut g = symmetric.dot(&x);
    let flip = |v: f64| if v == f64::from(lo) { f64::from(hi) } else { f64::from(lo) };

    loop {
        let mut best_gain = IMPROVEMENT_TOLERANCE;
        let mut best_move: Option<(usize, Option<usize>)> = None;

        for i in 0..n {
            let di = flip(x[i]) - x[i];
            let gain_i = 2.0 * di * g[i] + di * di * symmetric[[i, i]];
            if sign * gain_i > best_gain {
                best_gain = sign * gain_i;
                best_move = Some((i, None));
            }
            for j in (i + 1)..n {
                if x[i] == x[j] {
                    continue;
                }
                let dj = flip(x[j]) - x[j];
                let gain_j = 2.0 * dj * g[j] + dj * dj * symmetric[[j, j]];
                let gain = gain_i + gain_j + 2.0 * di * dj * symmetric[[i, j]];
                if sign * gain > best_gain {
                    best_gain = sign * gain;
                    best_move = Some((i, Some(j)));
                }
            }
        }

        let Some((i, j)) = best_move else {
            break;
        };
        for k in std::iter::once(i).chain(j) {
            let d = flip(x[k]) - x[k];
            x[k] += d;
            g.scaled_add(d, &symmetric.column(k));
        }
    }

    for (a, v) in assignment.iter_mut().zip(x.iter()) {
        *a = *v as i8;
    }
    problem.objective(assignment)
}

impl QuboSolver for BifurcationSolver {
    fn name(&self) -> &'static str {
        "bifurcation"
    }

    fn solve(&self, problem: &QuboProblem) -> Result<Solution, QuboError> {
        if self.agents == 0 || self.steps == 0 {
            return Err(QuboError::Solver {
                reason: "agents and steps must both be at least 1".into(),
            });
        }
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(QuboError::Solver {
                reason: format!("time step must be positive, got {}", self.time_step),
            });
        }
        if problem.matrix.iter().any(|v| !v.is_finite()) {
            return Err(QuboError::Solver {
                reason: "matrix contains non-finite entries".into(),
            });
        }

        if problem.size() == 0 {
            return Ok(Solution {
                assignment: Vec::new(),
                value: problem.constant,
            });
        }

        let ising = Ising::from_problem(problem);
        let c0 = ising.scale();
        debug!(
            variables = problem.size(),
            agents = self.agents,
            steps = self.steps,
            c0,
            "starting simulated bifurcation"
        );

        let mut best: Option<Solution> = None;
        for agent in 0..self.agents {
            let mut rng = self.rng_for(agent);
            let positions = self.evolve(&ising, c0, &mut rng);
            let mut assignment = to_domain(&positions, problem.domain);
            let value = polish(problem, &mut assignment)?;

            let better = match &best {
                Some(incumbent) => problem.sense.improves(value, incumbent.value),
                None => true,
            };
            if better {
                debug!(agent, value, "new best agent");
                best = Some(Solution { assignment, value });
            }
        }

        best.ok_or_else(|| QuboError::Solver {
            reason: "no agent produced a solution".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::exhaustive_solver::ExhaustiveSolver;
    use ndarray::array;

    fn seeded() -> BifurcationSolver {
        BifurcationSolver {
            agents: 16,
            steps: 500,
            time_step: 0.1,
            seed: Some(7),
        }
    }

    #[test]
    fn finds_optimum_of_separable_problem() {
        // Diagonal-dominant: each variable is set independently by its sign.
        let problem = QuboProblem::new(
            array![
                [2.0, 0.1, 0.0, 0.0],
                [0.1, -3.0, 0.1, 0.0],
                [0.0, 0.1, 1.5, 0.1],
                [0.0, 0.0, 0.1, -0.5]
            ],
            0.0,
            Sense::Maximize,
            VariableDomain::Binary,
        )
        .unwrap();
        let solution = seeded().solve(&problem).unwrap();
        let exact = ExhaustiveSolver.solve(&problem).unwrap();
        assert_eq!(solution.assignment, vec![1, 0, 1, 0]);
        assert_eq!(solution.value, exact.value);
    }

    #[test]
    fn minimizes_spin_problem() {
        let problem = QuboProblem::new(
            array![[0.0, 1.0], [1.0, 0.0]],
            1.0,
            Sense::Minimize,
            VariableDomain::Spin,
        )
        .unwrap();
        let solution = seeded().solve(&problem).unwrap();
        assert_eq!(solution.value, -1.0);
        assert_eq!(solution.assignment[0], -solution.assignment[1]);
    }

    #[test]
    fn value_matches_objective_of_assignment() {
        let problem = QuboProblem::new(
            array![[1.0, -2.0, 0.5], [-2.0, 1.5, 0.3], [0.5, 0.3, -1.0]],
            2.0,
            Sense::Maximize,
            VariableDomain::Binary,
        )
        .unwrap();
        let solution = seeded().solve(&problem).unwrap();
        assert_eq!(solution.value, problem.objective(&solution.assignment).unwrap());
        assert!(solution.assignment.iter().all(|&v| v == 0 || v == 1));
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let problem = QuboProblem::new(
            array![[1.0, -2.0, 0.5], [-2.0, 1.5, 0.3], [0.5, 0.3, -1.0]],
            0.0,
            Sense::Minimize,
            VariableDomain::Binary,
        )
        .unwrap();
        let a = seeded().solve(&problem).unwrap();
        let b = seeded().solve(&problem).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_matrix_returns_constant() {
        let problem = QuboProblem::new(
            Array2::zeros((3, 3)),
            4.0,
            Sense::Maximize,
            VariableDomain::Binary,
        )
        .unwrap();
        let solution = seeded().solve(&problem).unwrap();
        assert_eq!(solution.value, 4.0);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let problem = QuboProblem::new(
            Array2::zeros((1, 1)),
            0.0,
            Sense::Maximize,
            VariableDomain::Binary,
        )
        .unwrap();
        let solver = BifurcationSolver {
            agents: 0,
            ..seeded()
        };
        assert!(matches!(
            solver.solve(&problem),
            Err(QuboError::Solver { .. })
        ));
        let solver = BifurcationSolver {
            time_step: 0.0,
            ..seeded()
        };
        assert!(solver.solve(&problem).is_err());
    }
}
