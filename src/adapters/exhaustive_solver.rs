//! Brute-force QUBO solver for small problems.

use crate::domain::error::QuboError;
use crate::domain::problem::{QuboProblem, Solution};
use crate::ports::solver_port::QuboSolver;

pub const MAX_EXHAUSTIVE_VARIABLES: usize = 24;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSolver;

impl QuboSolver for ExhaustiveSolver {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(&self, problem: &QuboProblem) -> Result<Solution, QuboError> {
        let n = problem.size();
        if n > MAX_EXHAUSTIVE_VARIABLES {
            return Err(QuboError::Solver {
                reason: format!(
                    "exhaustive search supports at most {} variables, problem has {}",
                    MAX_EXHAUSTIVE_VARIABLES, n
                ),
            });
        }

        let (lo, hi) = problem.domain.values();
        let mut x = vec![lo; n];
        let mut best = Solution {
            assignment: x.clone(),
            value: problem.sense.worst(),
        };

        for bits in 0u32..(1u32 << n) {
            for (i, v) in x.iter_mut().enumerate() {
                *v = if (bits >> i) & 1 == 1 { hi } else { lo };
            }
            let value = problem.objective(&x)?;
            if problem.sense.improves(value, best.value) {
                best = Solution {
                    assignment: x.clone(),
                    value,
                };
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::problem::{Sense, VariableDomain};
    use ndarray::{Array2, array};

    fn problem(matrix: Array2<f64>, sense: Sense, domain: VariableDomain) -> QuboProblem {
        QuboProblem::new(matrix, 0.0, sense, domain).unwrap()
    }

    #[test]
    fn maximizes_binary_problem() {
        // x1 + x2 - 4 x1 x2: best is exactly one variable set.
        let p = problem(
            array![[1.0, -2.0], [-2.0, 1.5]],
            Sense::Maximize,
            VariableDomain::Binary,
        );
        let solution = ExhaustiveSolver.solve(&p).unwrap();
        assert_eq!(solution.assignment, vec![0, 1]);
        assert_eq!(solution.value, 1.5);
    }

    #[test]
    fn minimizes_binary_problem() {
        let p = problem(
            array![[1.0, -2.0], [-2.0, 1.5]],
            Sense::Minimize,
            VariableDomain::Binary,
        );
        let solution = ExhaustiveSolver.solve(&p).unwrap();
        assert_eq!(solution.assignment, vec![1, 1]);
        assert_eq!(solution.value, -1.5);
    }

    #[test]
    fn spin_domain_uses_plus_minus_one() {
        // Antiferromagnetic pair: minimum at opposite spins.
        let p = problem(
            array![[0.0, 1.0], [1.0, 0.0]],
            Sense::Minimize,
            VariableDomain::Spin,
        );
        let solution = ExhaustiveSolver.solve(&p).unwrap();
        assert_eq!(solution.value, -2.0);
        assert_eq!(solution.assignment[0], -solution.assignment[1]);
    }

    #[test]
    fn empty_problem_returns_constant() {
        let p = QuboProblem::new(Array2::zeros((0, 0)), 7.0, Sense::Maximize, VariableDomain::Binary)
            .unwrap();
        let solution = ExhaustiveSolver.solve(&p).unwrap();
        assert!(solution.assignment.is_empty());
        assert_eq!(solution.value, 7.0);
    }

    #[test]
    fn rejects_large_problems() {
        let n = MAX_EXHAUSTIVE_VARIABLES + 1;
        let p = problem(Array2::zeros((n, n)), Sense::Maximize, VariableDomain::Binary);
        assert!(matches!(
            ExhaustiveSolver.solve(&p),
            Err(QuboError::Solver { .. })
        ));
    }
}
