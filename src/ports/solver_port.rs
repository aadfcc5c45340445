//! QUBO solver port trait.

use crate::domain::error::QuboError;
use crate::domain::problem::{QuboProblem, Solution};

pub trait QuboSolver {
    fn name(&self) -> &'static str;

    /// Optimize `problem` in its declared sense and variable domain.
    fn solve(&self, problem: &QuboProblem) -> Result<Solution, QuboError>;
}
