//! Solver-facing problem and solution types.

use crate::domain::error::QuboError;
use crate::domain::qubo::quadratic_form;
use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

impl Sense {
    /// True when `candidate` is strictly better than `incumbent`.
    pub fn improves(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Sense::Maximize => candidate > incumbent,
            Sense::Minimize => candidate < incumbent,
        }
    }

    pub fn worst(&self) -> f64 {
        match self {
            Sense::Maximize => f64::NEG_INFINITY,
            Sense::Minimize => f64::INFINITY,
        }
    }
}

impl FromStr for Sense {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maximize" | "max" => Ok(Sense::Maximize),
            "minimize" | "min" => Ok(Sense::Minimize),
            other => Err(format!("unknown sense '{}' (expected maximize or minimize)", other)),
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => write!(f, "maximize"),
            Sense::Minimize => write!(f, "minimize"),
        }
    }
}

/// Values a decision variable may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDomain {
    /// `{0, 1}`
    Binary,
    /// `{-1, 1}`
    Spin,
}

impl VariableDomain {
    pub fn values(&self) -> (i8, i8) {
        match self {
            VariableDomain::Binary => (0, 1),
            VariableDomain::Spin => (-1, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuboProblem {
    pub matrix: Array2<f64>,
    pub constant: f64,
    pub sense: Sense,
    pub domain: VariableDomain,
}

impl QuboProblem {
    pub fn new(
        matrix: Array2<f64>,
        constant: f64,
        sense: Sense,
        domain: VariableDomain,
    ) -> Result<Self, QuboError> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(QuboError::ShapeMismatch {
                left: (rows, cols),
                right: (rows, rows),
            });
        }
        Ok(Self {
            matrix,
            constant,
            sense,
            domain,
        })
    }

    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    /// `constant + xᵀQx` for an assignment in this problem's domain.
    pub fn objective(&self, assignment: &[i8]) -> Result<f64, QuboError> {
        let x: Vec<f64> = assignment.iter().map(|&v| f64::from(v)).collect();
        Ok(self.constant + quadratic_form(&self.matrix, &x)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub assignment: Vec<i8>,
    /// Objective value including the problem constant.
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn sense_parses_case_insensitively() {
        assert_eq!("Maximize".parse::<Sense>(), Ok(Sense::Maximize));
        assert_eq!(" min ".parse::<Sense>(), Ok(Sense::Minimize));
        assert!("sideways".parse::<Sense>().is_err());
    }

    #[test]
    fn sense_improves() {
        assert!(Sense::Maximize.improves(2.0, 1.0));
        assert!(!Sense::Maximize.improves(1.0, 1.0));
        assert!(Sense::Minimize.improves(-1.0, 0.0));
        assert!(Sense::Minimize.improves(0.0, Sense::Minimize.worst()));
    }

    #[test]
    fn objective_includes_constant() {
        let problem = QuboProblem::new(
            array![[1.0, 0.5], [0.5, -2.0]],
            3.0,
            Sense::Minimize,
            VariableDomain::Binary,
        )
        .unwrap();
        assert_eq!(problem.objective(&[0, 0]).unwrap(), 3.0);
        assert_eq!(problem.objective(&[1, 1]).unwrap(), 3.0);
        assert_eq!(problem.objective(&[0, 1]).unwrap(), 1.0);
    }

    #[test]
    fn objective_rejects_short_assignment() {
        let problem = QuboProblem::new(
            array![[1.0, 0.5], [0.5, -2.0]],
            0.0,
            Sense::Maximize,
            VariableDomain::Binary,
        )
        .unwrap();
        assert!(matches!(
            problem.objective(&[1]),
            Err(QuboError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn non_square_matrix_is_rejected() {
        let err = QuboProblem::new(
            Array2::zeros((2, 3)),
            0.0,
            Sense::Maximize,
            VariableDomain::Binary,
        )
        .unwrap_err();
        assert!(matches!(err, QuboError::ShapeMismatch { .. }));
    }
}
