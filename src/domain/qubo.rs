//! Polynomial to QUBO matrix conversion.
//!
//! A quadratic polynomial over binary variables is rewritten as
//! `constant + xᵀQx` with `Q` symmetric. Because `x = x²` for binary `x`,
//! linear terms are folded onto the diagonal.

use crate::domain::error::QuboError;
use crate::domain::generators::Generators;
use crate::domain::polynomial::{Coefficient, Monomial, Polynomial, Ring, to_f64};
use ndarray::Array2;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Constant term of a QUBO. Integral rationals stay integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuboConstant {
    Integer(i64),
    Float(f64),
}

impl QuboConstant {
    pub fn from_coefficient(c: Coefficient) -> Self {
        if c.is_integer() {
            QuboConstant::Integer(*c.numer())
        } else {
            QuboConstant::Float(to_f64(&c))
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            QuboConstant::Integer(v) => v as f64,
            QuboConstant::Float(v) => v,
        }
    }
}

impl Default for QuboConstant {
    fn default() -> Self {
        QuboConstant::Integer(0)
    }
}

impl fmt::Display for QuboConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuboConstant::Integer(v) => write!(f, "{}", v),
            QuboConstant::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuboModel {
    pub matrix: Array2<f64>,
    pub constant: QuboConstant,
    pub generators: Generators,
}

impl QuboModel {
    /// `constant + xᵀQx`.
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, QuboError> {
        Ok(self.constant.as_f64() + quadratic_form(&self.matrix, x)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionWarning {
    /// A ring variable outside the decision variables was removed.
    DroppedSymbol { name: String, discarded_terms: usize },
    /// Terms of degree above two were left out of the matrix.
    NonQuadraticTerms { count: usize },
    /// A linear term could not be folded onto the diagonal without
    /// overflowing its coefficient and was left out of the matrix.
    FoldOverflow { name: String },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::DroppedSymbol {
                name,
                discarded_terms: 0,
            } => write!(f, "symbol '{}' is not a decision variable and was dropped", name),
            ConversionWarning::DroppedSymbol {
                name,
                discarded_terms,
            } => write!(
                f,
                "symbol '{}' is not a decision variable and was dropped along with {} term(s)",
                name, discarded_terms
            ),
            ConversionWarning::NonQuadraticTerms { count } => write!(
                f,
                "{} non-quadratic term(s) were excluded from the QUBO matrix",
                count
            ),
            ConversionWarning::FoldOverflow { name } => write!(
                f,
                "linear term of '{}' overflowed when folded onto the diagonal and was excluded",
                name
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub model: QuboModel,
    pub warnings: Vec<ConversionWarning>,
}

/// Convert `poly` to a QUBO over `generators`, or over the generators
/// inferred from its ring when none are given.
pub fn to_qubo(poly: &Polynomial, generators: Option<&Generators>) -> Conversion {
    let generators = match generators {
        Some(g) => g.clone(),
        None => Generators::infer(poly.ring()),
    };
    let mut warnings = Vec::new();

    let mut model = restrict_to(poly, &generators, &mut warnings);
    let constant = extract_constant(&mut model);
    fold_linear_terms(&mut model, &mut warnings);
    let matrix = fill_matrix(&model, &mut warnings);

    Conversion {
        model: QuboModel {
            matrix,
            constant,
            generators,
        },
        warnings,
    }
}

/// Drop every ring variable outside `generators`, then realign exponents to
/// generator order.
fn restrict_to(
    poly: &Polynomial,
    generators: &Generators,
    warnings: &mut Vec<ConversionWarning>,
) -> Polynomial {
    let mut current = poly.clone();
    let mut index = 0;
    while index < current.ring().len() {
        let name = current.ring().variables()[index].clone();
        if generators.contains(&name) {
            index += 1;
            continue;
        }
        let (reduced, discarded_terms) = current.drop_variable(index);
        let warning = ConversionWarning::DroppedSymbol {
            name,
            discarded_terms,
        };
        warn!("{}", warning);
        warnings.push(warning);
        current = reduced;
    }

    let positions: Vec<usize> = current
        .ring()
        .variables()
        .iter()
        .filter_map(|name| generators.index_of(name))
        .collect();
    let ring = Arc::new(Ring::new(generators.names().iter().cloned()));
    let arity = generators.len();

    let mut aligned = Polynomial::zero(ring);
    for (monomial, coefficient) in current.terms() {
        let mut exponents = vec![0; arity];
        for (&e, &position) in monomial.exponents().iter().zip(&positions) {
            exponents[position] = e;
        }
        // Distinct source monomials map to distinct targets, so no overflow.
        let _ = aligned.add_term(Monomial::from_exponents(exponents), *coefficient);
    }
    aligned
}

fn extract_constant(poly: &mut Polynomial) -> QuboConstant {
    let one = Monomial::one(poly.ring().len());
    poly.take_term(&one)
        .map(QuboConstant::from_coefficient)
        .unwrap_or_default()
}

fn fold_linear_terms(poly: &mut Polynomial, warnings: &mut Vec<ConversionWarning>) {
    let arity = poly.ring().len();
    for i in 0..arity {
        let Some(linear) = poly.take_term(&Monomial::variable(arity, i)) else {
            continue;
        };
        if poly.add_term(Monomial::power(arity, i, 2), linear).is_err() {
            let warning = ConversionWarning::FoldOverflow {
                name: poly.ring().variables()[i].clone(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
    }
}

fn fill_matrix(poly: &Polynomial, warnings: &mut Vec<ConversionWarning>) -> Array2<f64> {
    let n = poly.ring().len();
    let mut matrix = Array2::<f64>::zeros((n, n));
    let mut excluded = 0;

    // Several monomials can share a cell: x1*x2 and x1^2*x2 agree on binary points.
    for (monomial, coefficient) in poly.terms() {
        let support = monomial.support();
        match support.as_slice() {
            [i, j] => {
                let half = to_f64(coefficient) / 2.0;
                matrix[[*i, *j]] += half;
                matrix[[*j, *i]] += half;
            }
            [i] if monomial.exponents()[*i] == 2 => {
                matrix[[*i, *i]] += to_f64(coefficient);
            }
            _ => excluded += 1,
        }
    }

    if excluded > 0 {
        let warning = ConversionWarning::NonQuadraticTerms { count: excluded };
        warn!("{}", warning);
        warnings.push(warning);
    }
    matrix
}

/// `xᵀQx`. The point must have one coordinate per matrix row.
pub fn quadratic_form(matrix: &Array2<f64>, x: &[f64]) -> Result<f64, QuboError> {
    if x.len() != matrix.nrows() || x.len() != matrix.ncols() {
        return Err(QuboError::ShapeMismatch {
            left: matrix.dim(),
            right: (x.len(), x.len()),
        });
    }
    let mut total = 0.0;
    for ((i, j), q) in matrix.indexed_iter() {
        if *q != 0.0 {
            total += q * x[i] * x[j];
        }
    }
    Ok(total)
}
