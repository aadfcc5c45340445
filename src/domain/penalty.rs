//! Equality-constraint penalties built symbolically.

use crate::domain::error::QuboError;
use crate::domain::generators::Generators;
use crate::domain::polynomial::{Coefficient, Polynomial, Ring};
use std::sync::Arc;

/// Ring symbol standing for the penalty weight until it is substituted.
pub const WEIGHT_SYMBOL: &str = "penalty_weight";

/// Exact rational for a configured weight.
pub fn weight_coefficient(weight: f64) -> Result<Coefficient, QuboError> {
    Coefficient::approximate_float(weight).ok_or_else(|| QuboError::ConfigInvalid {
        section: "model".into(),
        key: "penalty_weight".into(),
        reason: format!("{} has no rational representation", weight),
    })
}

/// `weight * (sum(x_i) - target)^2`, before the weight is fixed.
///
/// The ring holds the generators followed by [`WEIGHT_SYMBOL`].
pub fn symbolic_cardinality_penalty(
    generators: &Generators,
    target: i64,
) -> Result<Polynomial, QuboError> {
    let ring = Arc::new(Ring::new(
        generators
            .names()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(WEIGHT_SYMBOL)),
    ));

    let mut sum = Polynomial::constant(Arc::clone(&ring), Coefficient::from_integer(-target));
    for name in generators.names() {
        sum = sum.checked_add(&Polynomial::variable(Arc::clone(&ring), name)?)?;
    }
    let weight = Polynomial::variable(Arc::clone(&ring), WEIGHT_SYMBOL)?;
    weight.checked_mul(&sum.pow(2)?)
}

/// The cardinality penalty with the weight substituted. The result lives in
/// a ring holding only the generators.
pub fn cardinality_penalty(
    generators: &Generators,
    target: i64,
    weight: f64,
) -> Result<Polynomial, QuboError> {
    let symbolic = symbolic_cardinality_penalty(generators, target)?;
    symbolic.substitute(WEIGHT_SYMBOL, weight_coefficient(weight)?)
}
