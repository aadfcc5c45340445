//! Sparse multivariate polynomials with exact rational coefficients.
//!
//! Every polynomial carries the [`Ring`] it lives in: the ordered list of
//! variable names its exponent tuples are aligned to. Binary operations
//! require both operands to share the same ring; there is no process-wide
//! "current ring".

use crate::domain::error::QuboError;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedMul, One, Signed, Zero};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

pub type Coefficient = Rational64;

/// Ordered, deduplicated list of variable names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    variables: Vec<String>,
}

impl Ring {
    /// Build a ring from variable names. Later duplicates are ignored.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut variables = Vec::new();
        for name in names {
            let name = name.into();
            if seen.insert(name.clone()) {
                variables.push(name);
            }
        }
        Self { variables }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    /// The same ring with the variable at `index` removed.
    pub fn without(&self, index: usize) -> Ring {
        let mut variables = self.variables.clone();
        variables.remove(index);
        Ring { variables }
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variables.join(", "))
    }
}

/// Exponent tuple aligned to a ring's variable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(Vec<u32>);

impl Monomial {
    /// The degree-0 monomial.
    pub fn one(arity: usize) -> Self {
        Monomial(vec![0; arity])
    }

    /// `x_index^1`.
    pub fn variable(arity: usize, index: usize) -> Self {
        Self::power(arity, index, 1)
    }

    /// `x_index^exponent`.
    pub fn power(arity: usize, index: usize, exponent: u32) -> Self {
        let mut exponents = vec![0; arity];
        exponents[index] = exponent;
        Monomial(exponents)
    }

    pub fn from_exponents(exponents: Vec<u32>) -> Self {
        Monomial(exponents)
    }

    pub fn exponents(&self) -> &[u32] {
        &self.0
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn degree(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn is_constant(&self) -> bool {
        self.0.iter().all(|&e| e == 0)
    }

    /// Positions with a non-zero exponent.
    pub fn support(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, e)| **e > 0)
            .map(|(i, _)| i)
            .collect()
    }

    fn product(&self, other: &Monomial) -> Monomial {
        Monomial(self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect())
    }

    fn remove(&self, index: usize) -> (Monomial, u32) {
        let mut exponents = self.0.clone();
        let exponent = exponents.remove(index);
        (Monomial(exponents), exponent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    ring: Arc<Ring>,
    terms: BTreeMap<Monomial, Coefficient>,
}

impl Polynomial {
    pub fn zero(ring: Arc<Ring>) -> Self {
        Self {
            ring,
            terms: BTreeMap::new(),
        }
    }

    pub fn constant(ring: Arc<Ring>, value: Coefficient) -> Self {
        let mut poly = Self::zero(ring);
        if !value.is_zero() {
            let one = Monomial::one(poly.ring.len());
            poly.terms.insert(one, value);
        }
        poly
    }

    pub fn variable(ring: Arc<Ring>, name: &str) -> Result<Self, QuboError> {
        let index = ring
            .index_of(name)
            .ok_or_else(|| QuboError::UnknownVariable {
                name: name.to_string(),
            })?;
        let mut poly = Self::zero(ring);
        let monomial = Monomial::variable(poly.ring.len(), index);
        poly.terms.insert(monomial, Coefficient::one());
        Ok(poly)
    }

    /// Build a polynomial from explicit terms. Repeated monomials are summed.
    pub fn from_terms<I>(ring: Arc<Ring>, terms: I) -> Result<Self, QuboError>
    where
        I: IntoIterator<Item = (Monomial, Coefficient)>,
    {
        let mut poly = Self::zero(ring);
        for (monomial, coefficient) in terms {
            if monomial.arity() != poly.ring.len() {
                return Err(QuboError::RingMismatch {
                    left: poly.ring.to_string(),
                    right: format!("monomial with {} exponents", monomial.arity()),
                });
            }
            poly.add_term(monomial, coefficient)?;
        }
        Ok(poly)
    }

    pub fn ring(&self) -> &Arc<Ring> {
        &self.ring
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Coefficient)> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn coefficient(&self, monomial: &Monomial) -> Coefficient {
        self.terms
            .get(monomial)
            .copied()
            .unwrap_or_else(Coefficient::zero)
    }

    pub fn total_degree(&self) -> u32 {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    /// Constant value if the polynomial has no variable terms.
    pub fn as_constant(&self) -> Option<Coefficient> {
        match self.terms.iter().next() {
            None => Some(Coefficient::zero()),
            Some((m, c)) if self.terms.len() == 1 && m.is_constant() => Some(*c),
            _ => None,
        }
    }

    pub fn checked_add(&self, other: &Polynomial) -> Result<Polynomial, QuboError> {
        self.ensure_same_ring(other)?;
        let mut sum = self.clone();
        for (monomial, coefficient) in &other.terms {
            sum.add_term(monomial.clone(), *coefficient)?;
        }
        Ok(sum)
    }

    pub fn checked_sub(&self, other: &Polynomial) -> Result<Polynomial, QuboError> {
        self.checked_add(&other.negated())
    }

    pub fn checked_mul(&self, other: &Polynomial) -> Result<Polynomial, QuboError> {
        self.ensure_same_ring(other)?;
        let mut product = Polynomial::zero(Arc::clone(&self.ring));
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                let c = c1.checked_mul(c2).ok_or_else(|| overflow("multiplication"))?;
                product.add_term(m1.product(m2), c)?;
            }
        }
        Ok(product)
    }

    pub fn pow(&self, exponent: u32) -> Result<Polynomial, QuboError> {
        let mut result = Polynomial::constant(Arc::clone(&self.ring), Coefficient::one());
        let mut base = self.clone();
        let mut e = exponent;
        while e > 0 {
            if e & 1 == 1 {
                result = result.checked_mul(&base)?;
            }
            e >>= 1;
            if e > 0 {
                base = base.checked_mul(&base)?;
            }
        }
        Ok(result)
    }

    pub fn scale(&self, factor: Coefficient) -> Result<Polynomial, QuboError> {
        let mut scaled = Polynomial::zero(Arc::clone(&self.ring));
        for (monomial, coefficient) in &self.terms {
            let c = coefficient
                .checked_mul(&factor)
                .ok_or_else(|| overflow("scaling"))?;
            scaled.add_term(monomial.clone(), c)?;
        }
        Ok(scaled)
    }

    pub fn negated(&self) -> Polynomial {
        Polynomial {
            ring: Arc::clone(&self.ring),
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -*c)).collect(),
        }
    }

    /// Replace `name` by `value`, eliminating its dimension from the ring.
    pub fn substitute(&self, name: &str, value: Coefficient) -> Result<Polynomial, QuboError> {
        let index = self
            .ring
            .index_of(name)
            .ok_or_else(|| QuboError::UnknownVariable {
                name: name.to_string(),
            })?;
        let mut result = Polynomial::zero(Arc::new(self.ring.without(index)));
        for (monomial, coefficient) in &self.terms {
            let (reduced, exponent) = monomial.remove(index);
            let mut c = *coefficient;
            for _ in 0..exponent {
                c = c.checked_mul(&value).ok_or_else(|| overflow("substitution"))?;
            }
            result.add_term(reduced, c)?;
        }
        Ok(result)
    }

    /// Evaluate at a point given in ring order.
    pub fn evaluate(&self, values: &[f64]) -> Result<f64, QuboError> {
        if values.len() != self.ring.len() {
            return Err(QuboError::RingMismatch {
                left: self.ring.to_string(),
                right: format!("point with {} coordinates", values.len()),
            });
        }
        let total = self
            .terms
            .iter()
            .map(|(monomial, coefficient)| {
                monomial
                    .exponents()
                    .iter()
                    .zip(values)
                    .fold(to_f64(coefficient), |acc, (&e, &v)| acc * v.powi(e as i32))
            })
            .sum();
        Ok(total)
    }

    /// Remove the variable at `index` together with every term that uses it.
    /// Returns the reduced polynomial and the number of discarded terms.
    pub(crate) fn drop_variable(&self, index: usize) -> (Polynomial, usize) {
        let mut discarded = 0;
        let mut terms = BTreeMap::new();
        for (monomial, coefficient) in &self.terms {
            let (reduced, exponent) = monomial.remove(index);
            if exponent > 0 {
                discarded += 1;
            } else {
                terms.insert(reduced, *coefficient);
            }
        }
        let reduced = Polynomial {
            ring: Arc::new(self.ring.without(index)),
            terms,
        };
        (reduced, discarded)
    }

    pub(crate) fn take_term(&mut self, monomial: &Monomial) -> Option<Coefficient> {
        self.terms.remove(monomial)
    }

    pub(crate) fn add_term(
        &mut self,
        monomial: Monomial,
        coefficient: Coefficient,
    ) -> Result<(), QuboError> {
        if coefficient.is_zero() {
            return Ok(());
        }
        let sum = match self.terms.get(&monomial) {
            Some(existing) => existing
                .checked_add(&coefficient)
                .ok_or_else(|| overflow("addition"))?,
            None => coefficient,
        };
        if sum.is_zero() {
            self.terms.remove(&monomial);
        } else {
            self.terms.insert(monomial, sum);
        }
        Ok(())
    }

    fn ensure_same_ring(&self, other: &Polynomial) -> Result<(), QuboError> {
        if Arc::ptr_eq(&self.ring, &other.ring) || self.ring == other.ring {
            Ok(())
        } else {
            Err(QuboError::RingMismatch {
                left: self.ring.to_string(),
                right: other.ring.to_string(),
            })
        }
    }
}

pub fn to_f64(coefficient: &Coefficient) -> f64 {
    *coefficient.numer() as f64 / *coefficient.denom() as f64
}

fn overflow(operation: &str) -> QuboError {
    QuboError::CoefficientOverflow {
        operation: operation.to_string(),
    }
}

fn write_coefficient(f: &mut fmt::Formatter<'_>, c: &Coefficient) -> fmt::Result {
    if c.is_integer() {
        write!(f, "{}", c.numer())
    } else {
        write!(f, "{}/{}", c.numer(), c.denom())
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }

        let mut ordered: Vec<_> = self.terms.iter().collect();
        ordered.sort_by(|(a, _), (b, _)| b.degree().cmp(&a.degree()).then_with(|| b.cmp(a)));

        for (n, (monomial, coefficient)) in ordered.into_iter().enumerate() {
            let magnitude = coefficient.abs();
            if n == 0 {
                if coefficient.is_negative() {
                    write!(f, "-")?;
                }
            } else if coefficient.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }

            let factors: Vec<String> = monomial
                .exponents()
                .iter()
                .zip(self.ring.variables())
                .filter(|(e, _)| **e > 0)
                .map(|(e, name)| {
                    if *e == 1 {
                        name.clone()
                    } else {
                        format!("{}^{}", name, e)
                    }
                })
                .collect();

            if factors.is_empty() {
                write_coefficient(f, &magnitude)?;
            } else {
                if !magnitude.is_one() {
                    write_coefficient(f, &magnitude)?;
                    write!(f, "*")?;
                }
                write!(f, "{}", factors.join("*"))?;
            }
        }
        Ok(())
    }
}
