//! Decision-variable sets.
//!
//! The pipeline declares its decision variables explicitly. Inference from
//! variable names is only used for free-form expressions typed on the
//! command line.

use crate::domain::polynomial::Ring;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generators {
    names: Vec<String>,
}

impl Generators {
    /// Explicit decision variables, in matrix order. Later duplicates are ignored.
    pub fn declared<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    /// `prefix1..=prefixN`.
    pub fn indexed(prefix: &str, count: usize) -> Self {
        Self::declared((1..=count).map(|i| format!("{}{}", prefix, i)))
    }

    /// Ring variables that look like indexed decision variables, in ring order.
    pub fn infer(ring: &Ring) -> Self {
        Self::declared(
            ring.variables()
                .iter()
                .filter(|name| is_indexed_variable(name)),
        )
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }
}

/// A prefix starting with a letter, followed by a positive integer without
/// leading zero: `x1`, `x12`, `asset3`. Not `x0`, `x01`, `y`, `1x`.
pub fn is_indexed_variable(name: &str) -> bool {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    let Some(split) = digits_start else {
        return false;
    };
    let (prefix, digits) = name.split_at(split);

    let prefix_ok = prefix
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic());
    let digits_ok = !digits.starts_with('0');

    prefix_ok && digits_ok
}
