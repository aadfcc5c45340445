//! Portfolio-selection QUBO: covariance objective plus cardinality penalty.

use crate::domain::covariance::covariance;
use crate::domain::dataset::AssetDataset;
use crate::domain::error::QuboError;
use crate::domain::generators::Generators;
use crate::domain::penalty::cardinality_penalty;
use crate::domain::problem::{QuboProblem, Sense, Solution, VariableDomain};
use crate::domain::qubo::{ConversionWarning, to_qubo};
use ndarray::Array2;
use tracing::{debug, info};

/// Prefix of the decision variable names, one per asset.
pub const ASSET_VARIABLE_PREFIX: &str = "x";

#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub penalty_weight: f64,
    pub target_count: usize,
    pub return_weight: f64,
    pub sense: Sense,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            penalty_weight: 10.0,
            target_count: 1,
            return_weight: 0.0,
            sense: Sense::Maximize,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioQubo {
    pub problem: QuboProblem,
    pub generators: Generators,
    pub covariance: Array2<f64>,
    pub warnings: Vec<ConversionWarning>,
}

/// Risk objective in minimization form: `Σ - return_weight * diag(μ)`.
pub fn objective_matrix(
    covariance: &Array2<f64>,
    mean_returns: &[f64],
    return_weight: f64,
) -> Array2<f64> {
    let mut objective = covariance.clone();
    if return_weight != 0.0 {
        for (i, mu) in mean_returns.iter().enumerate() {
            objective[[i, i]] -= return_weight * mu;
        }
    }
    objective
}

/// Elementwise sum of two equally shaped matrices.
pub fn combine(objective: &Array2<f64>, penalty: &Array2<f64>) -> Result<Array2<f64>, QuboError> {
    if objective.dim() != penalty.dim() {
        return Err(QuboError::ShapeMismatch {
            left: objective.dim(),
            right: penalty.dim(),
        });
    }
    Ok(objective + penalty)
}

pub fn build_portfolio_qubo(
    dataset: &AssetDataset,
    params: &ModelParams,
) -> Result<PortfolioQubo, QuboError> {
    let n = dataset.asset_count();
    let cov = covariance(dataset)?;
    let objective = objective_matrix(&cov, &dataset.mean_returns, params.return_weight);

    let generators = Generators::indexed(ASSET_VARIABLE_PREFIX, n);
    let penalty = cardinality_penalty(
        &generators,
        params.target_count as i64,
        params.penalty_weight,
    )?;
    debug!(terms = penalty.len(), "penalty polynomial built");
    let conversion = to_qubo(&penalty, Some(&generators));

    let constant = conversion.model.constant.as_f64();
    let (matrix, constant) = match params.sense {
        Sense::Minimize => (combine(&objective, &conversion.model.matrix)?, constant),
        Sense::Maximize => (
            combine(&objective.mapv(|v| -v), &conversion.model.matrix.mapv(|v| -v))?,
            -constant,
        ),
    };
    info!(assets = n, sense = %params.sense, "portfolio QUBO assembled");

    Ok(PortfolioQubo {
        problem: QuboProblem::new(matrix, constant, params.sense, VariableDomain::Binary)?,
        generators,
        covariance: cov,
        warnings: conversion.warnings,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSelection {
    /// Zero-based indices of the selected assets.
    pub assets: Vec<usize>,
    /// Mean return of the equally weighted selection.
    pub expected_return: f64,
    /// Variance of the equally weighted selection.
    pub variance: f64,
    pub satisfies_target: bool,
    pub objective: f64,
}

pub fn interpret(
    solution: &Solution,
    dataset: &AssetDataset,
    covariance: &Array2<f64>,
    params: &ModelParams,
) -> PortfolioSelection {
    let assets: Vec<usize> = solution
        .assignment
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == 1)
        .map(|(i, _)| i)
        .collect();

    let (expected_return, variance) = if assets.is_empty() {
        (0.0, 0.0)
    } else {
        let k = assets.len() as f64;
        let ret = assets.iter().map(|&i| dataset.mean_returns[i]).sum::<f64>() / k;
        let var = assets
            .iter()
            .flat_map(|&i| assets.iter().map(move |&j| (i, j)))
            .map(|(i, j)| covariance[[i, j]])
            .sum::<f64>()
            / (k * k);
        (ret, var)
    };

    PortfolioSelection {
        satisfies_target: assets.len() == params.target_count,
        assets,
        expected_return,
        variance,
        objective: solution.value,
    }
}
