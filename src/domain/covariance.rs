//! Covariance from standard deviations and correlations.

use crate::domain::dataset::AssetDataset;
use crate::domain::error::QuboError;
use ndarray::Array2;

/// `cov[i][j] = corr[i][j] * sd[i] * sd[j]`.
///
/// An unset diagonal cell is an asset's correlation with itself and is
/// taken as 1. An unset off-diagonal cell is an error.
pub fn covariance(dataset: &AssetDataset) -> Result<Array2<f64>, QuboError> {
    let n = dataset.asset_count();
    let sd = &dataset.std_devs;
    let mut cov = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..n {
            let rho = match dataset.correlation[[i, j]] {
                Some(rho) => rho,
                None if i == j => 1.0,
                None => {
                    return Err(QuboError::MissingCorrelation { i: i + 1, j: j + 1 });
                }
            };
            cov[[i, j]] = rho * sd[i] * sd[j];
        }
    }
    Ok(cov)
}
