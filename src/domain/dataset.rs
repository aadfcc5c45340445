//! Asset dataset and its plaintext wire format.
//!
//! ```text
//! N
//! mean_1 stddev_1
//! ...
//! mean_N stddev_N
//! i j correlation     (1-based, any number of lines)
//! ```

use crate::domain::error::QuboError;
use ndarray::Array2;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct AssetDataset {
    pub mean_returns: Vec<f64>,
    pub std_devs: Vec<f64>,
    /// Symmetric; cells never present in the input stay `None`.
    pub correlation: Array2<Option<f64>>,
}

impl AssetDataset {
    pub fn asset_count(&self) -> usize {
        self.mean_returns.len()
    }

    /// Number of correlation cells that were never set.
    pub fn undefined_correlations(&self) -> usize {
        self.correlation.iter().filter(|c| c.is_none()).count()
    }
}

fn field<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T, QuboError>
where
    T::Err: std::fmt::Display,
{
    token.parse().map_err(|e| QuboError::DatasetParse {
        line,
        reason: format!("invalid {} '{}': {}", what, token, e),
    })
}

fn expect_fields<'a>(
    text: &'a str,
    line: usize,
    count: usize,
) -> Result<Vec<&'a str>, QuboError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != count {
        return Err(QuboError::DatasetParse {
            line,
            reason: format!("expected {} fields, found {}", count, tokens.len()),
        });
    }
    Ok(tokens)
}

fn asset_index(token: &str, line: usize, n: usize) -> Result<usize, QuboError> {
    let index: usize = field(token, line, "asset index")?;
    if index == 0 || index > n {
        return Err(QuboError::DatasetParse {
            line,
            reason: format!("asset index {} outside 1..={}", index, n),
        });
    }
    Ok(index - 1)
}

/// Parse the dataset text. Correlation entries are written to both
/// `(i, j)` and `(j, i)`; a repeated pair keeps the last value.
pub fn parse_dataset(text: &str) -> Result<AssetDataset, QuboError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty());

    let (line_no, header) = lines.next().ok_or_else(|| QuboError::DatasetParse {
        line: 1,
        reason: "empty dataset".into(),
    })?;
    let n: usize = field(expect_fields(header, line_no, 1)?[0], line_no, "asset count")?;

    let mut mean_returns = Vec::with_capacity(n);
    let mut std_devs = Vec::with_capacity(n);
    let mut last_line = line_no;
    for _ in 0..n {
        let (line_no, text) = lines.next().ok_or_else(|| QuboError::DatasetParse {
            line: last_line + 1,
            reason: format!(
                "unexpected end of input: expected {} assets, found {}",
                n,
                mean_returns.len()
            ),
        })?;
        let tokens = expect_fields(text, line_no, 2)?;
        mean_returns.push(field(tokens[0], line_no, "mean return")?);
        std_devs.push(field(tokens[1], line_no, "standard deviation")?);
        last_line = line_no;
    }

    let mut correlation = Array2::from_elem((n, n), None);
    for (line_no, text) in lines {
        let tokens = expect_fields(text, line_no, 3)?;
        let i = asset_index(tokens[0], line_no, n)?;
        let j = asset_index(tokens[1], line_no, n)?;
        let value: f64 = field(tokens[2], line_no, "correlation")?;
        correlation[[i, j]] = Some(value);
        correlation[[j, i]] = Some(value);
    }

    Ok(AssetDataset {
        mean_returns,
        std_devs,
        correlation,
    })
}
