#![allow(dead_code)]

use qubo_portfolio::domain::error::QuboError;
use qubo_portfolio::ports::dataset_port::DatasetPort;
use std::cell::Cell;

/// In-memory dataset source that counts fetches.
pub struct MockDatasetPort {
    pub text: Option<String>,
    pub error: Option<String>,
    pub fetches: Cell<usize>,
}

impl MockDatasetPort {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            error: None,
            fetches: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            text: None,
            error: Some(reason.to_string()),
            fetches: Cell::new(0),
        }
    }
}

impl DatasetPort for MockDatasetPort {
    fn source_name(&self) -> String {
        "mock".to_string()
    }

    fn fetch_text(&self) -> Result<String, QuboError> {
        self.fetches.set(self.fetches.get() + 1);
        match (&self.text, &self.error) {
            (_, Some(reason)) => Err(QuboError::DatasetFetch {
                source_name: self.source_name(),
                reason: reason.clone(),
            }),
            (Some(text), None) => Ok(text.clone()),
            (None, None) => Ok(String::new()),
        }
    }
}

/// Three assets; asset 3 has the smallest variance, asset 2 the highest
/// mean return.
pub const THREE_ASSETS: &str = "\
3
0.010 0.10
0.020 0.30
0.005 0.05
1 1 1.0
2 2 1.0
3 3 1.0
1 2 0.5
1 3 0.2
2 3 0.1
";

/// Five assets with asset 4 the least volatile.
pub const FIVE_ASSETS: &str = "\
5
0.004 0.040
0.006 0.045
0.003 0.050
0.002 0.020
0.008 0.080
1 1 1.0
2 2 1.0
3 3 1.0
4 4 1.0
5 5 1.0
1 2 0.3
1 3 0.2
1 4 0.1
1 5 0.4
2 3 0.25
2 4 0.15
2 5 0.35
3 4 0.05
3 5 0.3
4 5 0.1
";

/// Index of the asset with the smallest standard deviation.
pub fn least_volatile(text: &str) -> usize {
    let ds = qubo_portfolio::domain::dataset::parse_dataset(text).unwrap();
    ds.std_devs
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap()
}
