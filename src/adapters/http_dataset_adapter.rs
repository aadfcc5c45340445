//! HTTP dataset adapter.

use crate::domain::error::QuboError;
use crate::ports::dataset_port::DatasetPort;
use std::time::Duration;
use tracing::info;

/// OR-Library portfolio dataset (Hang Seng, 31 assets).
pub const DEFAULT_DATASET_URL: &str =
    "http://people.brunel.ac.uk/~mastjjb/jeb/orlib/files/port1.txt";

pub struct HttpDatasetAdapter {
    url: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpDatasetAdapter {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    fn fetch_error(&self, reason: impl ToString) -> QuboError {
        QuboError::DatasetFetch {
            source_name: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl Default for HttpDatasetAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_URL)
    }
}

impl DatasetPort for HttpDatasetAdapter {
    fn source_name(&self) -> String {
        self.url.clone()
    }

    fn fetch_text(&self) -> Result<String, QuboError> {
        info!(url = %self.url, "fetching dataset");
        // The response (and its connection) is dropped when this call returns.
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.fetch_error(format!("HTTP {}", status)));
        }
        response.text().map_err(|e| self.fetch_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_or_library() {
        let adapter = HttpDatasetAdapter::default();
        assert_eq!(adapter.source_name(), DEFAULT_DATASET_URL);
    }

    #[test]
    fn unreachable_host_is_fetch_error() {
        let adapter = HttpDatasetAdapter::new("http://127.0.0.1:9/port1.txt");
        let err = adapter.fetch_text().unwrap_err();
        assert!(matches!(err, QuboError::DatasetFetch { .. }));
    }

    #[test]
    #[ignore = "requires network access"]
    fn fetches_or_library_dataset() {
        let ds = HttpDatasetAdapter::default().load().unwrap();
        assert_eq!(ds.asset_count(), 31);
    }
}
