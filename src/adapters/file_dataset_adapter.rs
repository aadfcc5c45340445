//! Local file dataset adapter.

use crate::domain::error::QuboError;
use crate::ports::dataset_port::DatasetPort;
use std::fs;
use std::path::PathBuf;

pub struct FileDatasetAdapter {
    path: PathBuf,
}

impl FileDatasetAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DatasetPort for FileDatasetAdapter {
    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_text(&self) -> Result<String, QuboError> {
        fs::read_to_string(&self.path).map_err(|e| QuboError::DatasetFetch {
            source_name: self.source_name(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("port_small.txt");
        fs::write(&path, "2\n0.01 0.1\n0.02 0.2\n1 1 1.0\n2 2 1.0\n1 2 0.3\n").unwrap();
        (dir, path)
    }

    #[test]
    fn load_parses_file() {
        let (_dir, path) = setup_test_data();
        let adapter = FileDatasetAdapter::new(path);

        let ds = adapter.load().unwrap();
        assert_eq!(ds.asset_count(), 2);
        assert_eq!(ds.mean_returns, vec![0.01, 0.02]);
        assert_eq!(ds.correlation[[1, 0]], Some(0.3));
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let (dir, _) = setup_test_data();
        let adapter = FileDatasetAdapter::new(dir.path().join("nope.txt"));

        let err = adapter.load().unwrap_err();
        assert!(matches!(err, QuboError::DatasetFetch { .. }));
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "2\n0.01\n").unwrap();
        let adapter = FileDatasetAdapter::new(path);

        let err = adapter.load().unwrap_err();
        assert!(matches!(err, QuboError::DatasetParse { line: 2, .. }));
    }
}
