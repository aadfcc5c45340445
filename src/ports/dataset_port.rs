//! Dataset access port trait.

use crate::domain::dataset::{AssetDataset, parse_dataset};
use crate::domain::error::QuboError;

pub trait DatasetPort {
    /// Human-readable origin of the data, used in messages.
    fn source_name(&self) -> String;

    /// Raw dataset text.
    fn fetch_text(&self) -> Result<String, QuboError>;

    fn load(&self) -> Result<AssetDataset, QuboError> {
        parse_dataset(&self.fetch_text()?)
    }
}
