use factoring_core::batch::DataSource;
use factoring_core::ingest::RawRecord;
use factoring_core::{FactoringError, FactoringResult};

use super::file;

/// A dataset on disk, read afresh on every fetch.
pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn fetch(&self) -> FactoringResult<Vec<RawRecord>> {
        file::read_rows(&self.path).map_err(|e| FactoringError::DataSource(e.to_string()))
    }
}
