//! Upstream data acquisition and a single-slot read-through cache.

use std::sync::Arc;

use crate::ingest::RawRecord;
use crate::FactoringResult;

/// Something that can produce a full raw dataset: a spreadsheet reader, a
/// scripted endpoint client, a file on disk. Implementations own their I/O;
/// the engine only sees the rows or the failure.
pub trait DataSource {
    fn fetch(&self) -> FactoringResult<Vec<RawRecord>>;
}

impl<F> DataSource for F
where
    F: Fn() -> FactoringResult<Vec<RawRecord>>,
{
    fn fetch(&self) -> FactoringResult<Vec<RawRecord>> {
        self()
    }
}

/// Whether a load may be served from the cached dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Refresh {
    /// Serve the cached dataset if there is one.
    #[default]
    IfEmpty,
    /// Always fetch, replacing the cached dataset on success.
    Force,
}

/// Holds the last successfully fetched dataset, and nothing else.
///
/// There is no expiry: the slot is cleared only by [`CachedSource::invalidate`]
/// or by dropping the cache. Loading and invalidating take `&mut self`, so
/// callers that share one cache across threads must wrap it in their own lock.
#[derive(Debug)]
pub struct CachedSource<S> {
    source: S,
    slot: Option<Arc<Vec<RawRecord>>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(source: S) -> Self {
        Self { source, slot: None }
    }

    /// Return the cached dataset, fetching it first when the slot is empty or
    /// a refresh is forced. A failed fetch leaves the previous dataset intact.
    pub fn load(&mut self, refresh: Refresh) -> FactoringResult<Arc<Vec<RawRecord>>> {
        if refresh == Refresh::IfEmpty {
            if let Some(rows) = &self.slot {
                tracing::debug!(rows = rows.len(), "serving cached dataset");
                return Ok(Arc::clone(rows));
            }
        }
        let rows = Arc::new(self.source.fetch()?);
        self.slot = Some(Arc::clone(&rows));
        Ok(rows)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn is_cached(&self) -> bool {
        self.slot.is_some()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
