//! The live edge range table shared by all requests.

use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use tokio::task::JoinError;

use crate::observability::metrics;
use crate::ranges::table::{RangeSource, RangeTable};

/// Holder for the current edge table.
///
/// Built once at start-up and handed to the components that need it.
/// Requests read it lock-free; a reload builds a complete new table and
/// swaps it in, so readers never see a partial one.
#[derive(Debug)]
pub struct EdgeRanges {
    source: RangeSource,
    current: ArcSwap<RangeTable>,
}

impl EdgeRanges {
    /// Build the table from `source` (with built-in fallback).
    pub fn init(source: RangeSource) -> Self {
        let table = RangeTable::load(&source);
        Self::with_table(source, table)
    }

    /// Use an already built table. Later reloads read `source`.
    pub fn with_table(source: RangeSource, table: RangeTable) -> Self {
        metrics::record_range_prefixes(table.len());
        Self {
            source,
            current: ArcSwap::from_pointee(table),
        }
    }

    /// Cheap guard for a single lookup.
    pub fn current(&self) -> Guard<Arc<RangeTable>> {
        self.current.load()
    }

    /// Owned handle to the current table.
    pub fn snapshot(&self) -> Arc<RangeTable> {
        self.current.load_full()
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.current.load().contains(ip)
    }

    /// Rebuild from the configured source and swap the result in.
    pub fn reload(&self) -> Arc<RangeTable> {
        let table = Arc::new(RangeTable::load(&self.source));
        self.store(table.clone());
        table
    }

    /// [`reload`](Self::reload) on the blocking pool. The range document is
    /// read with blocking file I/O, so async callers go through here.
    pub async fn spawn_reload(self: Arc<Self>) -> Result<Arc<RangeTable>, JoinError> {
        tokio::task::spawn_blocking(move || self.reload()).await
    }

    /// Swap in a table built elsewhere (e.g. by the file watcher).
    pub fn replace(&self, table: RangeTable) {
        self.store(Arc::new(table));
    }

    fn store(&self, table: Arc<RangeTable>) {
        tracing::info!(origin = table.origin().label(), prefixes = table.len(), "Edge ranges updated");
        metrics::record_range_reload(table.origin().label(), table.len());
        self.current.store(table);
    }

    pub fn source(&self) -> &RangeSource {
        &self.source
    }
}
