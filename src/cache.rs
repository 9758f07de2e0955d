// Load-once holder for the cleaned dataset.
//
// The CSV is read and cleaned on first access only; every later render
// shares the same `Arc<Dataset>` read-only.
use crate::clean::clean;
use crate::config::CountryPolicy;
use crate::dataset::Dataset;
use crate::error::DashboardError;
use crate::loader::read_table;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct DatasetCache {
    path: PathBuf,
    policy: CountryPolicy,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, policy: CountryPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            cell: OnceCell::new(),
        }
    }

    /// The cleaned dataset, loading it on the first call. A failed load is
    /// not cached, so the next call tries again.
    pub fn get(&self) -> Result<Arc<Dataset>, DashboardError> {
        if let Some(data) = self.cell.get() {
            debug!("dataset cache hit");
            return Ok(Arc::clone(data));
        }
        self.cell
            .get_or_try_init(|| {
                let raw = read_table(&self.path)?;
                clean(raw, self.policy).map(Arc::new)
            })
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
