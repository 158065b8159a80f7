//! Persistent per-period storage of aggregate tables.

pub mod file;

use crate::error::Result;
use crate::model::{AggregateTable, CacheKey};
use std::path::Path;

pub use file::{read_table, write_table, FileCache};

/// Storage for aggregate tables keyed by period
pub trait AggregateStore {
    /// Folder the stored keys are laid out under
    fn data_folder(&self) -> &Path;

    /// Store a table under `key`, replacing any previous value. Empty tables are not stored.
    fn save(&self, table: &AggregateTable, key: &CacheKey) -> Result<()>;

    /// Fetch the table stored under `key`
    fn load(&self, key: &CacheKey) -> Result<AggregateTable>;

    /// Keys stored for `year` whose name is one of `names`, in name order
    fn stored_keys(&self, year: &str, names: &[&str]) -> Result<Vec<CacheKey>>;
}
