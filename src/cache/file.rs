use super::AggregateStore;
use crate::error::{Result, StatsError};
use crate::model::{AggregateTable, CacheKey, PlayerAggregate};
use std::fs;
use std::path::{Path, PathBuf};

/// Write a table as CSV, one row per player in name order
pub fn write_table(table: &AggregateTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in table.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a table written by [`write_table`]
pub fn read_table(path: &Path) -> Result<AggregateTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<PlayerAggregate>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    AggregateTable::from_rows(rows)
}

/// Aggregate cache on the local file system, laid out as `<data_folder>/<year>/<name>`
#[derive(Debug, Clone)]
pub struct FileCache {
    data_folder: PathBuf,
}

impl FileCache {
    pub fn new(data_folder: &Path) -> Self {
        Self {
            data_folder: data_folder.to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        key.path(&self.data_folder)
    }
}

impl AggregateStore for FileCache {
    fn data_folder(&self) -> &Path {
        &self.data_folder
    }

    fn save(&self, table: &AggregateTable, key: &CacheKey) -> Result<()> {
        if table.is_empty() {
            log::debug!("nothing to cache for {}", key);
            return Ok(());
        }

        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        write_table(table, &path)?;
        log::info!("cached {} players under {}", table.len(), path.display());
        Ok(())
    }

    fn load(&self, key: &CacheKey) -> Result<AggregateTable> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(StatsError::CacheMiss(path));
        }
        read_table(&path)
    }

    fn stored_keys(&self, year: &str, names: &[&str]) -> Result<Vec<CacheKey>> {
        let dir = self.data_folder.join(year);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str() {
                if names.contains(&name) {
                    keys.push(CacheKey::new(year, name));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
