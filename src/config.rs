use crate::error::{Result, StatsError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File-name prefix of the per-player logs in the IRC poker database
pub const DEFAULT_FILE_PREFIX: &str = "pdb.";

/// Years covered by the IRC hold'em archive
pub const DEFAULT_YEARS: [&str; 7] = ["1995", "1996", "1997", "1998", "1999", "2000", "2001"];

pub const DEFAULT_MONTHS: [&str; 12] = [
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    /// Root holding `<year><month>` raw directories and `<year>` cache directories
    pub data_folder: PathBuf,
    pub years: Vec<String>,
    pub months: Vec<String>,
    /// Only files whose name starts with this are read as logs
    pub file_prefix: String,
    /// Number of years processed concurrently; 1 runs sequentially
    pub workers: usize,
    /// Skip ingestion and roll up previously cached months only
    pub graph_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("."),
            years: DEFAULT_YEARS.iter().map(|y| y.to_string()).collect(),
            months: DEFAULT_MONTHS.iter().map(|m| m.to_string()).collect(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            workers: 1,
            graph_only: false,
        }
    }
}

impl Config {
    pub fn new(data_folder: &Path) -> Self {
        Self {
            data_folder: data_folder.to_path_buf(),
            ..Default::default()
        }
    }

    /// Years to process; repeats are dropped, keeping first-seen order
    pub fn with_years<S: AsRef<str>>(mut self, years: &[S]) -> Self {
        self.years = unique(years);
        self
    }

    /// Months to process; repeats are dropped, keeping first-seen order
    pub fn with_months<S: AsRef<str>>(mut self, months: &[S]) -> Self {
        self.months = unique(months);
        self
    }

    pub fn with_file_prefix(mut self, prefix: &str) -> Self {
        self.file_prefix = prefix.to_string();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_graph_only(mut self, graph_only: bool) -> Self {
        self.graph_only = graph_only;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            return Err(StatsError::Config("no years requested".to_string()));
        }
        if self.months.is_empty() {
            return Err(StatsError::Config("no months requested".to_string()));
        }
        if let Some(year) = first_repeat(&self.years) {
            return Err(StatsError::Config(format!("year {} requested twice", year)));
        }
        if let Some(month) = first_repeat(&self.months) {
            return Err(StatsError::Config(format!("month {} requested twice", month)));
        }
        if self.workers == 0 {
            return Err(StatsError::Config("worker count must be at least 1".to_string()));
        }
        if self.file_prefix.is_empty() {
            return Err(StatsError::Config("file prefix must not be empty".to_string()));
        }
        Ok(())
    }
}

fn unique<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.as_ref())
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}

fn first_repeat(values: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    values.iter().map(String::as_str).find(|v| !seen.insert(*v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.years.len(), 7);
        assert_eq!(config.months.first().map(String::as_str), Some("01"));
        assert_eq!(config.months.last().map(String::as_str), Some("12"));
        assert_eq!(config.file_prefix, "pdb.");
        assert_eq!(config.workers, 1);
        assert!(!config.graph_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = Config::new(Path::new("/data/holdem"))
            .with_years(&["1995", "1996"])
            .with_months(&["04", "05"])
            .with_workers(2)
            .with_graph_only(true);
        assert_eq!(config.data_folder, PathBuf::from("/data/holdem"));
        assert_eq!(config.years, vec!["1995", "1996"]);
        assert_eq!(config.months, vec!["04", "05"]);
        assert_eq!(config.workers, 2);
        assert!(config.graph_only);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty: [&str; 0] = [];
        assert!(Config::default().with_years(&empty).validate().is_err());
        assert!(Config::default().with_months(&empty).validate().is_err());
        assert!(Config::default().with_workers(0).validate().is_err());
        assert!(Config::default().with_file_prefix("").validate().is_err());
    }

    #[test]
    fn test_repeated_years_and_months_are_dropped() {
        let config = Config::default()
            .with_years(&["1996", "1995", "1996"])
            .with_months(&["05", "04", "05", "05"]);
        assert_eq!(config.years, vec!["1996", "1995"]);
        assert_eq!(config.months, vec!["05", "04"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_repeats() {
        let mut config = Config::default();
        config.years = vec!["1995".to_string(), "1995".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("year 1995"));

        let mut config = Config::default();
        config.months.push("01".to_string());
        assert!(matches!(config.validate(), Err(StatsError::Config(_))));
    }
}
