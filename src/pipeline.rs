//! Drives ingestion, caching and rollup over every configured year and month.
//!
//! Phase 1 turns each month's raw logs into a cached aggregate. With more
//! than one worker, each year becomes one task on a fixed-size thread pool;
//! every year is handed to the pool before any result is awaited, and each
//! task only writes the cache keys of its own year. Phase 2 sums the cached
//! months of every year that ingested cleanly into one table.

use crate::aggregate::{aggregate_records, rollup_all};
use crate::cache::AggregateStore;
use crate::config::Config;
use crate::error::{Result, StatsError};
use crate::model::{AggregateTable, Period};
use crate::pdb;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};

/// Result of phase 1 for one year
#[derive(Debug)]
pub struct YearOutcome {
    pub year: String,
    /// Months whose aggregate was written to the cache
    pub cached: Vec<String>,
    /// Months with no raw data
    pub empty: Vec<String>,
    /// Months that failed, with the reason
    pub failures: Vec<(String, StatsError)>,
    /// Set when the whole task died before finishing
    pub crashed: Option<StatsError>,
}

impl YearOutcome {
    fn new(year: &str) -> Self {
        Self {
            year: year.to_string(),
            cached: Vec::new(),
            empty: Vec::new(),
            failures: Vec::new(),
            crashed: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty() && self.crashed.is_none()
    }
}

/// Result of phase 1 across all years, in configured year order
#[derive(Debug, Default)]
pub struct IngestReport {
    pub years: Vec<YearOutcome>,
}

impl IngestReport {
    pub fn failed_years(&self) -> Vec<&str> {
        self.years
            .iter()
            .filter(|y| !y.is_ok())
            .map(|y| y.year.as_str())
            .collect()
    }

    pub fn is_ok(&self) -> bool {
        self.years.iter().all(YearOutcome::is_ok)
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunSummary {
    /// `None` when ingestion was skipped
    pub ingest: Option<IngestReport>,
    pub rolled_up_years: Vec<String>,
    pub table: AggregateTable,
}

pub struct Pipeline<'a, S> {
    config: &'a Config,
    store: &'a S,
}

impl<'a, S: AggregateStore + Sync> Pipeline<'a, S> {
    pub fn new(config: &'a Config, store: &'a S) -> Self {
        Self { config, store }
    }

    /// Read, aggregate and cache one month
    pub fn process_month(&self, year: &str, month: &str) -> Result<AggregateTable> {
        let period = Period::month(&self.config.data_folder, year, month);
        let records = pdb::read_period(&period, &self.config.file_prefix)?;
        let table = aggregate_records(&records)?;

        if let Some(key) = period.cache_key() {
            self.store.save(&table, &key)?;
        }
        Ok(table)
    }

    /// Process every configured month of a year, continuing past failed months
    pub fn process_year(&self, year: &str) -> YearOutcome {
        let mut outcome = YearOutcome::new(year);

        for month in &self.config.months {
            log::info!("working on year {} and month {}", year, month);
            match self.process_month(year, month) {
                Ok(table) if table.is_empty() => outcome.empty.push(month.clone()),
                Ok(_) => outcome.cached.push(month.clone()),
                Err(e) => {
                    log::warn!("{}-{} failed: {}", year, month, e);
                    outcome.failures.push((month.clone(), e));
                }
            }
        }

        outcome
    }

    /// Validate the configuration and that the store caches under its data folder
    fn check(&self) -> Result<()> {
        self.config.validate()?;
        if self.store.data_folder() != self.config.data_folder.as_path() {
            return Err(StatsError::Config(format!(
                "cache is under {} but the data folder is {}",
                self.store.data_folder().display(),
                self.config.data_folder.display()
            )));
        }
        Ok(())
    }

    /// Phase 1 over every configured year
    pub fn ingest(&self) -> Result<IngestReport> {
        self.check()?;

        let years: Vec<YearOutcome> = if self.config.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()?;
            // collect() only returns once every year has been scheduled and finished
            pool.install(|| {
                self.config
                    .years
                    .par_iter()
                    .map(|year| self.process_year_isolated(year))
                    .collect()
            })
        } else {
            self.config
                .years
                .iter()
                .map(|year| self.process_year_isolated(year))
                .collect()
        };

        Ok(IngestReport { years })
    }

    fn process_year_isolated(&self, year: &str) -> YearOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.process_year(year))).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "worker panicked".to_string());
            log::warn!("worker for year {} died: {}", year, message);

            let mut outcome = YearOutcome::new(year);
            outcome.crashed = Some(StatsError::Worker {
                year: year.to_string(),
                message,
            });
            outcome
        })
    }

    /// Phase 2: sum the cached months of `years` into one table
    pub fn rollup(&self, years: &[String]) -> Result<AggregateTable> {
        let periods: Vec<Period> = years
            .iter()
            .map(|year| Period::year(&self.config.data_folder, year, &self.config.months))
            .collect();
        rollup_all(self.store, &periods)
    }

    /// Run ingestion (unless `graph_only`) followed by the rollup.
    ///
    /// Years that failed ingestion are left out of the rollup and listed in
    /// the returned report.
    pub fn run(&self) -> Result<RunSummary> {
        self.check()?;

        let ingest = if self.config.graph_only {
            None
        } else {
            Some(self.ingest()?)
        };

        let rolled_up_years: Vec<String> = match &ingest {
            Some(report) => {
                let failed = report.failed_years();
                self.config
                    .years
                    .iter()
                    .filter(|y| !failed.contains(&y.as_str()))
                    .cloned()
                    .collect()
            }
            None => self.config.years.clone(),
        };

        let table = self.rollup(&rolled_up_years)?;
        Ok(RunSummary {
            ingest,
            rolled_up_years,
            table,
        })
    }
}
