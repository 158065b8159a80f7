//! Per-player reductions: raw records into a monthly table, and cached
//! tables into yearly and multi-year totals.

use crate::cache::AggregateStore;
use crate::error::{Result, StatsError};
use crate::model::{AggregateTable, Period, PlayerTotals, RawRecord};
use std::collections::BTreeMap;

/// Reduce raw records to one row per player.
///
/// `num_wins` counts records with a positive `pot_winnings_amount`; players
/// who never won still get a row with `num_wins = 0`. A player whose gain
/// leaves the `i64` range is an [`StatsError::InvalidRecord`].
pub fn aggregate_records(records: &[RawRecord]) -> Result<AggregateTable> {
    let mut played: BTreeMap<&str, (u64, i64)> = BTreeMap::new();
    let mut wins: BTreeMap<&str, u64> = BTreeMap::new();

    for record in records {
        let net = record.net()?;
        let entry = played.entry(record.player_name.as_str()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.checked_add(net).ok_or_else(|| {
            StatsError::InvalidRecord(format!(
                "monetary gain of {} overflows at game {}",
                record.player_name, record.game_id
            ))
        })?;

        if record.is_win() {
            *wins.entry(record.player_name.as_str()).or_default() += 1;
        }
    }

    let mut table = AggregateTable::new();
    for (name, (game_count, monetary_gain)) in played {
        let num_wins = wins.get(name).copied().unwrap_or(0);
        table.add(name, PlayerTotals::new(game_count, monetary_gain, num_wins))?;
    }
    Ok(table)
}

/// Sum the cached monthly tables of a yearly period.
///
/// Only keys named after one of the period's months take part; a year with
/// nothing cached yields an empty table. The period must be rooted at the
/// store's data folder.
pub fn rollup<S: AggregateStore + ?Sized>(store: &S, period: &Period) -> Result<AggregateTable> {
    if period.data_folder.as_path() != store.data_folder() {
        return Err(StatsError::Config(format!(
            "period {} is under {} but the cache is under {}",
            period,
            period.data_folder.display(),
            store.data_folder().display()
        )));
    }
    let keys = store.stored_keys(&period.year, &period.months())?;
    let mut tables = Vec::with_capacity(keys.len());
    for key in &keys {
        tables.push(store.load(key)?);
    }
    log::info!("rolled up {} cached tables for {}", tables.len(), period);
    AggregateTable::sum(tables)
}

/// Sum the cached tables of several yearly periods into one grand total
pub fn rollup_all<S: AggregateStore + ?Sized>(store: &S, periods: &[Period]) -> Result<AggregateTable> {
    let mut tables = Vec::with_capacity(periods.len());
    for period in periods {
        let table = rollup(store, period)?;
        if !table.is_empty() {
            tables.push(table);
        }
    }
    AggregateTable::sum(tables)
}

/// Load a single cached month, failing when it was never stored
pub fn load_month<S: AggregateStore + ?Sized>(store: &S, period: &Period) -> Result<AggregateTable> {
    let key = period
        .cache_key()
        .ok_or_else(|| StatsError::Config(format!("period {} is not a single month", period)))?;
    store.load(&key)
}
