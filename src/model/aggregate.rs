use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column names of an aggregate table, in file order
pub const AGGREGATE_COLUMNS: [&str; 4] = ["player_name", "game_count", "monetary_gain", "num_wins"];

/// Additive per-player statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTotals {
    pub game_count: u64,
    pub monetary_gain: i64,
    pub num_wins: u64,
}

impl PlayerTotals {
    pub fn new(game_count: u64, monetary_gain: i64, num_wins: u64) -> Self {
        Self {
            game_count,
            monetary_gain,
            num_wins,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.game_count == 0 {
            0.0
        } else {
            self.num_wins as f64 / self.game_count as f64 * 100.0
        }
    }

    /// Field-wise sum, `None` if any field overflows
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            game_count: self.game_count.checked_add(other.game_count)?,
            monetary_gain: self.monetary_gain.checked_add(other.monetary_gain)?,
            num_wins: self.num_wins.checked_add(other.num_wins)?,
        })
    }
}

/// One row of an aggregate table, as stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAggregate {
    pub player_name: String,
    pub game_count: u64,
    pub monetary_gain: i64,
    pub num_wins: u64,
}

impl PlayerAggregate {
    pub fn new(player_name: &str, totals: PlayerTotals) -> Self {
        Self {
            player_name: player_name.to_string(),
            game_count: totals.game_count,
            monetary_gain: totals.monetary_gain,
            num_wins: totals.num_wins,
        }
    }

    pub fn totals(&self) -> PlayerTotals {
        PlayerTotals::new(self.game_count, self.monetary_gain, self.num_wins)
    }
}

/// Per-player statistics for a period, one row per player ordered by name.
///
/// An empty table is a valid value: it still has the `AGGREGATE_COLUMNS`
/// schema and is the identity of [`AggregateTable::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateTable {
    rows: BTreeMap<String, PlayerTotals>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, summing any repeated player
    pub fn from_rows<I: IntoIterator<Item = PlayerAggregate>>(rows: I) -> Result<Self> {
        let mut table = Self::new();
        for row in rows {
            table.add(&row.player_name, row.totals())?;
        }
        Ok(table)
    }

    /// Add statistics to a player's row, creating it if needed.
    ///
    /// Fails with [`StatsError::Overflow`] and leaves the row untouched when
    /// the sum does not fit.
    pub fn add(&mut self, player_name: &str, totals: PlayerTotals) -> Result<()> {
        match self.rows.get_mut(player_name) {
            Some(existing) => {
                *existing = existing
                    .checked_add(totals)
                    .ok_or_else(|| StatsError::Overflow(format!("player {}", player_name)))?;
            }
            None => {
                self.rows.insert(player_name.to_string(), totals);
            }
        }
        Ok(())
    }

    /// Fold another table into this one by summing per player
    pub fn merge(&mut self, other: &AggregateTable) -> Result<()> {
        for (name, totals) in &other.rows {
            self.add(name, *totals)?;
        }
        Ok(())
    }

    /// Sum any number of tables into one
    pub fn sum<I: IntoIterator<Item = AggregateTable>>(tables: I) -> Result<Self> {
        let mut combined = Self::new();
        for table in tables {
            if combined.is_empty() {
                combined = table;
            } else {
                combined.merge(&table)?;
            }
        }
        Ok(combined)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, player_name: &str) -> Option<PlayerTotals> {
        self.rows.get(player_name).copied()
    }

    pub fn contains(&self, player_name: &str) -> bool {
        self.rows.contains_key(player_name)
    }

    /// Rows in player-name order
    pub fn rows(&self) -> impl Iterator<Item = PlayerAggregate> + '_ {
        self.rows
            .iter()
            .map(|(name, totals)| PlayerAggregate::new(name, *totals))
    }

    /// Statistics summed over every player
    pub fn totals(&self) -> Result<PlayerTotals> {
        self.rows.values().try_fold(PlayerTotals::default(), |acc, t| {
            acc.checked_add(*t)
                .ok_or_else(|| StatsError::Overflow("table totals".to_string()))
        })
    }

    /// The `n` rows with the largest monetary gain, best first
    pub fn nlargest_by_gain(&self, n: usize) -> Vec<PlayerAggregate> {
        let mut rows: Vec<PlayerAggregate> = self.rows().collect();
        rows.sort_by(|a, b| {
            b.monetary_gain
                .cmp(&a.monetary_gain)
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        rows.truncate(n);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, u64, i64, u64)]) -> AggregateTable {
        AggregateTable::from_rows(rows.iter().map(|&(name, games, gain, wins)| {
            PlayerAggregate::new(name, PlayerTotals::new(games, gain, wins))
        }))
        .unwrap()
    }

    fn sum<const N: usize>(tables: [AggregateTable; N]) -> AggregateTable {
        AggregateTable::sum(tables).unwrap()
    }

    #[test]
    fn test_from_rows_sums_repeated_players() {
        let t = table(&[("deadhead", 4, 125, 2), ("deadhead", 4, 125, 2), ("rimedio", 6, -180, 1)]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("deadhead"), Some(PlayerTotals::new(8, 250, 4)));
        assert_eq!(t.get("rimedio"), Some(PlayerTotals::new(6, -180, 1)));
    }

    #[test]
    fn test_sum_is_elementwise() {
        let april = table(&[("deadhead", 4, 125, 2), ("justnuts", 4, 0, 0)]);
        let may = table(&[("deadhead", 1, -10, 0), ("rimedio", 6, -180, 1)]);
        let year = sum([april, may]);

        assert_eq!(year.len(), 3);
        assert_eq!(year.get("deadhead"), Some(PlayerTotals::new(5, 115, 2)));
        assert_eq!(year.get("justnuts"), Some(PlayerTotals::new(4, 0, 0)));
        assert_eq!(year.get("rimedio"), Some(PlayerTotals::new(6, -180, 1)));
    }

    #[test]
    fn test_empty_table_is_identity() {
        let t = table(&[("deadhead", 4, 125, 2), ("rimedio", 6, -180, 1)]);
        assert_eq!(sum([t.clone(), AggregateTable::new()]), t);
        assert_eq!(sum([AggregateTable::new(), t.clone()]), t);
        assert!(AggregateTable::sum(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_sum_is_associative() {
        let a = table(&[("deadhead", 4, 125, 2)]);
        let b = table(&[("deadhead", 2, -5, 1), ("justnuts", 4, 0, 0)]);
        let c = table(&[("justnuts", 1, 30, 1)]);

        let direct = sum([a.clone(), b.clone(), c.clone()]);
        let nested = sum([sum([a, b]), c]);
        assert_eq!(direct, nested);
    }

    #[test]
    fn test_rows_are_ordered_by_name() {
        let t = table(&[("rimedio", 6, -180, 1), ("deadhead", 4, 125, 2), ("justnuts", 4, 0, 0)]);
        let names: Vec<String> = t.rows().map(|r| r.player_name).collect();
        assert_eq!(names, vec!["deadhead", "justnuts", "rimedio"]);
    }

    #[test]
    fn test_nlargest_by_gain() {
        let t = table(&[("rimedio", 6, -180, 1), ("deadhead", 4, 125, 2), ("justnuts", 4, 0, 0)]);
        let top = t.nlargest_by_gain(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].player_name, "deadhead");
        assert_eq!(top[1].player_name, "justnuts");
        assert_eq!(t.nlargest_by_gain(10).len(), 3);
    }

    #[test]
    fn test_totals() {
        let t = table(&[("rimedio", 6, -180, 1), ("deadhead", 4, 125, 2)]);
        assert_eq!(t.totals().unwrap(), PlayerTotals::new(10, -55, 3));
        assert_eq!(PlayerTotals::new(4, 0, 1).win_rate(), 25.0);
        assert_eq!(PlayerTotals::default().win_rate(), 0.0);
    }

    #[test]
    fn test_overflowing_sum_is_rejected() {
        let mut t = table(&[("deadhead", 1, i64::MAX, 1)]);
        let err = t.add("deadhead", PlayerTotals::new(1, 1, 0)).unwrap_err();
        assert!(matches!(err, StatsError::Overflow(_)));
        assert_eq!(t.get("deadhead"), Some(PlayerTotals::new(1, i64::MAX, 1)));

        let losses = table(&[("rimedio", 1, i64::MIN, 0)]);
        assert!(AggregateTable::sum([losses.clone(), losses]).is_err());

        let pair = table(&[("deadhead", 1, i64::MAX, 1), ("justnuts", 1, 1, 0)]);
        assert!(matches!(pair.totals(), Err(StatsError::Overflow(_))));
    }
}
