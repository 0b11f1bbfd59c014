//! Per-level record counts.
//!
//! [`StatCounter`] is the live counter owned by a pipeline; [`LevelCounts`]
//! is the value handed out by snapshots. Snapshots are plain values, so
//! nothing a caller does to one can reach the live counter.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::level::Level;

/// A point-in-time copy of per-level counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct LevelCounts {
    counts: [u64; Level::ALL.len()],
}

impl LevelCounts {
    /// All counts zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, level: Level) -> u64 {
        self.counts[level.index()]
    }

    pub fn set(&mut self, level: Level, count: u64) {
        self.counts[level.index()] = count;
    }

    /// Sum over all levels.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(level, count)` pairs in DEBUG to CRITICAL order.
    pub fn iter(&self) -> impl Iterator<Item = (Level, u64)> + '_ {
        Level::ALL.into_iter().map(|level| (level, self.get(level)))
    }

    /// Whether any ERROR or CRITICAL record was counted.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.get(Level::Error) > 0 || self.get(Level::Critical) > 0
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.get(Level::Warning) > 0
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<Level, u64> {
        self.iter().collect()
    }
}

impl Index<Level> for LevelCounts {
    type Output = u64;

    fn index(&self, level: Level) -> &u64 {
        &self.counts[level.index()]
    }
}

impl IndexMut<Level> for LevelCounts {
    fn index_mut(&mut self, level: Level) -> &mut u64 {
        &mut self.counts[level.index()]
    }
}

impl FromIterator<(Level, u64)> for LevelCounts {
    fn from_iter<I: IntoIterator<Item = (Level, u64)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (level, count) in iter {
            counts[level] += count;
        }
        counts
    }
}

impl Serialize for LevelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Level::ALL.len()))?;
        for (level, count) in self.iter() {
            map.serialize_entry(level.as_str(), &count)?;
        }
        map.end()
    }
}

/// Live counter. Mutated only on the admission path of the pipeline.
#[derive(Debug, Default)]
pub(crate) struct StatCounter {
    counts: LevelCounts,
}

impl StatCounter {
    pub(crate) fn increment(&mut self, level: Level) {
        let slot = &mut self.counts[level];
        *slot = slot.saturating_add(1);
    }

    pub(crate) fn snapshot(&self) -> LevelCounts {
        self.counts
    }

    /// Zero every level, returning what was cleared.
    pub(crate) fn reset(&mut self) -> LevelCounts {
        std::mem::take(&mut self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counts_are_zero_for_every_level() {
        let counts = LevelCounts::new();
        assert_eq!(counts.iter().count(), 5);
        assert!(counts.iter().all(|(_, c)| c == 0));
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_counter_increment_and_snapshot() {
        let mut counter = StatCounter::default();
        counter.increment(Level::Info);
        counter.increment(Level::Info);
        counter.increment(Level::Critical);

        let snap = counter.snapshot();
        assert_eq!(snap.get(Level::Info), 2);
        assert_eq!(snap[Level::Critical], 1);
        assert_eq!(snap.total(), 3);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut counter = StatCounter::default();
        counter.increment(Level::Warning);

        let mut snap = counter.snapshot();
        snap[Level::Warning] = 100;
        snap.set(Level::Debug, 7);

        assert_eq!(counter.snapshot().get(Level::Warning), 1);
        assert_eq!(counter.snapshot().get(Level::Debug), 0);
    }

    #[test]
    fn test_reset_returns_cleared_counts() {
        let mut counter = StatCounter::default();
        counter.increment(Level::Error);
        let cleared = counter.reset();
        assert_eq!(cleared.get(Level::Error), 1);
        assert_eq!(counter.snapshot(), LevelCounts::new());
    }

    #[test]
    fn test_error_and_warning_flags() {
        let mut counts = LevelCounts::new();
        assert!(!counts.has_errors());
        counts[Level::Warning] = 1;
        assert!(counts.has_warnings());
        assert!(!counts.has_errors());
        counts[Level::Critical] = 1;
        assert!(counts.has_errors());
    }

    #[test]
    fn test_iteration_order_is_fixed() {
        let counts: LevelCounts = [(Level::Critical, 1), (Level::Debug, 2)].into_iter().collect();
        let levels: Vec<Level> = counts.iter().map(|(l, _)| l).collect();
        assert_eq!(levels, Level::ALL.to_vec());
        assert_eq!(counts.to_map().get(&Level::Debug), Some(&2));
    }
}
