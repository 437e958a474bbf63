//! Time-varying-variable bookkeeping (spec §4.7 "TimeVaryingVar").
//!
//! Mirrors the shape of a typical gridded-data time axis: a sorted,
//! deduplicated list of valid times, each addressable by an integer time
//! step index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single valid time on a variable's time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidTime(pub DateTime<Utc>);

impl ValidTime {
    pub fn new(t: DateTime<Utc>) -> Self {
        Self(t)
    }
}

impl std::fmt::Display for ValidTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// An inclusive range of valid times, used to clip a reader's reported time
/// axis to the span actually requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: ValidTime,
    pub end: ValidTime,
}

impl TimeRange {
    pub fn new(start: ValidTime, end: ValidTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: ValidTime) -> bool {
        t >= self.start && t <= self.end
    }
}

/// The ordered, deduplicated set of valid times a variable is defined at
/// (spec §4.7 invariants: uniqueness, stable insertion, sort-by-time).
#[derive(Debug, Clone, Default)]
pub struct TimeAxis {
    times: Vec<ValidTime>,
}

impl TimeAxis {
    pub fn new() -> Self {
        Self { times: Vec::new() }
    }

    /// Insert `t` if not already present, keeping `times` sorted. Returns the
    /// time step index `t` occupies.
    pub fn insert(&mut self, t: ValidTime) -> usize {
        match self.times.binary_search(&t) {
            Ok(idx) => idx,
            Err(idx) => {
                self.times.insert(idx, t);
                idx
            }
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn get(&self, ts: usize) -> Option<ValidTime> {
        self.times.get(ts).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ValidTime> + '_ {
        self.times.iter().copied()
    }

    /// Index of the nearest time step at or before `t`, used when mapping a
    /// staggered-dimension source time onto the unstaggered axis.
    pub fn floor_index(&self, t: ValidTime) -> Option<usize> {
        match self.times.binary_search(&t) {
            Ok(idx) => Some(idx),
            Err(0) => None,
            Err(idx) => Some(idx - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(hour: u32) -> ValidTime {
        ValidTime::new(Utc.with_ymd_and_hms(2020, 1, 1, hour, 0, 0).unwrap())
    }

    #[test]
    fn insert_deduplicates_and_sorts() {
        let mut axis = TimeAxis::new();
        assert_eq!(axis.insert(t(3)), 0);
        assert_eq!(axis.insert(t(1)), 0);
        assert_eq!(axis.insert(t(3)), 1);
        assert_eq!(axis.len(), 2);
        assert_eq!(axis.get(0), Some(t(1)));
        assert_eq!(axis.get(1), Some(t(3)));
    }

    #[test]
    fn floor_index_picks_nearest_preceding() {
        let mut axis = TimeAxis::new();
        axis.insert(t(1));
        axis.insert(t(5));
        assert_eq!(axis.floor_index(t(0)), None);
        assert_eq!(axis.floor_index(t(3)), Some(0));
        assert_eq!(axis.floor_index(t(5)), Some(1));
    }

    #[test]
    fn range_contains() {
        let r = TimeRange::new(t(1), t(5));
        assert!(r.contains(t(3)));
        assert!(!r.contains(t(6)));
    }
}
