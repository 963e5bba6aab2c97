use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Penalty flag value that marks a "+2" solve.
pub const PLUS_TWO_FLAG: f64 = 2.0;

/// One timed attempt, flattened out of a csTimer session log.
///
/// Field names serialize to the exported column headers. A DNF duration
/// serializes as `null`; records are only ever written, never read back.
#[derive(Debug, Clone, Serialize)]
pub struct SolveRecord {
    /// Solve duration in seconds, `NaN` for a DNF.
    #[serde(rename = "Duration [s]")]
    pub duration_secs: f64,
    /// Scramble sequence, verbatim from the log.
    #[serde(rename = "Scramble")]
    pub scramble: String,
    /// Whether a two-second penalty was applied.
    #[serde(rename = "Was +2")]
    pub was_plus_two: bool,
    /// UTC time the solve was recorded.
    #[serde(rename = "Datetime")]
    pub datetime: DateTime<Utc>,
    /// Puzzle/event category of the session the solve belongs to.
    #[serde(rename = "Scramble Type")]
    pub scramble_type: String,
}

impl SolveRecord {
    /// Build a record from the raw interval pair of a solve entry.
    ///
    /// `penalty` is `intervals[0]`: `2` marks a +2, negative marks a DNF.
    /// `time_ms` is `intervals[1]`, the measured time in milliseconds.
    pub fn from_intervals(
        penalty: f64,
        time_ms: f64,
        scramble: String,
        datetime: DateTime<Utc>,
        scramble_type: String,
    ) -> Self {
        let duration_secs = if penalty >= 0.0 {
            (time_ms + penalty) / 1_000.0
        } else {
            f64::NAN
        };
        Self {
            duration_secs,
            scramble,
            was_plus_two: penalty == PLUS_TWO_FLAG,
            datetime,
            scramble_type,
        }
    }

    /// `true` when the solve did not finish.
    pub fn is_dnf(&self) -> bool {
        self.duration_secs.is_nan()
    }
}

/// Headline numbers over a [`RecordSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveSummary {
    pub count: usize,
    pub dnf_count: usize,
    pub plus_two_count: usize,
    /// Fastest finished solve, in seconds.
    pub best: Option<f64>,
    /// Mean over finished solves, in seconds.
    pub mean: Option<f64>,
}

/// Ordered table of solve records, indexed by `datetime`.
///
/// Records are always held in ascending `datetime` order. Construction is the
/// only point where ordering is established; the set is not mutated after.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<SolveRecord>,
}

impl RecordSet {
    /// Build a set from records in any order. The sort is stable, so records
    /// sharing a timestamp keep their input order.
    pub fn from_unsorted(mut records: Vec<SolveRecord>) -> Self {
        records.sort_by_key(|r| r.datetime);
        Self { records }
    }

    /// Merge several sets, dropping every record whose `datetime` occurs more
    /// than once across the concatenation. No copy of a colliding timestamp
    /// survives.
    ///
    /// Returns the merged set and the number of records dropped.
    pub fn merge_unique(sets: Vec<RecordSet>) -> (Self, usize) {
        let all: Vec<SolveRecord> = sets.into_iter().flat_map(|s| s.records).collect();

        let mut occurrences: HashMap<DateTime<Utc>, usize> = HashMap::new();
        for record in &all {
            *occurrences.entry(record.datetime).or_insert(0) += 1;
        }

        let total = all.len();
        let kept: Vec<SolveRecord> = all
            .into_iter()
            .filter(|r| occurrences.get(&r.datetime) == Some(&1))
            .collect();
        let dropped = total - kept.len();

        (Self::from_unsorted(kept), dropped)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SolveRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SolveRecord> {
        self.records.iter()
    }

    /// Distinct scramble types in order of first appearance.
    pub fn scramble_types(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.scramble_type.as_str()) {
                seen.push(&record.scramble_type);
            }
        }
        seen
    }

    /// Records of one scramble type, still in `datetime` order.
    pub fn by_scramble_type<'a>(&'a self, scramble_type: &str) -> Vec<&'a SolveRecord> {
        self.records
            .iter()
            .filter(|r| r.scramble_type == scramble_type)
            .collect()
    }

    /// First and last timestamps, `None` when empty.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.datetime, last.datetime)),
            _ => None,
        }
    }

    /// Smallest and largest finished duration; DNFs are ignored.
    pub fn duration_range(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .map(|r| r.duration_secs)
            .filter(|d| d.is_finite())
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    pub fn summary(&self) -> SolveSummary {
        let finished: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.duration_secs)
            .filter(|d| d.is_finite())
            .collect();

        let best = finished.iter().copied().reduce(f64::min);
        let mean = if finished.is_empty() {
            None
        } else {
            Some(finished.iter().sum::<f64>() / finished.len() as f64)
        };

        SolveSummary {
            count: self.records.len(),
            dnf_count: self.records.iter().filter(|r| r.is_dnf()).count(),
            plus_two_count: self.records.iter().filter(|r| r.was_plus_two).count(),
            best,
            mean,
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a SolveRecord;
    type IntoIter = std::slice::Iter<'a, SolveRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
