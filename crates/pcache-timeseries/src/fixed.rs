//! PCache Fixed Time Series
//!
//! Array-backed timeseries with a fixed stride between slots. Inserts are
//! costlier than in a point list, but reading a point is a single offset
//! computation. Gaps are represented by a caller-supplied null value, so the
//! timestamps themselves never need to be stored: slot `i` is at
//! `start + i * tick`.
//!
//! Source timestamps are expected in ascending order. The first and last
//! entries bound the array; a timestamp that falls outside those bounds is
//! rejected. Timestamps sharing a slot overwrite each other, last write wins.
//! Use [`FixedTimeseries::build_unordered`] when input order is not
//! guaranteed. Spans needing more than [`MAX_SLOTS`] slots fail with
//! `ResourceExhausted`.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::tick::Tick;
use crate::types::{iso8601_to_millis, DataPoint};
use pcache_common::{PCacheError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of slots a single series may allocate.
pub const MAX_SLOTS: usize = 1 << 27;

// =============================================================================
// Fixed Time Series
// =============================================================================

/// A dense, tick-addressed timeseries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedTimeseries<T> {
    start: i64,
    end: i64,
    tick: Tick,
    null_value: T,
    points: Vec<T>,
}

impl<T: Clone> FixedTimeseries<T> {
    /// Build a dense series from parallel timestamp and value lists.
    pub fn build<S: AsRef<str>>(
        timestamps: &[S],
        values: Vec<T>,
        tick: &str,
        null_value: T,
    ) -> Result<Self> {
        let points = Self::parse_points(timestamps, values)?;
        let tick: Tick = tick.parse()?;
        Self::from_points(points, tick, null_value)
    }

    /// Like [`FixedTimeseries::build`], but sorts the input by timestamp
    /// first. Equal timestamps keep their input order.
    pub fn build_unordered<S: AsRef<str>>(
        timestamps: &[S],
        values: Vec<T>,
        tick: &str,
        null_value: T,
    ) -> Result<Self> {
        let mut points = Self::parse_points(timestamps, values)?;
        let tick: Tick = tick.parse()?;
        points.sort_by_key(|p| p.timestamp);
        Self::from_points(points, tick, null_value)
    }

    /// Build a dense series from points already converted to milliseconds.
    pub fn from_points(points: Vec<DataPoint<T>>, tick: Tick, null_value: T) -> Result<Self> {
        let (start, end) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => {
                return Err(PCacheError::Format(
                    "cannot build a fixed series from zero points".to_string(),
                ))
            }
        };

        let slots = slot_count(start, end, tick)?;
        let mut filled = Vec::new();
        filled.try_reserve_exact(slots).map_err(|e| {
            PCacheError::ResourceExhausted(format!("cannot allocate {} slots: {}", slots, e))
        })?;
        filled.resize(slots, null_value.clone());

        let mut series = Self {
            start,
            end,
            tick,
            points: filled,
            null_value,
        };

        let count = points.len();
        for point in points {
            let index = series.slot_of(point.timestamp)?;
            series.points[index] = point.value;
        }

        tracing::debug!(
            start,
            end,
            tick = tick.as_millis(),
            slots,
            points = count,
            "built fixed-stride series"
        );

        Ok(series)
    }

    fn parse_points<S: AsRef<str>>(timestamps: &[S], values: Vec<T>) -> Result<Vec<DataPoint<T>>> {
        if timestamps.len() != values.len() {
            return Err(PCacheError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }

        timestamps
            .iter()
            .zip(values)
            .map(|(ts, value)| {
                iso8601_to_millis(ts.as_ref()).map(|millis| DataPoint::new(millis, value))
            })
            .collect()
    }
}

impl<T> FixedTimeseries<T> {
    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// First timestamp, epoch milliseconds.
    pub fn start_millis(&self) -> i64 {
        self.start
    }

    /// Last source timestamp, epoch milliseconds. The final slot may sit up
    /// to `tick - 1` ms past this.
    pub fn end_millis(&self) -> i64 {
        self.end
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn null_value(&self) -> &T {
        &self.null_value
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.points
    }

    // -------------------------------------------------------------------------
    // Offset Lookup
    // -------------------------------------------------------------------------

    /// Read the slot at `index`.
    pub fn get(&self, index: usize) -> Result<&T> {
        self.points.get(index).ok_or(PCacheError::IndexOutOfRange {
            index,
            len: self.points.len(),
        })
    }

    /// Nominal time of the slot at `index`.
    pub fn timestamp_at(&self, index: usize) -> Result<i64> {
        if index >= self.points.len() {
            return Err(PCacheError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(self.start + index as i64 * self.tick.as_millis())
    }

    /// Slot index covering an ISO-8601 timestamp.
    pub fn index_of(&self, timestamp: &str) -> Result<usize> {
        self.slot_of(iso8601_to_millis(timestamp)?)
    }

    /// Read the slot covering an ISO-8601 timestamp.
    pub fn get_at(&self, timestamp: &str) -> Result<&T> {
        let index = self.index_of(timestamp)?;
        self.get(index)
    }

    /// Slots covering `from` through `to`, both inclusive.
    pub fn range(&self, from: &str, to: &str) -> Result<&[T]> {
        let first = self.index_of(from)?;
        let last = self.index_of(to)?;
        if first > last {
            return Err(PCacheError::Format(format!(
                "range start '{}' is after range end '{}'",
                from, to
            )));
        }
        Ok(&self.points[first..=last])
    }

    /// Iterate over (slot time in millis, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &T)> + '_ {
        let tick = self.tick.as_millis();
        self.points
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.start + i as i64 * tick, v))
    }

    fn slot_of(&self, millis: i64) -> Result<usize> {
        let offset = millis - self.start;
        if offset < 0 {
            return Err(PCacheError::Format(format!(
                "timestamp {}ms precedes series start {}ms",
                millis, self.start
            )));
        }

        let index = usize::try_from(offset / self.tick.as_millis()).map_err(|_| {
            PCacheError::Format(format!("timestamp {}ms is beyond addressable range", millis))
        })?;

        if index >= self.points.len() {
            return Err(PCacheError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }

        Ok(index)
    }
}

impl<T: PartialEq> FixedTimeseries<T> {
    /// Returns true if the slot at `index` still holds the null value.
    pub fn is_null(&self, index: usize) -> Result<bool> {
        Ok(*self.get(index)? == self.null_value)
    }

    /// Number of slots holding a non-null value.
    pub fn filled(&self) -> usize {
        self.points.iter().filter(|v| **v != self.null_value).count()
    }
}

/// One slot per tick from `start` while the slot time is `<= end`.
fn slot_count(start: i64, end: i64, tick: Tick) -> Result<usize> {
    if end < start {
        return Err(PCacheError::Format(format!(
            "last timestamp {}ms precedes first timestamp {}ms; input must be sorted",
            end, start
        )));
    }

    let slots = (end - start) / tick.as_millis() + 1;
    match usize::try_from(slots) {
        Ok(slots) if slots <= MAX_SLOTS => Ok(slots),
        _ => Err(PCacheError::ResourceExhausted(format!(
            "series spans {} slots, limit is {}",
            slots, MAX_SLOTS
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const T0: &str = "1970-01-01T00:00:00Z";
    const T1: &str = "1970-01-01T00:00:01Z";
    const T2: &str = "1970-01-01T00:00:02Z";
    const T3: &str = "1970-01-01T00:00:03Z";

    #[test]
    fn test_null_filled_gap() {
        let series = FixedTimeseries::build(&[T0, T2], vec!["x", "y"], "1s", "N").unwrap();

        assert_eq!(series.values(), &["x", "N", "y"]);
        assert_eq!(series.start_millis(), 0);
        assert_eq!(series.end_millis(), 2000);
        assert!(series.is_null(1).unwrap());
        assert!(!series.is_null(0).unwrap());
        assert_eq!(series.filled(), 2);
    }

    #[test]
    fn test_slot_past_end_when_not_multiple() {
        let series = FixedTimeseries::build(
            &["1970-01-01T00:00:00Z", "1970-01-01T00:00:05Z"],
            vec![1, 2],
            "2s",
            0,
        )
        .unwrap();

        // slots at 0s, 2s, 4s; 5s lands in the 4s slot
        assert_eq!(series.values(), &[1, 0, 2]);
        assert_eq!(series.timestamp_at(2).unwrap(), 4000);
    }

    #[test]
    fn test_last_write_wins() {
        let series = FixedTimeseries::build(
            &[T0, "1970-01-01T00:00:00.500Z", T1],
            vec!["a", "b", "c"],
            "1s",
            "-",
        )
        .unwrap();

        assert_eq!(series.values(), &["b", "c"]);
    }

    #[test]
    fn test_get_out_of_range() {
        let series = FixedTimeseries::build(&[T0, T1], vec![1, 2], "1s", 0).unwrap();
        assert!(matches!(
            series.get(2).unwrap_err(),
            PCacheError::IndexOutOfRange { index: 2, len: 2 }
        ));
        assert!(series.timestamp_at(2).is_err());
    }

    #[test]
    fn test_span_beyond_slot_limit() {
        let err = FixedTimeseries::build(
            &["0001-01-01T00:00:00Z", "9999-12-31T23:59:59Z"],
            vec!["a", "b"],
            "1s",
            "N",
        )
        .unwrap_err();
        assert!(matches!(err, PCacheError::ResourceExhausted(_)));

        // same span at a coarse tick fits
        let series = FixedTimeseries::build(
            &["0001-01-01T00:00:00Z", "9999-12-31T23:59:59Z"],
            vec!["a", "b"],
            "30d",
            "N",
        )
        .unwrap();
        assert_eq!(series.get(series.len() - 1).unwrap(), &"b");
    }

    #[test]
    fn test_length_mismatch() {
        let err = FixedTimeseries::build(&[T0, T1], vec![1], "1s", 0).unwrap_err();
        assert!(matches!(err, PCacheError::LengthMismatch { .. }));
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        let err = FixedTimeseries::<i32>::build(&empty, vec![], "1s", 0).unwrap_err();
        assert!(matches!(err, PCacheError::Format(_)));
    }

    #[test]
    fn test_unsupported_tick() {
        let err = FixedTimeseries::build(&[T0], vec![1], "1y", 0).unwrap_err();
        assert!(matches!(err, PCacheError::UnsupportedTick(_)));
    }

    #[test]
    fn test_unsorted_input() {
        // first/last bound the array; an earlier point in the middle is rejected
        let err = FixedTimeseries::build(&[T1, T0, T2], vec![1, 2, 3], "1s", 0).unwrap_err();
        assert!(matches!(err, PCacheError::Format(_)));

        let err = FixedTimeseries::build(&[T2, T0], vec![1, 2], "1s", 0).unwrap_err();
        assert!(matches!(err, PCacheError::Format(_)));

        let series =
            FixedTimeseries::build_unordered(&[T3, T0, T2], vec![4, 1, 3], "1s", 0).unwrap();
        assert_eq!(series.values(), &[1, 0, 3, 4]);
    }

    #[test]
    fn test_timestamp_lookup() {
        let series = FixedTimeseries::build(&[T0, T1, T3], vec![10, 11, 13], "1s", -1).unwrap();

        assert_eq!(series.index_of(T3).unwrap(), 3);
        assert_eq!(*series.get_at(T1).unwrap(), 11);
        assert_eq!(*series.get_at("1970-01-01T00:00:02.999Z").unwrap(), -1);
        assert_eq!(series.range(T1, T3).unwrap(), &[11, -1, 13]);

        assert!(series.get_at("1969-12-31T23:59:59Z").is_err());
        assert!(matches!(
            series.get_at("1970-01-01T00:00:04Z").unwrap_err(),
            PCacheError::IndexOutOfRange { index: 4, len: 4 }
        ));
        assert!(series.range(T3, T1).is_err());
    }

    #[test]
    fn test_iter_slot_times() {
        let series = FixedTimeseries::build(
            &["2024-01-01T00:00:00Z", "2024-01-01T02:00:00Z"],
            vec![1.0, 3.0],
            "1h",
            0.0,
        )
        .unwrap();

        let times: Vec<i64> = series.iter().map(|(t, _)| t - series.start_millis()).collect();
        assert_eq!(times, vec![0, 3_600_000, 7_200_000]);
        assert_eq!(series.tick().as_millis(), 3_600_000);
    }
}
