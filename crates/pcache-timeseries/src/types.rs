//! PCache Time Series Types
//!
//! Core data types for timeseries payloads.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::fixed::FixedTimeseries;
use crate::tick::Tick;
use chrono::DateTime;
use pcache_common::{PCacheError, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Timestamps
// =============================================================================

/// Convert an ISO-8601 timestamp with offset (e.g. `1970-01-01T00:00:02Z`)
/// to epoch milliseconds.
pub fn iso8601_to_millis(timestamp: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(timestamp.trim())
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| PCacheError::InvalidTimestamp(format!("'{}': {}", timestamp, e)))
}

// =============================================================================
// Data Point
// =============================================================================

/// A single timeseries data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint<T> {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub value: T,
}

impl<T> DataPoint<T> {
    pub fn new(timestamp: i64, value: T) -> Self {
        Self { timestamp, value }
    }
}

// =============================================================================
// Timeseries
// =============================================================================

/// An ordered sequence of (timestamp, value) pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries<T> {
    points: Vec<DataPoint<T>>,
}

impl<T> Timeseries<T> {
    /// Build a series from parallel timestamp and value lists.
    pub fn new<S: AsRef<str>>(timestamps: &[S], values: Vec<T>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(PCacheError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }

        let points = timestamps
            .iter()
            .zip(values)
            .map(|(ts, value)| {
                iso8601_to_millis(ts.as_ref()).map(|millis| DataPoint::new(millis, value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { points })
    }

    pub fn from_points(points: Vec<DataPoint<T>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[DataPoint<T>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: DataPoint<T>) {
        self.points.push(point);
    }

    pub fn first(&self) -> Option<&DataPoint<T>> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint<T>> {
        self.points.last()
    }

    /// First and last timestamp, in stored order.
    pub fn time_range(&self) -> Option<(i64, i64)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }

    /// Check if points are sorted by timestamp.
    pub fn is_sorted(&self) -> bool {
        self.points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }

    /// Sort points by timestamp. Equal timestamps keep their relative order.
    pub fn sort(&mut self) {
        self.points.sort_by_key(|p| p.timestamp);
    }
}

impl<T: Clone> Timeseries<T> {
    /// Densify this series into a fixed-stride array.
    pub fn to_fixed(&self, tick: Tick, null_value: T) -> Result<FixedTimeseries<T>> {
        FixedTimeseries::from_points(self.points.clone(), tick, null_value)
    }
}

impl<T> Default for Timeseries<T> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_to_millis() {
        assert_eq!(iso8601_to_millis("1970-01-01T00:00:00Z").unwrap(), 0);
        assert_eq!(iso8601_to_millis("1970-01-01T00:00:02.500Z").unwrap(), 2500);
        assert_eq!(iso8601_to_millis("1970-01-01T01:00:00+01:00").unwrap(), 0);
    }

    #[test]
    fn test_invalid_timestamp() {
        let err = iso8601_to_millis("yesterday").unwrap_err();
        assert!(matches!(err, PCacheError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = Timeseries::new(&["1970-01-01T00:00:00Z"], vec![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            PCacheError::LengthMismatch {
                timestamps: 1,
                values: 2
            }
        ));
    }

    #[test]
    fn test_series() {
        let mut series = Timeseries::new(
            &["1970-01-01T00:00:03Z", "1970-01-01T00:00:01Z"],
            vec!["b", "a"],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert!(!series.is_sorted());
        assert_eq!(series.time_range(), Some((3000, 1000)));

        series.sort();
        assert!(series.is_sorted());
        assert_eq!(series.first().map(|p| p.value), Some("a"));
        assert_eq!(series.last().map(|p| p.value), Some("b"));
    }

    #[test]
    fn test_to_fixed() {
        let series = Timeseries::new(
            &["1970-01-01T00:00:00Z", "1970-01-01T00:00:02Z"],
            vec![1.5, 2.5],
        )
        .unwrap();

        let fixed = series.to_fixed(Tick::from_millis(1000).unwrap(), f64::NAN).unwrap();
        assert_eq!(fixed.len(), 3);
        assert_eq!(*fixed.get(2).unwrap(), 2.5);
        assert!(fixed.get(1).unwrap().is_nan());
    }

    #[test]
    fn test_empty_series() {
        let series: Timeseries<u8> = Timeseries::default();
        assert!(series.is_empty());
        assert!(series.is_sorted());
        assert_eq!(series.time_range(), None);
    }
}
