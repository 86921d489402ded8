//! PCache Time Series - Timeseries Representations
//!
//! Payload types stored by the cache engine. A [`Timeseries`] is an ordered
//! list of (timestamp, value) pairs; a [`FixedTimeseries`] is the dense,
//! tick-addressed view of one, where reading a point is an offset
//! computation instead of a search.
//!
//! Key Features:
//! - ISO-8601 timestamps converted to epoch milliseconds
//! - Compact tick strings (`45s`, `30M`, `2h`, `1d`)
//! - Null-filled dense arrays with O(1) point lookup
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod fixed;
pub mod tick;
pub mod types;

pub use fixed::{FixedTimeseries, MAX_SLOTS};
pub use tick::{parse_tick, Tick};
pub use types::{iso8601_to_millis, DataPoint, Timeseries};
