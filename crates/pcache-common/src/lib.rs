//! PCache Common - Shared Types and Utilities
//!
//! Error handling and configuration shared by every pcache crate. The
//! timeseries representations, the cache engine and the CLI all report
//! failures through [`PCacheError`] and read their tunables from
//! [`PCacheConfig`].
//!
//! Key Features:
//! - Unified error type with a kind per failure class
//! - Validation errors that name the offending identifier and precondition
//! - TOML-loadable configuration for engine limits and logging
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod config;
pub mod error;

pub use config::{EngineConfig, LoggingConfig, PCacheConfig};
pub use error::{PCacheError, Result, Subject, Violation};
