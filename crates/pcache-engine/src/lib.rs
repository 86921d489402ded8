//! PCache Engine - Structured Timeseries Cache
//!
//! In-memory store addressed by namespace, structure and structure
//! instance. A structure declares a fixed set of keys; an instance assigns a
//! value to each of those keys and owns exactly one timeseries payload.
//!
//! Key Features:
//! - Identifier grammars enforced before every lookup
//! - Order- and whitespace-independent instance matching
//! - Atomic lifecycle operations behind a single store lock
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod engine;
pub mod identifier;
pub mod matcher;
pub mod structure;

pub use engine::{CacheEngine, EngineStats};
pub use matcher::{canonicalize, keys_of, matches, KeySet};
pub use structure::Structure;
