//! PCache Structure
//!
//! A named, fixed set of keys identifying a family of series.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::matcher::{self, KeySet};
use pcache_common::Result;
use serde::{Deserialize, Serialize};

/// A structure definition. Two structures are equal when both the name and
/// the key set match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Structure {
    name: String,
    keys: KeySet,
}

impl Structure {
    /// Create a structure from a comma-separated key list.
    pub fn new(name: impl Into<String>, definition: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            keys: KeySet::from_definition(definition)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// Canonical key list, e.g. `sensor_name,sensor_type`.
    pub fn definition(&self) -> String {
        self.keys.canonical()
    }

    /// Check if the `key=value` list can be an instance of this structure.
    pub fn contains_instance(&self, instance: &str) -> bool {
        matcher::matches(&self.keys, instance)
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure() {
        let structure = Structure::new("sensors", "sensor_type,sensor_name").unwrap();

        assert_eq!(structure.name(), "sensors");
        assert_eq!(structure.definition(), "sensor_name,sensor_type");
        assert!(structure.contains_instance("sensor_type=heat,sensor_name=S451"));
        assert!(!structure.contains_instance("sensor_type=heat"));
    }

    #[test]
    fn test_equality() {
        let a = Structure::new("bar", "baz,boo").unwrap();
        let b = Structure::new("bar", "boo, baz").unwrap();
        let c = Structure::new("bar", "baz").unwrap();
        let mut d = Structure::new("other", "baz,boo").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);

        d.rename("bar");
        assert_eq!(a, d);
    }
}
