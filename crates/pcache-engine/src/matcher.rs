//! PCache Structure Matcher
//!
//! Canonical forms for key lists and `key=value` lists, and the membership
//! test deciding whether an instance string belongs to a structure.
//!
//! A canonical form has every comma-separated part trimmed (on both sides of
//! an `=` too), empty parts dropped, parts sorted by byte order and exact
//! duplicates removed. Canonicalizing a canonical string returns it
//! unchanged.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use pcache_common::{PCacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

fn normalize_part(part: &str) -> String {
    match part.split_once('=') {
        Some((key, value)) => format!("{}={}", key.trim(), value.trim()),
        None => part.trim().to_string(),
    }
}

// =============================================================================
// Canonical Forms
// =============================================================================

/// Canonicalize a comma-separated key list or `key=value` list.
pub fn canonicalize(raw: &str) -> Result<String> {
    let mut parts: Vec<String> = raw
        .split(',')
        .map(normalize_part)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(PCacheError::Format(format!(
            "'{}' has no parts to canonicalize",
            raw
        )));
    }

    parts.sort();
    parts.dedup();
    Ok(parts.join(","))
}

/// Canonical key list of a `key=value` list. Parts without `=` are ignored.
pub fn keys_of(instance: &str) -> Result<String> {
    let canonical = canonicalize(instance)?;
    let keys: Vec<&str> = canonical
        .split(',')
        .filter_map(|part| part.split_once('=').map(|(key, _)| key))
        .collect();
    canonicalize(&keys.join(","))
}

/// Returns true if the instance's keys are exactly the structure's keys.
pub fn matches(keys: &KeySet, instance: &str) -> bool {
    match KeySet::from_instance(instance) {
        Ok(instance_keys) => instance_keys == *keys,
        Err(_) => false,
    }
}

// =============================================================================
// Key Set
// =============================================================================

/// The set of keys a structure declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeySet(BTreeSet<String>);

impl KeySet {
    /// Parse a structure definition such as `sensor_type, sensor_name`.
    /// Repeated keys collapse into one.
    pub fn from_definition(definition: &str) -> Result<Self> {
        let canonical = canonicalize(definition)?;
        Ok(Self(canonical.split(',').map(str::to_string).collect()))
    }

    /// Keys assigned by an instance string. A key assigned two different
    /// values is rejected, so the result always has one key per pair.
    pub fn from_instance(instance: &str) -> Result<Self> {
        let canonical = canonicalize(instance)?;
        let mut keys = BTreeSet::new();

        for part in canonical.split(',') {
            if let Some((key, _)) = part.split_once('=') {
                if !keys.insert(key.to_string()) {
                    return Err(PCacheError::Format(format!(
                        "key '{}' is assigned more than once in '{}'",
                        key, instance
                    )));
                }
            }
        }

        if keys.is_empty() {
            return Err(PCacheError::Format(format!(
                "'{}' contains no key=value pairs",
                instance
            )));
        }

        Ok(Self(keys))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The canonical comma-joined form.
    pub fn canonical(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_sorts_and_trims() {
        assert_eq!(canonicalize("tid=1, sid=1").unwrap(), "sid=1,tid=1");
        assert_eq!(canonicalize(" b , a ,c").unwrap(), "a,b,c");
        assert_eq!(canonicalize("k = v ,a=b").unwrap(), "a=b,k=v");
    }

    #[test]
    fn test_canonicalize_is_idempotent_and_order_independent() {
        let permutations = [
            "sensor_type=heat,sensor_name=S451,zone=3",
            "zone=3,sensor_type=heat,sensor_name=S451",
            " sensor_name=S451 ,zone=3, sensor_type=heat",
        ];
        let expected = "sensor_name=S451,sensor_type=heat,zone=3";

        for raw in permutations {
            let canonical = canonicalize(raw).unwrap();
            assert_eq!(canonical, expected);
            assert_eq!(canonicalize(&canonical).unwrap(), canonical);
        }
    }

    #[test]
    fn test_canonicalize_byte_order() {
        // uppercase sorts before lowercase, '_' between them
        assert_eq!(canonicalize("b,_a,B,a").unwrap(), "B,_a,a,b");
    }

    #[test]
    fn test_canonicalize_empty() {
        for raw in ["", "   ", ",", " , "] {
            assert!(matches!(canonicalize(raw).unwrap_err(), PCacheError::Format(_)));
        }
    }

    #[test]
    fn test_keys_of() {
        assert_eq!(keys_of("sensor_type=heat,sensor_name=S451").unwrap(), "sensor_name,sensor_type");
        assert_eq!(keys_of("b=1,stray,a=2").unwrap(), "a,b");
        assert!(keys_of("no_pairs_here").is_err());
    }

    #[test]
    fn test_matches_exact_key_set() {
        let keys = KeySet::from_definition("baz,boo").unwrap();

        assert!(matches(&keys, "baz=1,boo=2"));
        assert!(matches(&keys, "boo=anything, baz=else"));
        assert!(!matches(&keys, "baz=1,bo=2"));
        assert!(!matches(&keys, "baz=1"));
        assert!(!matches(&keys, "baz=1,boo=2,extra=3"));
        assert!(!matches(&keys, "x=1,y=2"));
    }

    #[test]
    fn test_matches_rejects_reassigned_key() {
        let keys = KeySet::from_definition("a").unwrap();

        assert!(!matches(&keys, "a=1,a=2"));
        assert!(matches(&keys, "a=1,a=1"));
    }

    #[test]
    fn test_key_set() {
        let keys = KeySet::from_definition("sensor_type , sensor_name,sensor_type").unwrap();

        assert_eq!(keys.len(), 2);
        assert!(keys.contains("sensor_name"));
        assert_eq!(keys.to_string(), "sensor_name,sensor_type");
        assert_eq!(
            KeySet::from_instance("sensor_type=heat,sensor_name=S451").unwrap(),
            keys
        );
    }
}
